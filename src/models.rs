use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Best fuzzy similarity a candidate needs before it counts as a match.
/// Chosen empirically; tune here or through `fuzzy_cutoff` in the config.
pub const DEFAULT_FUZZY_CUTOFF: f64 = 0.6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub reference_file: String,
    pub messages_directory: String,
    pub output_file: String,
    pub average_output_file: String,
    pub institution_keywords: Vec<String>,
    pub excluded_domains: Vec<String>,
    pub excluded_senders: Vec<String>,
    #[serde(default = "default_fuzzy_cutoff")]
    pub fuzzy_cutoff: f64,
    // short domain token -> full institution name, merged over the built-in table
    #[serde(default)]
    pub domain_overrides: BTreeMap<String, String>,
}

fn default_fuzzy_cutoff() -> f64 {
    DEFAULT_FUZZY_CUTOFF
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reference_file: "data_reformatted.csv".to_string(),
            messages_directory: "mail".to_string(),
            output_file: "college_emails.csv".to_string(),
            average_output_file: "avgacr.csv".to_string(),
            institution_keywords: vec![
                ".edu".to_string(),
                "university".to_string(),
                "college".to_string(),
                "admissions".to_string(),
            ],
            excluded_domains: vec!["vchsweb.org".to_string(), "collegeboard.org".to_string()],
            excluded_senders: vec!["collegeboard".to_string()],
            fuzzy_cutoff: DEFAULT_FUZZY_CUTOFF,
            domain_overrides: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn load_from_file(file_path: &str) -> crate::Result<Self> {
        let content = std::fs::read_to_string(file_path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, file_path: &str) -> crate::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(file_path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> crate::Result<()> {
        if !(0.0..=1.0).contains(&self.fuzzy_cutoff) {
            return Err(crate::AnalyzerError::Config(format!(
                "fuzzy_cutoff must be between 0.0 and 1.0, got {}",
                self.fuzzy_cutoff
            )));
        }
        if self.institution_keywords.is_empty() {
            return Err(crate::AnalyzerError::Config(
                "institution_keywords must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// One row of the reference dataset as it appears in the CSV export.
/// `None` means the column is absent; a blank cell is `Some("")`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReferenceRow {
    #[serde(
        rename = "institution.displayName",
        default,
        deserialize_with = "present_cell"
    )]
    pub display_name: Option<String>,
    #[serde(
        rename = "searchData.acceptanceRate.rawValue",
        default,
        deserialize_with = "present_cell"
    )]
    pub acceptance_rate: Option<String>,
}

// csv turns an empty cell into `None` for `Option` fields; keep it as "".
fn present_cell<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(Some)
}

impl ReferenceRow {
    pub fn new(display_name: &str, acceptance_rate: &str) -> Self {
        Self {
            display_name: Some(display_name.to_string()),
            acceptance_rate: Some(acceptance_rate.to_string()),
        }
    }
}

/// A validated reference row with its comparison key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRecord {
    pub raw_name: String,
    pub normalized_key: String,
    pub acceptance_rate: String,
}

/// Which lookup tier produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    NormalizedExact,
    RawExact,
    Substring,
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceMatch {
    pub acceptance_rate: String,
    // key that matched: the normalized key, or the raw name for the raw tier
    pub matched_key: String,
    pub tier: MatchTier,
    pub similarity: f64,
}

impl ReferenceMatch {
    pub(crate) fn exact(acceptance_rate: &str, matched_key: &str, tier: MatchTier) -> Self {
        Self {
            acceptance_rate: acceptance_rate.to_string(),
            matched_key: matched_key.to_string(),
            tier,
            similarity: 1.0,
        }
    }

    pub(crate) fn approximate(
        acceptance_rate: &str,
        matched_key: &str,
        tier: MatchTier,
        similarity: f64,
    ) -> Self {
        Self {
            acceptance_rate: acceptance_rate.to_string(),
            matched_key: matched_key.to_string(),
            tier,
            similarity,
        }
    }
}

/// The headers of one message the pipeline cares about.
#[derive(Debug, Clone, Default)]
pub struct InboundMessage {
    pub source: String,
    pub date: Option<DateTime<FixedOffset>>,
    pub from: Option<String>,
}

/// One resolved message, as written to the output CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmittedRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "College Name")]
    pub college_name: String,
    #[serde(rename = "Acceptance Rate")]
    pub acceptance_rate: String,
}

/// Mean acceptance rate of all records emitted on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyAverage {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Acceptance Rate")]
    pub acceptance_rate: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path = path.to_str().unwrap();

        let mut config = Config::default();
        config
            .domain_overrides
            .insert("mit".to_string(), "Massachusetts Institute of Technology".to_string());
        config.save_to_file(path).unwrap();

        let loaded = Config::load_from_file(path).unwrap();
        assert_eq!(loaded.institution_keywords, config.institution_keywords);
        assert_eq!(loaded.domain_overrides, config.domain_overrides);
        assert_eq!(loaded.fuzzy_cutoff, DEFAULT_FUZZY_CUTOFF);
    }

    #[test]
    fn test_missing_cutoff_uses_default() {
        let toml = r#"
            reference_file = "ref.csv"
            messages_directory = "mail"
            output_file = "out.csv"
            average_output_file = "avg.csv"
            institution_keywords = [".edu"]
            excluded_domains = []
            excluded_senders = []
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.fuzzy_cutoff, DEFAULT_FUZZY_CUTOFF);
        assert!(config.domain_overrides.is_empty());
    }

    #[test]
    fn test_out_of_range_cutoff_is_rejected() {
        let config = Config {
            fuzzy_cutoff: 1.5,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
