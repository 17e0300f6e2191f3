use crate::models::Config;

/// Why a sender was or was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderClass {
    Excluded,
    NotInstitution,
    Institution,
}

/// Block-list and keyword classification of `From` headers.
#[derive(Debug, Clone)]
pub struct SenderFilter {
    keywords: Vec<String>,
    // excluded domains followed by excluded senders
    exclusions: Vec<String>,
}

impl SenderFilter {
    pub fn new(
        keywords: &[String],
        excluded_domains: &[String],
        excluded_senders: &[String],
    ) -> Self {
        Self {
            keywords: lower_all(keywords),
            exclusions: lower_all(excluded_domains.iter().chain(excluded_senders)),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.institution_keywords,
            &config.excluded_domains,
            &config.excluded_senders,
        )
    }

    /// Exclusions are checked first, so a blocked sender is never accepted
    /// even when it also carries an institution keyword.
    pub fn classify(&self, from_header: &str) -> SenderClass {
        let lower = from_header.to_lowercase();
        if self.exclusions.iter().any(|excluded| lower.contains(excluded.as_str())) {
            SenderClass::Excluded
        } else if self.keywords.iter().any(|keyword| lower.contains(keyword.as_str())) {
            SenderClass::Institution
        } else {
            SenderClass::NotInstitution
        }
    }

    pub fn should_process(&self, from_header: &str) -> bool {
        self.classify(from_header) == SenderClass::Institution
    }
}

fn lower_all<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    values
        .into_iter()
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty())
        .collect()
}
