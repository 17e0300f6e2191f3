use crate::formatter::NameFormatter;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

/// Display names with at most this many words and no institution keyword are
/// taken to be a person's name, so the sender domain is used instead.
/// Chosen empirically.
pub const MAX_PERSONAL_NAME_WORDS: usize = 2;

/// Short domain tokens whose institution name cannot be read off the domain.
pub const DOMAIN_OVERRIDES: &[(&str, &str)] = &[
    ("creighton", "Creighton University"),
    ("ucdenver", "University of Colorado Denver"),
    ("ttu", "Texas Tech University"),
    ("bu", "Boston University"),
];

/// A `From` header split into its display name and address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderHeader {
    pub display_name: String,
    pub email_address: Option<String>,
}

impl SenderHeader {
    /// Split on the first `<` when the header carries both `<` and `@`;
    /// otherwise the whole header is the display name.
    pub fn parse(raw: &str) -> Self {
        if raw.contains('<') && raw.contains('@') {
            if let Some((display, address)) = raw.split_once('<') {
                return Self {
                    display_name: display.trim().replace('"', ""),
                    email_address: Some(address.trim().trim_matches('>').to_string()),
                };
            }
        }
        Self {
            display_name: raw.trim().replace('"', ""),
            email_address: None,
        }
    }
}

/// Decode RFC 2047 encoded words. Undecodable input is returned as is.
pub fn decode_display_name(display_name: &str) -> String {
    if !display_name.contains("=?") {
        return display_name.to_string();
    }

    // mailparse expects a full "Key: value" header line
    let mut line = b"From: ".to_vec();
    line.extend_from_slice(display_name.as_bytes());
    line.extend_from_slice(b"\r\n");

    match mailparse::parse_header(&line) {
        Ok((header, _)) => header.get_value(),
        Err(e) => {
            warn!("Error decoding display name {:?}: {}", display_name, e);
            display_name.to_string()
        }
    }
}

/// Drop apostrophes, fold compatibility characters (NFKD) and collapse
/// whitespace.
pub fn clean_display_name(display_name: &str) -> String {
    let without_apostrophes = display_name.trim().replace('\'', "");
    let folded: String = without_apostrophes.nfkd().collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Derives a formatted candidate institution name from a raw `From` header.
#[derive(Debug, Clone)]
pub struct SenderNameExtractor {
    keywords: Vec<String>,
    domain_overrides: HashMap<String, String>,
    formatter: NameFormatter,
}

impl SenderNameExtractor {
    pub fn new(keywords: &[String]) -> Self {
        let domain_overrides = DOMAIN_OVERRIDES
            .iter()
            .map(|(token, name)| (token.to_string(), name.to_string()))
            .collect();
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            domain_overrides,
            formatter: NameFormatter::default(),
        }
    }

    /// Add or replace domain overrides; keys are matched lower-cased.
    pub fn with_domain_overrides(mut self, overrides: &BTreeMap<String, String>) -> Self {
        for (token, name) in overrides {
            self.domain_overrides
                .insert(token.trim().to_lowercase(), name.clone());
        }
        self
    }

    /// Candidate institution name for `raw_from_header`, or `None` when the
    /// display name says nothing and there is no usable address.
    pub fn extract(&self, raw_from_header: &str) -> Option<String> {
        let header = SenderHeader::parse(raw_from_header);
        let display_name = clean_display_name(&decode_display_name(&header.display_name));

        let candidate = if self.is_personal_name(&display_name) {
            debug!("Display name {:?} looks personal, using sender domain", display_name);
            let token = domain_token(header.email_address.as_deref()?)?;
            match self.domain_overrides.get(&token) {
                Some(full_name) => self.formatter.format(full_name),
                None => self.formatter.format(&token),
            }
        } else {
            self.formatter.format(&display_name)
        };

        if candidate.is_empty() {
            None
        } else {
            Some(candidate)
        }
    }

    fn is_personal_name(&self, display_name: &str) -> bool {
        let lower = display_name.to_lowercase();
        display_name.split_whitespace().count() <= MAX_PERSONAL_NAME_WORDS
            && !self.keywords.iter().any(|keyword| lower.contains(keyword.as_str()))
    }
}

/// Registrable name of the sender domain: `admissions.www.bu.edu` -> `bu`.
fn domain_token(email_address: &str) -> Option<String> {
    let domain = email_address.split('@').nth(1)?.trim().to_lowercase();
    let domain = domain.strip_prefix("www.").unwrap_or(&domain);

    let labels: Vec<&str> = domain.split('.').collect();
    let registrable = if labels.len() > 2 {
        &labels[labels.len() - 2..]
    } else {
        &labels[..]
    };

    registrable
        .first()
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
}
