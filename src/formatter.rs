use crate::error::{AnalyzerError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Abbreviated "University" prefixes, tried in order. Only the first rule
/// that changes the name is applied.
pub const ABBREVIATION_RULES: &[(&str, &str)] = &[
    (r"(?i)\bU\b\.?\s*(of)?\s*(.*)", "University of $2"),
    (r"(?i)\bUniv\b\.?\s*(of)?\s*(.*)", "University of $2"),
];

/// Institution nicknames, tried in order after the abbreviation rules.
/// Only the first rule that changes the name is applied.
pub const EXPANSION_RULES: &[(&str, &str)] = &[(r"(?i)\bCU\b", "University of Colorado")];

/// Words dropped from display names, compared case-insensitively.
pub const STOP_WORDS: &[&str] = &[
    "admission",
    "admissions",
    "undergraduate",
    "office",
    "the",
    "at",
    "in",
    ".",
    ",",
    " ",
];

static DASH_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("static pattern"));

static DEFAULT_FORMATTER: Lazy<NameFormatter> = Lazy::new(|| {
    NameFormatter::from_tables(ABBREVIATION_RULES, EXPANSION_RULES).expect("built-in rewrite rules")
});

/// A single ordered rewrite: every match of `pattern` becomes `replacement`.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    pattern: Regex,
    replacement: String,
}

impl RewriteRule {
    pub fn new(pattern: &str, replacement: &str) -> Result<Self> {
        let compiled = Regex::new(pattern).map_err(|source| AnalyzerError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            pattern: compiled,
            replacement: replacement.to_string(),
        })
    }

    fn apply(&self, name: &str) -> String {
        self.pattern
            .replace_all(name, self.replacement.as_str())
            .into_owned()
    }
}

/// Turns a raw institution name into the canonical upper-case, dash-joined
/// form used both as lookup candidate and as reported college name.
#[derive(Debug, Clone)]
pub struct NameFormatter {
    abbreviations: Vec<RewriteRule>,
    expansions: Vec<RewriteRule>,
}

impl Default for NameFormatter {
    fn default() -> Self {
        (*DEFAULT_FORMATTER).clone()
    }
}

impl NameFormatter {
    pub fn from_tables(
        abbreviations: &[(&str, &str)],
        expansions: &[(&str, &str)],
    ) -> Result<Self> {
        Ok(Self {
            abbreviations: compile_rules(abbreviations)?,
            expansions: compile_rules(expansions)?,
        })
    }

    /// `"Univ. of Colorado Denver"` becomes `"UNIVERSITY-OF-COLORADO-DENVER"`.
    pub fn format(&self, raw_name: &str) -> String {
        let name = raw_name.trim().replace('\'', "");
        let name = apply_first_change(&self.abbreviations, name);
        let name = apply_first_change(&self.expansions, name);

        let mut words: Vec<&str> = name
            .split_whitespace()
            .filter(|word| !STOP_WORDS.contains(&word.to_lowercase().as_str()))
            .collect();

        if words.last().map_or(false, |word| word.eq_ignore_ascii_case("of")) {
            words.pop();
        }

        let upper = words.join(" ").to_uppercase();
        let dashed = upper.replace([' ', ','], "-");
        DASH_RUNS.replace_all(&dashed, "-").into_owned()
    }
}

fn compile_rules(table: &[(&str, &str)]) -> Result<Vec<RewriteRule>> {
    table
        .iter()
        .map(|(pattern, replacement)| RewriteRule::new(pattern, replacement))
        .collect()
}

fn apply_first_change(rules: &[RewriteRule], name: String) -> String {
    for rule in rules {
        let rewritten = rule.apply(&name);
        if rewritten != name {
            return rewritten;
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(name: &str) -> String {
        NameFormatter::default().format(name)
    }

    #[test]
    fn test_abbreviated_university() {
        assert_eq!(format("U. of Colorado Denver"), "UNIVERSITY-OF-COLORADO-DENVER");
        assert_eq!(format("Univ. of Colorado Denver"), "UNIVERSITY-OF-COLORADO-DENVER");
        assert_eq!(format("Univ Kansas"), "UNIVERSITY-OF-KANSAS");
    }

    #[test]
    fn test_cu_expansion_with_stop_words() {
        assert_eq!(format("CU Boulder Admissions Office"), "UNIVERSITY-OF-COLORADO-BOULDER");
    }

    #[test]
    fn test_full_word_is_not_an_abbreviation() {
        assert_eq!(format("Boston University Admissions"), "BOSTON-UNIVERSITY");
        assert_eq!(format("Curry College"), "CURRY-COLLEGE");
    }

    #[test]
    fn test_only_first_abbreviation_rule_applies() {
        // The U rule fires and consumes the rest, so Univ is left untouched.
        assert_eq!(format("U Univ Test"), "UNIVERSITY-OF-UNIV-TEST");
    }

    #[test]
    fn test_stop_words_and_trailing_of() {
        assert_eq!(format("The Office of Undergraduate Admission at Rice"), "OF-RICE");
        assert_eq!(format("Undergraduate Admissions University of"), "UNIVERSITY");
        // "Office," keeps its comma, so it is not a stop word
        assert_eq!(format("Admissions Office, Rice"), "OFFICE-RICE");
        assert_eq!(format("Boston U"), "BOSTON-UNIVERSITY");
    }

    #[test]
    fn test_apostrophes_commas_and_dashes() {
        assert_eq!(format("  Saint Mary's College, Notre Dame "), "SAINT-MARYS-COLLEGE-NOTRE-DAME");
        assert_eq!(format("Wilkes - Barre"), "WILKES-BARRE");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(format(""), "");
        assert_eq!(format("Admissions Office"), "");
    }

    #[test]
    fn test_rule_tables_compile() {
        assert_eq!(compile_rules(ABBREVIATION_RULES).unwrap().len(), 2);
        assert_eq!(compile_rules(EXPANSION_RULES).unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_rule_is_reported() {
        let err = NameFormatter::from_tables(&[("(unclosed", "x")], &[]).unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidPattern { .. }));
    }

    #[test]
    fn test_custom_expansion_table() {
        let expansions = [(r"(?i)\bUCLA\b", "University of California Los Angeles")];
        let formatter = NameFormatter::from_tables(ABBREVIATION_RULES, &expansions).unwrap();
        assert_eq!(formatter.format("UCLA Admission"), "UNIVERSITY-OF-CALIFORNIA-LOS-ANGELES");
    }
}
