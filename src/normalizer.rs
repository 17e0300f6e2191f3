/// Words that carry no identity when comparing institution names.
const GENERIC_WORDS: &[&str] = &["university", "college"];

/// Normalize an institution name into its comparison key.
///
/// Lower-cases, strips punctuation, drops the words "university" and
/// "college" and joins what is left with single dashes. Dashes and
/// underscores in the input count as word separators, so a key fed back in
/// comes out unchanged.
pub fn normalize_name(name: &str) -> String {
    let stripped: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    stripped
        .split_whitespace()
        .filter(|word| !GENERIC_WORDS.contains(word))
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_generic_words() {
        assert_eq!(normalize_name("Boston University"), "boston");
        assert_eq!(normalize_name("College of the Holy Cross"), "of-the-holy-cross");
    }

    #[test]
    fn test_case_insensitive() {
        let a = normalize_name("Boston University");
        let b = normalize_name("boston university");
        let c = normalize_name(&"BOSTON-UNIVERSITY".to_lowercase());
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_idempotent() {
        for name in [
            "University of Colorado Denver",
            "UNIVERSITY-OF-COLORADO-DENVER",
            "St. John's College, Annapolis",
            "  Texas   A&M  ",
            "",
        ] {
            let once = normalize_name(name);
            assert_eq!(normalize_name(&once), once, "input: {name:?}");
        }
    }

    #[test]
    fn test_formatted_and_reference_forms_agree() {
        assert_eq!(
            normalize_name("UNIVERSITY-OF-COLORADO-DENVER"),
            normalize_name("University of Colorado Denver")
        );
    }

    #[test]
    fn test_punctuation_and_whitespace() {
        assert_eq!(normalize_name("St. Mary's  College"), "st-marys");
        assert_eq!(normalize_name("Texas A&M University"), "texas-am");
        assert_eq!(normalize_name("  University  "), "");
    }

    #[test]
    fn test_partial_words_are_kept() {
        assert_eq!(normalize_name("Collegeville Institute"), "collegeville-institute");
    }
}
