/*!
 * Tests for ISO language code handling
 */

use subreflow::language_utils::{get_language_name, language_codes_match, normalize_to_part2t};

/// Test normalization across code forms
#[test]
fn test_normalize_to_part2t_shouldAcceptAllForms() {
    assert_eq!(normalize_to_part2t("en").unwrap(), "eng");
    assert_eq!(normalize_to_part2t("ZH").unwrap(), "zho");
    assert_eq!(normalize_to_part2t("ger").unwrap(), "deu");
    assert_eq!(normalize_to_part2t("fra").unwrap(), "fra");
    assert!(normalize_to_part2t("english").is_err());
    assert!(normalize_to_part2t("xx").is_err());
}

/// Test matching between 2- and 3-letter codes
#[test]
fn test_language_codes_match_shouldCompareLanguages() {
    assert!(language_codes_match("fr", "fre"));
    assert!(language_codes_match("zh", "chi"));
    assert!(!language_codes_match("en", "es"));
    assert!(!language_codes_match("en", "zz"));
}

/// Test display names used in the prompt
#[test]
fn test_get_language_name_shouldReturnEnglishName() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("zh").unwrap(), "Chinese");
    assert_eq!(get_language_name("es").unwrap(), "Spanish");
    assert!(get_language_name("").is_err());
}
