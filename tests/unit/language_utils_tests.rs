/*!
 * Tests for language code utilities
 */

use subresync::language_utils::{
    self, get_language_name, language_codes_match, normalize_to_part1_or_part2t, normalize_to_part2t,
    validate_language_code, LanguageCodeType,
};

/// Test ISO 639-1 and 639-2 codes validate
#[test]
fn test_validateLanguageCode_withKnownCodes_shouldClassify() {
    assert!(matches!(validate_language_code("en"), Ok(LanguageCodeType::Part1)));
    assert!(matches!(validate_language_code("tur"), Ok(LanguageCodeType::Part2T)));
    assert!(matches!(validate_language_code("ger"), Ok(LanguageCodeType::Part2B)));
    assert!(validate_language_code("zz").is_err());
}

/// Test normalization between code forms
#[test]
fn test_normalize_withMixedForms_shouldAgree() {
    assert_eq!(normalize_to_part2t("tr").unwrap(), "tur");
    assert_eq!(normalize_to_part2t("fre").unwrap(), "fra");
    assert_eq!(normalize_to_part1_or_part2t("deu").unwrap(), "de");
    assert!(language_codes_match("de", "ger"));
    assert!(!language_codes_match("de", "fr"));
}

/// Test language names resolve from any code form
#[test]
fn test_getLanguageName_shouldReturnEnglishName() {
    assert_eq!(get_language_name("tr").unwrap(), "Turkish");
    assert_eq!(get_language_name("fra").unwrap(), "French");
}

/// Test the DeepL target table
#[test]
fn test_targetLanguages_shouldAcceptRegionalCodes() {
    assert!(language_utils::is_supported_target("en-us"));
    assert!(language_utils::is_supported_target("TR"));
    assert!(!language_utils::is_supported_target("EN"));
    assert_eq!(language_utils::target_language_name("pt-br"), Some("Portuguese (Brazilian)"));
    assert_eq!(language_utils::base_language("PT-BR"), "pt");
}

/// Test source detection on a German sample
#[test]
fn test_detectLanguage_withGerman_shouldReturnDe() {
    let (code, confidence) = language_utils::detect_language("Ich weiß nicht, was das ist, aber es ist nicht gut und wir sind müde.");
    assert_eq!(code, "de");
    assert!(confidence >= 0.5);
}
