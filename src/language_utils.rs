use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities
///
/// ISO 639 code validation and matching, the DeepL target language table and
/// a lightweight source-language guesser used when the source is set to `auto`.

/// Language code type
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

// @const: ISO 639-2/B codes that differ from their 639-2/T form
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("fre", "fra"), ("ger", "deu"), ("dut", "nld"), ("gre", "ell"), ("chi", "zho"),
    ("cze", "ces"), ("ice", "isl"), ("alb", "sqi"), ("arm", "hye"), ("baq", "eus"),
    ("bur", "mya"), ("per", "fas"), ("geo", "kat"), ("may", "msa"), ("mac", "mkd"),
    ("rum", "ron"), ("slo", "slk"), ("wel", "cym"),
];

/// Target languages accepted by the DeepL API, with display names
pub const DEEPL_LANGUAGES: &[(&str, &str)] = &[
    ("TR", "Turkish"),
    ("EN-US", "English (American)"),
    ("EN-GB", "English (British)"),
    ("DE", "German"),
    ("FR", "French"),
    ("ES", "Spanish"),
    ("IT", "Italian"),
    ("PT-PT", "Portuguese (European)"),
    ("PT-BR", "Portuguese (Brazilian)"),
    ("NL", "Dutch"),
    ("PL", "Polish"),
    ("RU", "Russian"),
    ("JA", "Japanese"),
    ("ZH", "Chinese"),
    ("KO", "Korean"),
    ("AR", "Arabic"),
    ("BG", "Bulgarian"),
    ("CS", "Czech"),
    ("DA", "Danish"),
    ("EL", "Greek"),
    ("ET", "Estonian"),
    ("FI", "Finnish"),
    ("HU", "Hungarian"),
    ("ID", "Indonesian"),
    ("LT", "Lithuanian"),
    ("LV", "Latvian"),
    ("NB", "Norwegian (Bokmål)"),
    ("RO", "Romanian"),
    ("SK", "Slovak"),
    ("SL", "Slovenian"),
    ("SV", "Swedish"),
    ("UK", "Ukrainian"),
];

fn bibliographic_to_terminology(code: &str) -> Option<&'static str> {
    BIBLIOGRAPHIC_CODES.iter().find(|(b, _)| *b == code).map(|(_, t)| *t)
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let normalized_code = code.trim().to_lowercase();

    match normalized_code.len() {
        2 if Language::from_639_1(&normalized_code).is_some() => Ok(LanguageCodeType::Part1),
        3 if Language::from_639_3(&normalized_code).is_some() => Ok(LanguageCodeType::Part2T),
        3 if bibliographic_to_terminology(&normalized_code).is_some() => Ok(LanguageCodeType::Part2B),
        _ => Err(anyhow!("Invalid language code: {}", code)),
    }
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
        if let Some(terminology) = bibliographic_to_terminology(&normalized_code) {
            return Ok(terminology.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-1 (2-letter) format if possible.
/// Falls back to ISO 639-2/T if no ISO 639-1 code exists.
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let part2t = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&part2t)
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))?;

    Ok(lang.to_639_1().map(str::to_string).unwrap_or(part2t))
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name from an ISO code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Whether DeepL accepts this target language code
pub fn is_supported_target(code: &str) -> bool {
    let code = code.trim().to_uppercase();
    DEEPL_LANGUAGES.iter().any(|(c, _)| *c == code)
}

/// Display name of a DeepL target language
pub fn target_language_name(code: &str) -> Option<&'static str> {
    let code = code.trim().to_uppercase();
    DEEPL_LANGUAGES.iter().find(|(c, _)| *c == code).map(|(_, name)| *name)
}

/// ISO 639-1 part of a DeepL code, e.g. `EN-US` -> `en`
pub fn base_language(code: &str) -> String {
    code.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

// @const: Frequent function words per language, used for guessing the source language
const STOPWORDS: &[(&str, &[&str])] = &[
    ("en", &["the", "and", "is", "you", "to", "of", "it", "that", "in", "what", "this", "are", "was", "have", "we", "i"]),
    ("tr", &["ve", "bir", "bu", "da", "de", "ne", "için", "ben", "sen", "mi", "ama", "çok", "var", "yok", "gibi", "şey"]),
    ("de", &["der", "die", "das", "und", "ist", "nicht", "ich", "du", "es", "ein", "eine", "zu", "mit", "sie", "wir", "was"]),
    ("fr", &["le", "la", "les", "et", "est", "je", "tu", "vous", "pas", "que", "une", "des", "il", "nous", "ce", "qui"]),
    ("es", &["el", "la", "los", "y", "es", "que", "no", "de", "un", "una", "por", "con", "lo", "yo", "qué", "para"]),
    ("it", &["il", "di", "che", "e", "non", "un", "una", "sono", "per", "mi", "ti", "ho", "lo", "gli", "questo", "cosa"]),
    ("nl", &["de", "het", "een", "en", "is", "niet", "ik", "je", "dat", "wat", "van", "we", "zijn", "maar", "hij", "er"]),
    ("pt", &["o", "os", "e", "não", "que", "um", "uma", "você", "eu", "do", "da", "com", "para", "isso", "está", "se"]),
];

const MIN_DETECTION_CHARS: usize = 20;

/// Guess the language of a text from its function words.
///
/// Returns the ISO 639-1 code with a confidence estimate, or `("unknown", 0.0)`
/// for short texts and texts without any known function word.
pub fn detect_language(text: &str) -> (String, f64) {
    let trimmed = text.trim();
    let char_len = trimmed.chars().count();
    if char_len < MIN_DETECTION_CHARS {
        return ("unknown".to_string(), 0.0);
    }

    let lowered = trimmed.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .collect();

    let mut best: Option<(&str, usize)> = None;
    for (code, stopwords) in STOPWORDS {
        let score = words.iter().filter(|w| stopwords.contains(w)).count();
        if score > 0 && best.is_none_or(|(_, top)| score > top) {
            best = Some((*code, score));
        }
    }

    match best {
        Some((code, _)) => {
            let confidence = (0.5 + char_len as f64 / 1000.0).min(0.95);
            (code.to_string(), confidence)
        }
        None => ("unknown".to_string(), 0.0),
    }
}
