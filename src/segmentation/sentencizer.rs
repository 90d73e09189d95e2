/*!
 * Rule-based sentence splitter.
 *
 * Sentences end at terminal punctuation followed by whitespace (or the end of
 * the text). Trailing closing quotes and brackets stay with the sentence they
 * close. A full stop does not end a sentence after a known abbreviation, after a
 * single-letter initial, or when the next word starts in lowercase.
 */

use log::debug;

use super::{SentenceDetector, SentenceSpan};

const TERMINATORS: &[char] = &['.', '!', '?', '…', '‼', '⁇', '⁈', '⁉'];
const FULLWIDTH_TERMINATORS: &[char] = &['。', '！', '？', '｡'];
const CLOSERS: &[char] = &['"', '\'', '”', '’', '»', ')', ']', '}', '」', '』', '）'];

/// Abbreviation set used by the splitter for one language
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageProfile {
    pub lang_code: String,
    abbreviations: Vec<String>,
}

impl LanguageProfile {
    pub fn new(lang_code: &str, abbreviations: &[&str]) -> Self {
        Self {
            lang_code: lang_code.to_string(),
            abbreviations: abbreviations.iter().map(|a| a.to_lowercase()).collect(),
        }
    }

    /// Profile for a language code, falling back to the neutral profile
    pub fn for_language(lang_code: &str) -> Self {
        let code = lang_code.trim().to_lowercase();
        let base = code.split(['-', '_']).next().unwrap_or_default();
        match base {
            "en" => Self::new("en", &[
                "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e",
                "inc", "ltd", "co", "no", "mt", "approx", "dept", "u.s", "u.k", "a.m", "p.m",
            ]),
            "tr" => Self::new("tr", &[
                "dr", "prof", "doç", "av", "sn", "vb", "vs", "yy", "bkz", "örn", "yrd", "alb", "gen",
            ]),
            "de" => Self::new("de", &[
                "z.b", "bzw", "usw", "dr", "prof", "nr", "str", "ca", "ggf", "evtl", "d.h", "u.a", "hr", "fr",
            ]),
            "fr" => Self::new("fr", &[
                "m", "mme", "mlle", "dr", "etc", "p.ex", "cf", "av", "env", "st", "ste",
            ]),
            "es" => Self::new("es", &[
                "sr", "sra", "srta", "dr", "dra", "ud", "uds", "etc", "p.ej", "pág", "av",
            ]),
            "it" => Self::new("it", &[
                "sig", "sig.ra", "dott", "prof", "ecc", "avv", "ing", "p.es",
            ]),
            _ => Self::new(if base.is_empty() { "xx" } else { base }, &[]),
        }
    }

    fn is_abbreviation(&self, word: &str) -> bool {
        let word = word.to_lowercase();
        self.abbreviations.iter().any(|a| *a == word)
    }
}

/// Punctuation-driven sentence detector
#[derive(Debug, Clone)]
pub struct RuleSentencizer {
    name: String,
    profile: LanguageProfile,
}

impl RuleSentencizer {
    pub fn new(name: impl Into<String>, profile: LanguageProfile) -> Self {
        Self { name: name.into(), profile }
    }

    /// Splitter for a language, named after the language
    pub fn for_language(lang_code: &str) -> Self {
        let profile = LanguageProfile::for_language(lang_code);
        Self::new(format!("sentencizer ({})", lang_code), profile)
    }

    pub fn profile(&self) -> &LanguageProfile {
        &self.profile
    }

    // @returns: Whether a full stop at `dot` closes the sentence
    fn full_stop_ends_sentence(&self, chars: &[char], dot: usize, next_word: Option<usize>) -> bool {
        let word_start = chars[..dot]
            .iter()
            .rposition(|c| c.is_whitespace())
            .map(|p| p + 1)
            .unwrap_or(0);
        let word: String = chars[word_start..dot]
            .iter()
            .filter(|c| !CLOSERS.contains(c) && **c != '(' && **c != '"')
            .collect();

        if self.profile.is_abbreviation(&word) {
            return false;
        }

        // Initials such as "J."
        let mut letters = word.chars();
        if let (Some(first), None) = (letters.next(), letters.next()) {
            if first.is_uppercase() {
                return false;
            }
        }

        match next_word {
            Some(pos) => !chars[pos].is_lowercase(),
            None => true,
        }
    }
}

impl SentenceDetector for RuleSentencizer {
    fn detect(&self, text: &str) -> Vec<SentenceSpan> {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        let mut spans = Vec::new();
        let mut sentence_start: Option<usize> = None;
        let mut i = 0;

        while i < len {
            let c = chars[i];
            if sentence_start.is_none() {
                if c.is_whitespace() {
                    i += 1;
                    continue;
                }
                sentence_start = Some(i);
            }

            if FULLWIDTH_TERMINATORS.contains(&c) {
                let mut end = i + 1;
                while end < len && (FULLWIDTH_TERMINATORS.contains(&chars[end]) || CLOSERS.contains(&chars[end])) {
                    end += 1;
                }
                push_span(&mut spans, &chars, sentence_start.take(), end);
                i = end;
                continue;
            }

            if TERMINATORS.contains(&c) {
                let mut end = i + 1;
                while end < len && TERMINATORS.contains(&chars[end]) {
                    end += 1;
                }
                while end < len && CLOSERS.contains(&chars[end]) {
                    end += 1;
                }

                let at_boundary = end == len || chars[end].is_whitespace();
                if !at_boundary {
                    i = end;
                    continue;
                }

                let next_word = chars[end..].iter().position(|c| !c.is_whitespace()).map(|p| p + end);
                let closes = if c == '.' && end == i + 1 + count_closers(&chars[i + 1..end]) {
                    self.full_stop_ends_sentence(&chars, i, next_word)
                } else if c == '.' || c == '…' {
                    // Ellipsis: only a boundary before an uppercase start
                    next_word.is_none_or(|p| !chars[p].is_lowercase())
                } else {
                    true
                };

                if closes {
                    push_span(&mut spans, &chars, sentence_start.take(), end);
                }
                i = end;
                continue;
            }

            i += 1;
        }

        if let Some(start) = sentence_start {
            push_span(&mut spans, &chars, Some(start), len);
        }

        debug!("{} detected {} sentences", self.name, spans.len());
        spans
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn count_closers(chars: &[char]) -> usize {
    chars.iter().filter(|c| CLOSERS.contains(c)).count()
}

fn push_span(spans: &mut Vec<SentenceSpan>, chars: &[char], start: Option<usize>, end: usize) {
    let Some(start) = start else { return };
    let mut end = end;
    while end > start && chars[end - 1].is_whitespace() {
        end -= 1;
    }
    if end <= start {
        return;
    }
    let text: String = chars[start..end].iter().collect();
    spans.push(SentenceSpan::new(start, end, text.trim()));
}
