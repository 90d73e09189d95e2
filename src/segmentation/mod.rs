/*!
 * Sentence-boundary detection.
 *
 * The merge engine only needs ordered sentence spans over a text. This module
 * defines that contract and ships a rule-based implementation plus a registry
 * that picks a detector per language:
 *
 * - `sentencizer`: punctuation driven splitter with per-language abbreviation profiles
 * - `registry`: model selection with fallback and provenance reporting
 */

use std::fmt::Debug;

pub mod registry;
pub mod sentencizer;

pub use self::registry::{DetectorRegistry, DetectorSelection, SegmentationModel};
pub use self::sentencizer::{LanguageProfile, RuleSentencizer};

/// A detected sentence.
///
/// Offsets are character (not byte) positions into the analysed text, `end` exclusive.
/// `text` is the trimmed sentence text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceSpan {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl SentenceSpan {
    pub fn new(start: usize, end: usize, text: impl Into<String>) -> Self {
        Self { start, end, text: text.into() }
    }
}

/// Splits a text into ordered, non-overlapping sentence spans
pub trait SentenceDetector: Send + Sync + Debug {
    /// Detect sentences in `text`
    fn detect(&self, text: &str) -> Vec<SentenceSpan>;

    /// Name reported as the detector provenance
    fn name(&self) -> &str;
}
