/*!
 * Translation provider implementations.
 *
 * This module contains the provider boundary used by the pipeline and its
 * implementations:
 * - `deepl`: DeepL REST API client
 * - `mock`: Deterministic in-process translator for tests and offline runs
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

pub mod deepl;
pub mod mock;

pub use self::deepl::DeepL;
pub use self::mock::{MockBehavior, MockTranslator};

/// Per-request translation settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslateOptions {
    /// Target language code, e.g. `TR` or `EN-US`
    pub target_language: String,
    /// Source language code, `None` lets the provider detect it
    pub source_language: Option<String>,
    /// Formality preference (`default`, `more`, `less`, `prefer_more`, `prefer_less`)
    pub formality: Option<String>,
    /// Ask the provider to keep punctuation and casing as given
    pub preserve_formatting: bool,
}

impl TranslateOptions {
    pub fn new(target_language: &str) -> Self {
        Self {
            target_language: target_language.to_string(),
            preserve_formatting: true,
            ..Default::default()
        }
    }

    pub fn with_source(mut self, source_language: Option<&str>) -> Self {
        self.source_language = source_language.map(str::to_string);
        self
    }

    pub fn with_formality(mut self, formality: Option<&str>) -> Self {
        self.formality = formality.map(str::to_string);
        self
    }
}

/// Common trait for all translation providers
///
/// Implementations translate a list of texts in one call and must return
/// exactly one translation per input, in input order.
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    /// Translate `texts`; empty inputs come back as empty strings
    async fn translate(&self, texts: &[String], options: &TranslateOptions) -> Result<Vec<String>, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Provider name for logs
    fn name(&self) -> &str;
}
