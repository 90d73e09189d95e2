/*!
 * Mock translator implementations for testing and offline runs.
 *
 * The mock simulates different provider behaviors:
 * - `MockTranslator::identity()` - Returns every text unchanged
 * - `MockTranslator::prefixed()` - Prefixes every text with the target code, e.g. `[TR] `
 * - `MockTranslator::failing()` - Always fails with an API error
 * - `MockTranslator::fail_after(n)` - Succeeds for `n` calls, then fails
 * - `MockTranslator::slow(ms)` - Identity after a delay, for timeout testing
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ProviderError;
use super::{TranslateOptions, Translator};

/// Behavior mode for the mock translator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Texts come back unchanged
    Identity,
    /// Texts come back as `[TARGET] text`
    Prefixed,
    /// Always fails with an error
    Failing,
    /// Succeeds for the first `calls` requests, then fails
    FailAfter { calls: usize },
    /// Identity after a delay
    Slow { delay_ms: u64 },
}

/// Mock translator with a call counter shared between clones
#[derive(Debug, Clone)]
pub struct MockTranslator {
    behavior: MockBehavior,
    request_count: Arc<AtomicUsize>,
}

impl MockTranslator {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn identity() -> Self {
        Self::new(MockBehavior::Identity)
    }

    pub fn prefixed() -> Self {
        Self::new(MockBehavior::Prefixed)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn fail_after(calls: usize) -> Self {
        Self::new(MockBehavior::FailAfter { calls })
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Number of `translate` calls received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    fn echo(texts: &[String], prefix: Option<&str>) -> Vec<String> {
        texts.iter()
            .map(|text| {
                let text = text.trim();
                match prefix {
                    _ if text.is_empty() => String::new(),
                    Some(prefix) => format!("[{}] {}", prefix, text),
                    None => text.to_string(),
                }
            })
            .collect()
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, texts: &[String], options: &TranslateOptions) -> Result<Vec<String>, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::Identity => Ok(Self::echo(texts, None)),
            MockBehavior::Prefixed => Ok(Self::echo(texts, Some(&options.target_language.to_uppercase()))),
            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),
            MockBehavior::FailAfter { calls } => {
                if count >= calls {
                    Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated failure (request #{})", count + 1),
                    })
                } else {
                    Ok(Self::echo(texts, None))
                }
            }
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(Self::echo(texts, None))
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::RequestFailed("Simulated connection failure".to_string())),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "Mock"
    }
}
