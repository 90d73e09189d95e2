/*!
 * Batch translation of merged sentences.
 *
 * Sentences are sent to the provider in fixed-size batches, one batch at a
 * time, keeping input order. Cached sentences are not sent again. Every
 * provider call is bounded by a timeout.
 */

use std::sync::Arc;
use std::time::{Duration, Instant};
use anyhow::{Result, Context, anyhow};
use log::{debug, info};

use crate::errors::ProviderError;
use crate::providers::{TranslateOptions, Translator};

use super::cache::TranslationCache;

/// Default number of sentences per provider call
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Batch translator for processing sentences in batches
#[derive(Debug, Clone)]
pub struct BatchTranslator {
    translator: Arc<dyn Translator>,
    cache: TranslationCache,
    batch_size: usize,
    timeout: Duration,
}

impl BatchTranslator {
    pub fn new(translator: Arc<dyn Translator>, cache: TranslationCache, batch_size: usize, timeout_secs: u64) -> Self {
        Self {
            translator,
            cache,
            batch_size: batch_size.max(1),
            timeout: Duration::from_secs(timeout_secs.max(1)),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Translate all texts, calling `progress(done, total)` after each batch.
    ///
    /// The first failing batch aborts the run; translations of earlier batches
    /// stay in the cache.
    pub async fn translate_all(
        &self,
        texts: &[String],
        options: &TranslateOptions,
        progress: impl Fn(usize, usize) + Send,
    ) -> Result<Vec<String>> {
        let total = texts.len();
        let total_batches = total.div_ceil(self.batch_size);
        let source_key = options.source_language.as_deref().unwrap_or("auto");
        let mut translated = Vec::with_capacity(total);
        let start_time = Instant::now();

        for (batch_index, batch) in texts.chunks(self.batch_size).enumerate() {
            let mut results: Vec<Option<String>> = batch.iter()
                .map(|text| self.cache.get(text, source_key, &options.target_language))
                .collect();

            let pending: Vec<usize> = results.iter()
                .enumerate()
                .filter(|(_, r)| r.is_none())
                .map(|(i, _)| i)
                .collect();

            if !pending.is_empty() {
                let request: Vec<String> = pending.iter().map(|&i| batch[i].clone()).collect();
                let response = self.call_provider(&request, options)
                    .await
                    .with_context(|| format!("Batch {} of {} failed", batch_index + 1, total_batches))?;

                for (&i, text) in pending.iter().zip(response) {
                    self.cache.store(&batch[i], source_key, &options.target_language, &text);
                    results[i] = Some(text);
                }
            } else {
                debug!("Batch {} of {} served from cache", batch_index + 1, total_batches);
            }

            translated.extend(results.into_iter().map(Option::unwrap_or_default));
            progress(translated.len(), total);
        }

        info!(
            "Translated {} sentences in {} batches with {} ({:.1}s)",
            total,
            total_batches,
            self.translator.name(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(translated)
    }

    async fn call_provider(&self, texts: &[String], options: &TranslateOptions) -> Result<Vec<String>> {
        let response = match tokio::time::timeout(self.timeout, self.translator.translate(texts, options)).await {
            Ok(result) => result?,
            Err(_) => return Err(ProviderError::Timeout(self.timeout.as_secs()).into()),
        };

        if response.len() != texts.len() {
            return Err(anyhow!(ProviderError::ResponseMismatch {
                expected: texts.len(),
                received: response.len(),
            }));
        }

        Ok(response)
    }
}
