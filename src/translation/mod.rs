/*!
 * Sentence translation through a provider.
 *
 * - `batch`: Fixed-size, order-preserving batches with timeouts and progress
 * - `cache`: Process-wide sentence cache
 */

pub use self::batch::{BatchTranslator, DEFAULT_BATCH_SIZE};
pub use self::cache::{CacheStats, TranslationCache};

pub mod batch;
pub mod cache;
