/*!
 * # subresync - caption translation with sentence-aware resynchronization
 *
 * Caption files cut sentences into timed fragments. Translating each fragment
 * alone loses context, so this library merges fragments into whole sentences,
 * translates the sentences, and splits each translation back over the
 * original cues in proportion to their share of the source sentence.
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: SRT parsing, cue model and serialization
 * - `segmentation`: Sentence boundary detectors and their registry
 * - `resync`: Sentence merge, proportional split, line reformatting and reassembly
 * - `translation`: Batched, cached translation of sentences
 * - `providers`: Translation provider clients:
 *   - `providers::deepl`: DeepL REST API client
 *   - `providers::mock`: In-process translator for tests and dry runs
 * - `jobs`: Job registry and the translation pipeline state machine
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language codes, supported targets and detection
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod subtitle_processor;
pub mod segmentation;
pub mod resync;
pub mod translation;
pub mod providers;
pub mod jobs;
pub mod app_controller;
pub mod language_utils;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use subtitle_processor::{Cue, RawCue, SubtitleCollection, Timecode};
pub use resync::{merge_sentences, smart_split, format_text_with_lines, reassemble, MergedSentence};
pub use segmentation::{DetectorRegistry, SentenceDetector, SentenceSpan};
pub use jobs::{JobManager, JobSnapshot, JobStatus};
pub use language_utils::{language_codes_match, normalize_to_part2t, get_language_name};
pub use errors::{AppError, CaptionError, JobError, ProviderError};
