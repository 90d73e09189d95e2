/*!
 * Sentence resynchronization engine.
 *
 * Captions cut sentences at arbitrary points. Before translation the cues are
 * merged into whole sentences, remembering how many characters each cue gave
 * to each sentence. After translation every sentence is cut back into the same
 * number of pieces, in the same proportions, at word boundaries.
 *
 * - `merge`: cues + detector -> sentences with per-cue ratios
 * - `split`: translated sentence + ratios -> fragments
 * - `formatting`: fragment + original line count -> wrapped text
 * - `reassembly`: fragments -> final text per cue
 */

pub mod formatting;
pub mod merge;
pub mod reassembly;
pub mod split;

pub use self::formatting::format_text_with_lines;
pub use self::merge::{MergedSentence, merge_sentences};
pub use self::reassembly::reassemble;
pub use self::split::smart_split;
