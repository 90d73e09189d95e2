use std::collections::HashMap;
use log::{debug, warn};

use crate::subtitle_processor::Cue;
use super::merge::MergedSentence;
use super::split::smart_split;

/// Build the final text of every cue from translated sentences.
///
/// Each translation is split with its sentence's ratios and the fragments are
/// handed to the sentence's cues. A cue fed by several sentences gets their
/// fragments joined by a space, in sentence order. Cues no sentence covers keep
/// their own text.
///
/// Fragments are collected per position in `cues`, so cues sharing an index
/// number still get their own text.
pub fn reassemble(cues: &[Cue], sentences: &[MergedSentence<'_>], translations: &[String]) -> Vec<String> {
    if sentences.len() != translations.len() {
        warn!(
            "Reassembling {} sentences with {} translations, unmatched sentences are skipped",
            sentences.len(),
            translations.len()
        );
    }

    let positions: HashMap<*const Cue, usize> = cues
        .iter()
        .enumerate()
        .map(|(position, cue)| (cue as *const Cue, position))
        .collect();
    let mut by_position: Vec<Option<String>> = vec![None; cues.len()];

    for (sentence, translation) in sentences.iter().zip(translations) {
        let fragments = smart_split(translation, &sentence.char_ratios);
        for (cue, fragment) in sentence.source_cues.iter().zip(fragments) {
            let Some(&position) = positions.get(&(*cue as *const Cue)) else {
                debug!("Cue {} does not belong to the reassembled captions", cue.index());
                continue;
            };
            let entry = by_position[position].get_or_insert_with(String::new);
            if fragment.is_empty() {
                continue;
            }
            if !entry.is_empty() {
                entry.push(' ');
            }
            entry.push_str(&fragment);
        }
    }

    let uncovered = by_position.iter().filter(|text| text.is_none()).count();
    if uncovered > 0 {
        debug!("{} cues were not covered by any sentence and keep their text", uncovered);
    }

    cues.iter()
        .zip(by_position)
        .map(|(cue, text)| text.unwrap_or_else(|| cue.text().to_string()))
        .collect()
}
