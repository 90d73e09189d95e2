use log::debug;

use crate::segmentation::SentenceDetector;
use crate::subtitle_processor::Cue;

/// A complete sentence rebuilt from one or more cues.
///
/// `char_ratios[i]` is the share of the sentence's characters that came from
/// `source_cues[i]`; the ratios sum to 1.
#[derive(Debug, Clone)]
pub struct MergedSentence<'a> {
    pub full_text: String,
    pub source_cues: Vec<&'a Cue>,
    pub char_ratios: Vec<f64>,
}

impl MergedSentence<'_> {
    pub fn cue_indices(&self) -> Vec<usize> {
        self.source_cues.iter().map(|cue| cue.index()).collect()
    }
}

/// Merge cues into sentences.
///
/// Cue texts are joined with single spaces and handed to the detector. Each
/// detected sentence is attributed to the cues whose character ranges it
/// overlaps, weighted by overlap length.
pub fn merge_sentences<'a>(cues: &'a [Cue], detector: &dyn SentenceDetector) -> Vec<MergedSentence<'a>> {
    if cues.is_empty() {
        return Vec::new();
    }

    let mut ranges = Vec::with_capacity(cues.len());
    let mut pos = 0;
    for cue in cues {
        let len = cue.char_count();
        ranges.push((pos, pos + len));
        pos += len + 1;
    }

    let full_text = cues.iter().map(|cue| cue.text()).collect::<Vec<_>>().join(" ");
    let spans = detector.detect(&full_text);

    let mut merged = Vec::with_capacity(spans.len());
    for span in spans {
        let text = span.text.trim();
        if text.is_empty() {
            continue;
        }

        let mut source_cues = Vec::new();
        let mut contributions = Vec::new();
        for (cue, &(cue_start, cue_end)) in cues.iter().zip(&ranges) {
            let overlap_start = span.start.max(cue_start);
            let overlap_end = span.end.min(cue_end);
            if overlap_start < overlap_end {
                source_cues.push(cue);
                contributions.push(overlap_end - overlap_start);
            }
        }

        if source_cues.is_empty() {
            continue;
        }

        let total: usize = contributions.iter().sum();
        let char_ratios = if total == 0 {
            vec![1.0 / source_cues.len() as f64; source_cues.len()]
        } else {
            contributions.iter().map(|&c| c as f64 / total as f64).collect()
        };

        merged.push(MergedSentence {
            full_text: text.to_string(),
            source_cues,
            char_ratios,
        });
    }

    debug!("Merged {} cues into {} sentences using {}", cues.len(), merged.len(), detector.name());
    merged
}
