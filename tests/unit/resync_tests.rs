/*!
 * Tests for sentence merging, proportional splitting and reassembly
 */

use subresync::resync::{format_text_with_lines, merge_sentences, reassemble, smart_split};
use subresync::segmentation::RuleSentencizer;
use crate::common;

fn detector() -> RuleSentencizer {
    RuleSentencizer::for_language("en")
}

/// Test merged sentences reference ordered unique cues with ratios summing to one
#[test]
fn test_mergeSentences_withFragmentedCues_shouldProduceValidSentences() {
    let cues = common::cues(&[
        "This is the beginning of",
        "a sentence that was split.",
        "Here comes another one!",
        "And this sentence spans",
        "across multiple",
        "subtitle blocks.",
        "Final sentence here.",
    ]);

    let sentences = merge_sentences(&cues, &detector());

    assert_eq!(sentences.len(), 4);
    let indices: Vec<Vec<usize>> = sentences.iter().map(|s| s.cue_indices()).collect();
    assert_eq!(indices, vec![vec![1, 2], vec![3], vec![4, 5, 6], vec![7]]);

    for sentence in &sentences {
        assert!(!sentence.source_cues.is_empty());
        assert_eq!(sentence.source_cues.len(), sentence.char_ratios.len());
        let ids = sentence.cue_indices();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        let sum: f64 = sentence.char_ratios.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(sentence.char_ratios.iter().all(|r| *r > 0.0 && *r <= 1.0));
    }
}

/// Test a single complete cue becomes one sentence with ratio one
#[test]
fn test_mergeSentences_withSingleCue_shouldReturnOneSentence() {
    let cues = common::cues(&["Hello world."]);
    let sentences = merge_sentences(&cues, &detector());

    assert_eq!(sentences.len(), 1);
    assert_eq!(sentences[0].full_text, "Hello world.");
    assert_eq!(sentences[0].cue_indices(), vec![1]);
    assert_eq!(sentences[0].char_ratios, vec![1.0]);
}

/// Test a cue straddling a boundary contributes to both sentences
#[test]
fn test_mergeSentences_withStraddlingCue_shouldShareIt() {
    let cues = common::cues(&["Hi there. How", "are you?"]);
    let sentences = merge_sentences(&cues, &detector());

    assert_eq!(sentences.len(), 2);
    assert_eq!(sentences[0].cue_indices(), vec![1]);
    assert_eq!(sentences[1].full_text, "How are you?");
    assert_eq!(sentences[1].cue_indices(), vec![1, 2]);
    assert!((sentences[1].char_ratios[0] - 3.0 / 11.0).abs() < 1e-9);
    assert!((sentences[1].char_ratios[1] - 8.0 / 11.0).abs() < 1e-9);
}

/// Test empty input produces no sentences
#[test]
fn test_mergeSentences_withNoCues_shouldReturnEmpty() {
    assert!(merge_sentences(&[], &detector()).is_empty());
}

/// Test a single ratio returns the trimmed input
#[test]
fn test_smartSplit_withSingleRatio_shouldReturnTrimmedText() {
    assert_eq!(smart_split("  Merhaba dünya.  ", &[1.0]), vec!["Merhaba dünya."]);
}

/// Test the proportional split keeps whole words
#[test]
fn test_smartSplit_withTurkishSentence_shouldSplitOnWordBoundary() {
    let text = "Bu örnek bir Türkçe çeviri cümlesidir ve bölünecek";
    let parts = smart_split(text, &[0.4, 0.6]);

    assert_eq!(parts.len(), 2);
    assert!(parts.iter().all(|p| !p.is_empty()));
    assert_eq!(parts.join(" "), text);
    let words: Vec<&str> = text.split_whitespace().collect();
    for part in &parts {
        assert!(part.split_whitespace().all(|w| words.contains(&w)));
    }
}

/// Test the fragment count always matches the ratio count
#[test]
fn test_smartSplit_withManyRatios_shouldAlwaysReturnRatioCount() {
    let cases: &[(&str, &[f64])] = &[
        ("", &[0.5, 0.5]),
        ("Tek", &[0.2, 0.3, 0.5]),
        ("Kısa bir cümle", &[0.1, 0.1, 0.1, 0.1, 0.6]),
        ("Uzun bir cümle burada kelime kelime bölünüyor", &[0.25, 0.25, 0.25, 0.25]),
    ];

    for (text, ratios) in cases {
        assert_eq!(smart_split(text, ratios).len(), ratios.len(), "text: {:?}", text);
    }
}

/// Test splitting and reformatting are deterministic
#[test]
fn test_splitAndFormat_shouldBeDeterministic() {
    let text = "Bu cümle birden fazla altyazıya yayılıyor ve düzgün bölünmeli";
    let ratios = [0.3, 0.3, 0.4];

    let first: Vec<String> = smart_split(text, &ratios).iter().map(|p| format_text_with_lines(p, 2)).collect();
    let second: Vec<String> = smart_split(text, &ratios).iter().map(|p| format_text_with_lines(p, 2)).collect();
    assert_eq!(first, second);
}

/// Test line reformatting spreads words with extras on the first lines
#[test]
fn test_formatTextWithLines_shouldDistributeWords() {
    assert_eq!(format_text_with_lines("a b c d e", 2), "a b c\nd e");
    assert_eq!(format_text_with_lines("a b c d e f g", 3), "a b c\nd e\nf g");
    assert_eq!(format_text_with_lines("  tek  ", 2), "tek");
    assert_eq!(format_text_with_lines("as is ", 1), "as is ");
}

/// Test identity translations reassemble to the original cue texts
#[test]
fn test_reassemble_withIdentityTranslations_shouldRestoreCueTexts() {
    let cues = common::cues(&[
        "This is the beginning of",
        "a sentence that was split.",
        "Here comes another one!",
    ]);
    let sentences = merge_sentences(&cues, &detector());
    let translations: Vec<String> = sentences.iter().map(|s| s.full_text.clone()).collect();

    let texts = reassemble(&cues, &sentences, &translations);

    let originals: Vec<String> = cues.iter().map(|c| c.text().to_string()).collect();
    assert_eq!(texts, originals);
}

/// Test cues not covered by any sentence keep their own text
#[test]
fn test_reassemble_withoutSentences_shouldKeepCueTexts() {
    let cues = common::cues(&["One.", "Two."]);
    assert_eq!(reassemble(&cues, &[], &[]), vec!["One.".to_string(), "Two.".to_string()]);
}
