/*!
 * Tests for sentence detectors and the detector registry
 */

use subresync::segmentation::{DetectorRegistry, RuleSentencizer, SegmentationModel, SentenceDetector};

fn texts(detector: &dyn SentenceDetector, input: &str) -> Vec<String> {
    detector.detect(input).into_iter().map(|s| s.text).collect()
}

/// Test spans are char offsets that slice back to their text
#[test]
fn test_detect_withMultibyteText_shouldReturnCharOffsets() {
    let detector = RuleSentencizer::for_language("tr");
    let input = "Çok güzel. Şimdi gidiyoruz!";
    let spans = detector.detect(input);
    let chars: Vec<char> = input.chars().collect();

    assert_eq!(spans.len(), 2);
    for span in &spans {
        let slice: String = chars[span.start..span.end].iter().collect();
        assert_eq!(slice, span.text);
    }
    assert_eq!(spans[1].start, 11);
}

/// Test language abbreviations do not end sentences
#[test]
fn test_detect_withTurkishAbbreviation_shouldKeepSentence() {
    let detector = RuleSentencizer::for_language("tr");
    assert_eq!(
        texts(&detector, "Dr. Ayşe geldi. Prof. Kaya bekliyor."),
        vec!["Dr. Ayşe geldi.", "Prof. Kaya bekliyor."]
    );
}

/// Test a lowercase continuation after a full stop stays in the sentence
#[test]
fn test_detect_withLowercaseContinuation_shouldNotSplit() {
    let detector = RuleSentencizer::for_language("en");
    assert_eq!(texts(&detector, "We met at 5 p.m. and left."), vec!["We met at 5 p.m. and left."]);
}

/// Test registry selection through configured models
#[test]
fn test_registry_addAndRemoveModel_shouldChangeSelection() {
    let registry = DetectorRegistry::new(vec![SegmentationModel::new("en", "en_rules")]);
    assert!(registry.select("de").is_fallback);

    registry.add_model(SegmentationModel::new("de", "de_rules"));
    let selection = registry.select("de");
    assert_eq!(selection.model_name, "de_rules");
    assert!(!selection.is_fallback);

    assert!(registry.remove_model("de"));
    assert!(!registry.remove_model("de"));
    assert_eq!(registry.select("de").model_name, "en_rules");
}

/// Test the selected detector is cached by model name
#[test]
fn test_registry_load_shouldReuseCachedDetector() {
    let registry = DetectorRegistry::default();
    let first = registry.load("en_rules").unwrap();
    let second = registry.load("en_rules").unwrap();

    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert!(registry.load("missing_model").is_none());
}

/// Test every built-in model is part of the default list
#[test]
fn test_defaultModels_shouldCoverBuiltins() {
    let names: Vec<String> = DetectorRegistry::default_models().into_iter().map(|m| m.model_name).collect();
    for builtin in DetectorRegistry::builtin_models() {
        assert!(names.iter().any(|n| n == builtin));
    }
}
