/*!
 * Translation pipeline run by a job worker.
 *
 * Stages and progress checkpoints:
 * - `parsing`: 5 → 10
 * - `merging`: 20
 * - `translating`: 20 → 80, after every batch
 * - `splitting`: 90
 * - `saving`: 100, then `completed`
 *
 * A failing stage moves the job to `error` and leaves progress at the last
 * checkpoint reached.
 */

use std::sync::Arc;
use anyhow::{Context, Result};
use log::{error, info, warn};

use crate::app_config::Config;
use crate::errors::JobError;
use crate::language_utils;
use crate::providers::{TranslateOptions, Translator};
use crate::resync::{merge_sentences, reassemble};
use crate::segmentation::DetectorRegistry;
use crate::subtitle_processor::{Cue, SubtitleCollection};
use crate::translation::{BatchTranslator, TranslationCache};

use super::manager::JobReporter;
use super::models::{Job, JobStatus};

// @const: Language passed to the detector registry when detection fails
const MULTILINGUAL_CODE: &str = "xx";

// @const: Characters of cue text sampled for language detection
const DETECTION_SAMPLE_CHARS: usize = 2_000;

/// Shared services used by every job worker
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub batch: BatchTranslator,
    pub registry: Arc<DetectorRegistry>,
    pub formality: Option<String>,
    pub preserve_formatting: bool,
}

impl PipelineContext {
    pub fn new(batch: BatchTranslator, registry: Arc<DetectorRegistry>) -> Self {
        Self {
            batch,
            registry,
            formality: None,
            preserve_formatting: true,
        }
    }

    /// Build the context from the application configuration
    pub fn from_config(config: &Config, translator: Arc<dyn Translator>) -> Self {
        let translation = &config.translation;
        let cache = TranslationCache::new(translation.cache_enabled);
        let batch = BatchTranslator::new(translator, cache, translation.batch_size, translation.timeout_secs);
        let registry = Arc::new(DetectorRegistry::new(config.segmentation.models.clone()));

        Self {
            batch,
            registry,
            formality: Some(translation.formality.clone()).filter(|f| f != "default"),
            preserve_formatting: translation.preserve_formatting,
        }
    }
}

/// Source language settings resolved for one job
#[derive(Debug, Clone, PartialEq)]
struct SourceLanguage {
    /// Language used to pick a sentence detector
    segmentation: String,
    /// Language sent to the provider, `None` lets it detect
    provider: Option<String>,
    /// Set when the language was detected from the cue text
    detected: Option<String>,
}

/// Run every stage for the job behind `reporter`, recording failures on the job
pub async fn run(context: &PipelineContext, reporter: &JobReporter) {
    let started = std::time::Instant::now();
    match execute(context, reporter).await {
        Ok(()) => info!("Job {} completed in {:.1}s", reporter.id(), started.elapsed().as_secs_f64()),
        Err(e) => {
            let message = format!("{:#}", e);
            error!("Job {} failed: {}", reporter.id(), message);
            reporter.fail(message);
        }
    }
}

async fn execute(context: &PipelineContext, reporter: &JobReporter) -> Result<()> {
    let job = reporter.job();
    let output_path = job
        .output_path
        .clone()
        .ok_or_else(|| JobError::StageFailed {
            stage: JobStatus::Processing.to_string(),
            message: "no output path assigned".to_string(),
        })?;

    // Parsing
    reporter.enter(JobStatus::Parsing)?;
    reporter.set_progress(5);
    let records = SubtitleCollection::parse_srt_file(&job.source_path)?;
    let cues = SubtitleCollection::to_cues(&records);
    reporter.set_progress(10);

    // Merging
    reporter.enter(JobStatus::Merging)?;
    let source = resolve_source_language(&job, &cues);
    if let Some(detected) = &source.detected {
        reporter.record_detected_language(detected);
    }
    let selection = context.registry.select(&source.segmentation);
    reporter.record_detector(&selection.model_name, selection.is_fallback, selection.warning.clone());
    let sentences = merge_sentences(&cues, selection.detector.as_ref());
    info!(
        "Job {}: merged {} cues into {} sentences with {}",
        job.id,
        cues.len(),
        sentences.len(),
        selection.model_name
    );
    reporter.set_progress(20);

    // Translating
    reporter.enter(JobStatus::Translating)?;
    let texts: Vec<String> = sentences.iter().map(|s| s.full_text.clone()).collect();
    let mut options = TranslateOptions::new(&job.target_language)
        .with_source(source.provider.as_deref())
        .with_formality(context.formality.as_deref());
    options.preserve_formatting = context.preserve_formatting;

    let translations = context
        .batch
        .translate_all(&texts, &options, |done, total| {
            reporter.set_progress(translating_progress(done, total));
        })
        .await
        .context("Translation failed")?;

    // Splitting
    reporter.enter(JobStatus::Splitting)?;
    let final_texts = reassemble(&cues, &sentences, &translations);
    reporter.set_progress(90);

    // Saving
    reporter.enter(JobStatus::Saving)?;
    SubtitleCollection::write_srt(&output_path, &cues, &final_texts)?;
    reporter.set_progress(100);
    reporter.enter(JobStatus::Completed)?;

    Ok(())
}

/// Progress after `done` of `total` sentences were translated
pub fn translating_progress(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 80;
    }
    (20 + done.min(total) * 60 / total).min(80) as u8
}

fn resolve_source_language(job: &Job, cues: &[Cue]) -> SourceLanguage {
    if !job.source_language.trim().eq_ignore_ascii_case("auto") {
        let code = language_utils::normalize_to_part1_or_part2t(&job.source_language)
            .unwrap_or_else(|_| job.source_language.trim().to_lowercase());
        return SourceLanguage {
            segmentation: code.clone(),
            provider: Some(code),
            detected: None,
        };
    }

    let mut sample = String::new();
    for cue in cues {
        if sample.len() >= DETECTION_SAMPLE_CHARS {
            break;
        }
        sample.push_str(cue.text());
        sample.push(' ');
    }

    let (code, confidence) = language_utils::detect_language(&sample);
    if code == "unknown" {
        warn!("Job {}: could not detect the source language, using the multilingual detector", job.id);
        return SourceLanguage {
            segmentation: MULTILINGUAL_CODE.to_string(),
            provider: None,
            detected: None,
        };
    }

    info!("Job {}: detected source language '{}' ({:.2})", job.id, code, confidence);
    SourceLanguage {
        segmentation: code.clone(),
        provider: Some(code.clone()),
        detected: Some(code),
    }
}
