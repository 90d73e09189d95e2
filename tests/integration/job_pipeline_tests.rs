/*!
 * End-to-end tests for the job pipeline
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;

use subresync::errors::{AppError, CaptionError, JobError, ProviderError};
use subresync::jobs::{JobManager, JobStatus, PipelineContext};
use subresync::providers::{MockTranslator, TranslateOptions, Translator};
use subresync::segmentation::{DetectorRegistry, SegmentationModel};
use subresync::subtitle_processor::SubtitleCollection;
use subresync::translation::{BatchTranslator, TranslationCache};
use crate::common;

/// Translator that fails until told otherwise
#[derive(Debug, Default)]
struct SwitchableTranslator {
    failing: AtomicBool,
}

#[async_trait]
impl Translator for SwitchableTranslator {
    async fn translate(&self, texts: &[String], _options: &TranslateOptions) -> Result<Vec<String>, ProviderError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProviderError::RequestFailed("connection reset".to_string()));
        }
        Ok(texts.to_vec())
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "Switchable"
    }
}

/// Translator that panics on every request
#[derive(Debug)]
struct PanickingTranslator;

#[async_trait]
impl Translator for PanickingTranslator {
    async fn translate(&self, _texts: &[String], _options: &TranslateOptions) -> Result<Vec<String>, ProviderError> {
        panic!("translator exploded");
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "Panicking"
    }
}

/// Test seven fragmented cues translate end to end with an identity translator
#[tokio::test]
async fn test_pipeline_withIdentityTranslator_shouldKeepCueLayout() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_fragmented_subtitle(temp_dir.path(), "episode.srt")?;
    let manager = common::job_manager(temp_dir.path(), Arc::new(MockTranslator::identity()));

    let job = manager.create_job(&input, "en", "TR")?;
    assert_eq!(job.status, JobStatus::Uploaded);

    manager.start_translation(&job.id)?.await?;
    let snapshot = manager.snapshot(&job.id)?;

    assert_eq!(snapshot.status, JobStatus::Completed);
    assert_eq!(snapshot.progress, 100);
    assert_eq!(snapshot.error, None);
    assert_eq!(snapshot.used_model.as_deref(), Some("en_rules"));
    assert!(!snapshot.fallback);
    assert_eq!(snapshot.output_filename.as_deref(), Some("episode_TR.srt"));

    let output = snapshot.output_path.expect("completed job exposes its output");
    assert_eq!(
        output.file_name().unwrap().to_string_lossy(),
        format!("{}_episode_TR.srt", job.id)
    );

    let source = SubtitleCollection::read_cues(&input)?;
    let translated = SubtitleCollection::read_cues(&output)?;
    assert_eq!(translated.len(), 7);
    for (original, result) in source.iter().zip(&translated) {
        assert_eq!(original.index(), result.index());
        assert_eq!(original.start(), result.start());
        assert_eq!(original.end(), result.end());
        assert_eq!(original.line_count(), result.line_count(), "line count of cue {}", original.index());
        assert!(!result.text().is_empty());
    }

    let words = |cues: &[subresync::Cue]| {
        cues.iter()
            .flat_map(|cue| cue.text().split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .collect::<Vec<_>>()
    };
    assert_eq!(words(&source), words(&translated));
    Ok(())
}

/// Test a provider failure while translating leaves the job in error at 20%
#[tokio::test]
async fn test_pipeline_withFailingTranslator_shouldStopAtTranslatingCheckpoint() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_fragmented_subtitle(temp_dir.path(), "episode.srt")?;
    let manager = common::job_manager(temp_dir.path(), Arc::new(MockTranslator::failing()));

    let job = manager.create_job(&input, "en", "TR")?;
    manager.start_translation(&job.id)?.await?;
    let snapshot = manager.snapshot(&job.id)?;

    assert_eq!(snapshot.status, JobStatus::Error);
    assert_eq!(snapshot.progress, 20);
    let error = snapshot.error.expect("failed job keeps its error");
    assert!(error.contains("500"), "unexpected error: {}", error);
    assert_eq!(snapshot.output_path, None);
    Ok(())
}

/// Test translate requests are rejected unless the job is uploaded or errored
#[tokio::test]
async fn test_startTranslation_whileRunningOrCompleted_shouldBeRejected() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_fragmented_subtitle(temp_dir.path(), "episode.srt")?;
    let manager = common::job_manager(temp_dir.path(), Arc::new(MockTranslator::slow(300)));

    let job = manager.create_job(&input, "en", "TR")?;
    let worker = manager.start_translation(&job.id)?;

    let running = manager.start_translation(&job.id).unwrap_err();
    assert!(matches!(running, JobError::AlreadyRunning(_)));

    worker.await?;
    assert_eq!(manager.snapshot(&job.id)?.status, JobStatus::Completed);

    let completed = manager.start_translation(&job.id).unwrap_err();
    assert!(matches!(completed, JobError::InvalidTransition { .. }));
    Ok(())
}

/// Test an errored job can be translated again
#[tokio::test]
async fn test_startTranslation_afterError_shouldRunAgain() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_fragmented_subtitle(temp_dir.path(), "episode.srt")?;
    let translator = Arc::new(SwitchableTranslator::default());
    translator.failing.store(true, Ordering::SeqCst);
    let manager = common::job_manager(temp_dir.path(), translator.clone());

    let job = manager.create_job(&input, "en", "TR")?;
    manager.start_translation(&job.id)?.await?;
    assert_eq!(manager.snapshot(&job.id)?.status, JobStatus::Error);

    translator.failing.store(false, Ordering::SeqCst);
    manager.start_translation(&job.id)?.await?;

    let snapshot = manager.snapshot(&job.id)?;
    assert_eq!(snapshot.status, JobStatus::Completed);
    assert_eq!(snapshot.error, None);
    assert_eq!(snapshot.progress, 100);
    Ok(())
}

/// Test the watch stream delivers non-decreasing progress and ends at the terminal state
#[tokio::test]
async fn test_watch_shouldEndAfterTerminalSnapshot() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_fragmented_subtitle(temp_dir.path(), "episode.srt")?;
    let manager = common::job_manager(temp_dir.path(), Arc::new(MockTranslator::slow(20)));

    let job = manager.create_job(&input, "en", "TR")?;
    let updates = manager.watch(&job.id)?;
    let worker = manager.start_translation(&job.id)?;

    let snapshots: Vec<_> = updates.collect().await;
    worker.await?;

    assert!(snapshots.len() >= 2);
    assert!(snapshots.windows(2).all(|w| w[0].progress <= w[1].progress));
    let last = snapshots.last().unwrap();
    assert_eq!(last.status, JobStatus::Completed);
    assert_eq!(last.progress, 100);
    assert_eq!(snapshots.iter().filter(|s| s.status.is_terminal()).count(), 1);
    Ok(())
}

/// Test polling returns the final snapshot
#[tokio::test]
async fn test_waitForCompletion_shouldReturnTerminalSnapshot() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_fragmented_subtitle(temp_dir.path(), "episode.srt")?;
    let manager = common::job_manager(temp_dir.path(), Arc::new(MockTranslator::prefixed()));

    let job = manager.create_job(&input, "en", "TR")?;
    let _worker = manager.start_translation(&job.id)?;
    let snapshot = manager.wait_for_completion(&job.id).await?;

    assert_eq!(snapshot.status, JobStatus::Completed);
    let translated = SubtitleCollection::read_cues(manager.output_path(&job.id)?)?;
    assert!(translated[0].text().starts_with("[TR]"));
    assert!(!translated[1].text().contains("[TR]"));
    assert_eq!(translated[2].text(), "[TR] Here comes another one!");
    Ok(())
}

/// Test the source language is detected when set to auto
#[tokio::test]
async fn test_pipeline_withAutoSource_shouldRecordDetectedLanguage() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_fragmented_subtitle(temp_dir.path(), "episode.srt")?;
    let manager = common::job_manager(temp_dir.path(), Arc::new(MockTranslator::identity()));

    let job = manager.create_job(&input, "auto", "TR")?;
    manager.start_translation(&job.id)?.await?;
    let snapshot = manager.snapshot(&job.id)?;

    assert_eq!(snapshot.status, JobStatus::Completed);
    assert_eq!(snapshot.detected_language.as_deref(), Some("en"));
    Ok(())
}

/// Test a mismatched detector is recorded as a fallback with a warning
#[tokio::test]
async fn test_pipeline_withoutModelForLanguage_shouldRecordFallback() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_fragmented_subtitle(temp_dir.path(), "episode.srt")?;
    let config = common::test_config(temp_dir.path());
    let batch = BatchTranslator::new(Arc::new(MockTranslator::identity()), TranslationCache::new(false), 10, 2);
    let registry = Arc::new(DetectorRegistry::new(vec![SegmentationModel::new("en", "en_rules")]));
    let manager = JobManager::new(PipelineContext::new(batch, registry), config.jobs.clone());

    let job = manager.create_job(&input, "pl", "TR")?;
    manager.start_translation(&job.id)?.await?;
    let snapshot = manager.snapshot(&job.id)?;

    assert_eq!(snapshot.status, JobStatus::Completed);
    assert_eq!(snapshot.used_model.as_deref(), Some("en_rules"));
    assert!(snapshot.fallback);
    assert!(snapshot.warning.is_some());
    Ok(())
}

/// Test a panicking worker is recorded as a job error
#[tokio::test]
async fn test_pipeline_withPanickingTranslator_shouldRecordError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_fragmented_subtitle(temp_dir.path(), "episode.srt")?;
    let manager = common::job_manager(temp_dir.path(), Arc::new(PanickingTranslator));

    let job = manager.create_job(&input, "en", "TR")?;
    manager.start_translation(&job.id)?.await?;
    let snapshot = manager.snapshot(&job.id)?;

    assert_eq!(snapshot.status, JobStatus::Error);
    assert!(snapshot.error.unwrap().contains("translator exploded"));
    Ok(())
}

/// Test invalid submissions never become jobs
#[tokio::test]
async fn test_createJob_withInvalidFiles_shouldRejectSubmission() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let manager = common::job_manager(temp_dir.path(), Arc::new(MockTranslator::identity()));

    let text_file = common::create_test_file(temp_dir.path(), "notes.txt", "hello")?;
    let err = manager.create_job(&text_file, "en", "TR").unwrap_err();
    assert!(matches!(err, AppError::Caption(CaptionError::UnsupportedFormat(_))));

    let empty = common::create_test_file(temp_dir.path(), "empty.srt", "")?;
    let err = manager.create_job(&empty, "en", "TR").unwrap_err();
    assert!(matches!(err, AppError::Caption(CaptionError::NoCues)));

    assert!(manager.list().is_empty());
    Ok(())
}

/// Test removing a job deletes its files and forgets it
#[tokio::test]
async fn test_remove_shouldDeleteStoredFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_fragmented_subtitle(temp_dir.path(), "episode.srt")?;
    let manager = common::job_manager(temp_dir.path(), Arc::new(MockTranslator::identity()));

    let job = manager.create_job(&input, "en", "TR")?;
    manager.start_translation(&job.id)?.await?;
    let output = manager.output_path(&job.id)?;
    assert!(output.exists());

    manager.remove(&job.id)?;

    assert!(!output.exists());
    assert!(input.exists());
    assert!(matches!(manager.snapshot(&job.id), Err(JobError::NotFound(_))));
    assert!(matches!(manager.start_translation("nope"), Err(JobError::NotFound(_))));
    Ok(())
}

/// Test a running job cannot be removed and keeps its stored source
#[tokio::test]
async fn test_remove_whileRunning_shouldKeepJobAndSource() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_fragmented_subtitle(temp_dir.path(), "episode.srt")?;
    let manager = common::job_manager(temp_dir.path(), Arc::new(MockTranslator::slow(300)));

    let job = manager.create_job(&input, "en", "TR")?;
    let worker = manager.start_translation(&job.id)?;

    let err = manager.remove(&job.id).unwrap_err();
    assert!(matches!(err, JobError::AlreadyRunning(_)));
    assert_eq!(std::fs::read_dir(temp_dir.path().join("uploads"))?.count(), 1);

    worker.await?;
    let snapshot = manager.snapshot(&job.id)?;
    assert_eq!(snapshot.status, JobStatus::Completed);

    manager.remove(&job.id)?;
    assert!(matches!(manager.start_translation(&job.id), Err(JobError::NotFound(_))));
    Ok(())
}

