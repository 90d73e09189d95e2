use anyhow::{anyhow, Context, Result};
use futures::StreamExt;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::app_config::{Config, TranslationProvider};
use crate::file_utils::FileManager;
use crate::jobs::{JobManager, JobStatus};
use crate::providers::{DeepL, MockTranslator, Translator};
use crate::resync::{merge_sentences, smart_split};
use crate::segmentation::DetectorRegistry;
use crate::subtitle_processor::{Cue, Timecode};

// @module: Application controller for caption translation

// @const: Fragmented sample cues shown by the demo
const DEMO_TEXTS: &[&str] = &[
    "This is the beginning of",
    "a sentence that was split.",
    "Here comes another one!",
    "And this sentence spans",
    "across multiple",
    "subtitle blocks.",
    "Final sentence here.",
];

// @const: Sample translation and ratios for the split demo
const DEMO_TRANSLATION: &str = "Bu örnek bir Türkçe çeviri cümlesidir";
const DEMO_RATIOS: &[f64] = &[0.35, 0.65];

/// Outcome counts of a folder run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FolderSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller for caption translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Job registry shared by all files of a run
    jobs: Arc<JobManager>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let translator = Self::build_translator(&config)?;
        Ok(Self::with_translator(config, translator))
    }

    /// Create a controller around an existing translator
    pub fn with_translator(config: Config, translator: Arc<dyn Translator>) -> Self {
        if config.jobs.cleanup_on_start {
            if let Err(e) = JobManager::cleanup_dirs(&config.jobs) {
                warn!("Failed to clean job directories: {}", e);
            }
        }

        let jobs = Arc::new(JobManager::from_config(&config, translator));
        Self { config, jobs }
    }

    /// Translator for the configured provider
    pub fn build_translator(config: &Config) -> Result<Arc<dyn Translator>> {
        let translation = &config.translation;
        let translator: Arc<dyn Translator> = match translation.provider {
            TranslationProvider::DeepL => {
                if translation.api_key.trim().is_empty() {
                    return Err(anyhow!("DeepL requires an API key (set translation.api_key or DEEPL_API_KEY)"));
                }
                Arc::new(DeepL::new(
                    translation.api_key.clone(),
                    translation.endpoint.clone(),
                    translation.timeout_secs,
                ))
            }
            TranslationProvider::Mock => Arc::new(MockTranslator::prefixed()),
        };
        Ok(translator)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn jobs(&self) -> &JobManager {
        &self.jobs
    }

    /// Translate one caption file into `output_dir`.
    ///
    /// Returns the written path, or `None` when the output already exists and
    /// `force_overwrite` is not set.
    pub async fn run(&self, input_file: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<Option<PathBuf>> {
        if !input_file.is_file() {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let output_path = output_dir.join(FileManager::output_filename(&input_file, &self.config.target_language));
        if output_path.exists() && !force_overwrite {
            warn!("Skipping file, translation already exists (use -f to force overwrite): {}", output_path.display());
            return Ok(None);
        }

        let start_time = Instant::now();
        let multi_progress = MultiProgress::new();
        let written = self.process_file(&input_file, &output_path, &multi_progress).await?;
        info!("Translation completed in {}.", Self::format_duration(start_time.elapsed()));
        Ok(Some(written))
    }

    /// Translate every caption file in a directory, one job per file, concurrently
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<FolderSummary> {
        if !input_dir.is_dir() {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let target_suffix = format!("_{}", self.config.target_language.trim().to_uppercase());
        let files: Vec<PathBuf> = FileManager::find_srt_files(&input_dir)?
            .into_iter()
            .filter(|path| {
                !path
                    .file_stem()
                    .is_some_and(|stem| stem.to_string_lossy().ends_with(&target_suffix))
            })
            .collect();

        if files.is_empty() {
            return Err(anyhow!("No caption files found in directory: {:?}", input_dir));
        }

        let start_time = Instant::now();
        let multi_progress = MultiProgress::new();
        let folder_pb = multi_progress.add(ProgressBar::new(files.len() as u64));
        folder_pb.set_style(Self::progress_style("files"));
        folder_pb.set_message("Processing files");

        let mut summary = FolderSummary::default();
        let mut pending = Vec::new();
        for file in &files {
            let output_dir = file.parent().map(Path::to_path_buf).unwrap_or_else(|| input_dir.clone());
            let output_path = output_dir.join(FileManager::output_filename(file, &self.config.target_language));
            if output_path.exists() && !force_overwrite {
                warn!("Skipping {}, translation already exists (use -f to force overwrite)", file.display());
                summary.skipped += 1;
                folder_pb.inc(1);
                continue;
            }
            pending.push((file.clone(), output_path));
        }

        let results = futures::future::join_all(pending.iter().map(|(file, output_path)| {
            let folder_pb = folder_pb.clone();
            let multi_progress = &multi_progress;
            async move {
                let result = self.process_file(file, output_path, multi_progress).await;
                folder_pb.inc(1);
                (file, result)
            }
        }))
        .await;

        for (file, result) in results {
            match result {
                Ok(_) => summary.processed += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", file.display(), e);
                    summary.failed += 1;
                }
            }
        }

        folder_pb.finish_with_message("Folder processing complete");
        info!(
            "Folder processing completed: {} processed, {} skipped, {} errors ({})",
            summary.processed,
            summary.skipped,
            summary.failed,
            Self::format_duration(start_time.elapsed())
        );

        let stats = self.jobs.cache_stats();
        if stats.hits > 0 {
            info!("Translation cache: {} hits, {} entries", stats.hits, stats.entries);
        }

        Ok(summary)
    }

    /// Submit a file as a job, follow it to the end and copy the result to `output_path`
    async fn process_file(&self, input_file: &Path, output_path: &Path, multi_progress: &MultiProgress) -> Result<PathBuf> {
        let job = self
            .jobs
            .create_job(input_file, &self.config.source_language, &self.config.target_language)
            .with_context(|| format!("Failed to submit {}", input_file.display()))?;

        let progress_bar = multi_progress.add(ProgressBar::new(100));
        progress_bar.set_style(Self::progress_style("%"));
        progress_bar.set_message(job.filename.clone());

        let worker = self.jobs.start_translation(&job.id)?;
        let mut updates = Box::pin(self.jobs.watch(&job.id)?);
        while let Some(snapshot) = updates.next().await {
            progress_bar.set_position(u64::from(snapshot.progress));
            progress_bar.set_message(format!("{} ({})", snapshot.filename, snapshot.status));
        }
        if let Err(e) = worker.await {
            warn!("Job {} worker did not finish cleanly: {}", job.id, e);
        }
        progress_bar.finish_and_clear();

        let result = self.collect_result(&job.id, output_path);
        if let Err(e) = self.jobs.remove(&job.id) {
            warn!("Failed to remove job {}: {}", job.id, e);
        }
        result
    }

    fn collect_result(&self, job_id: &str, output_path: &Path) -> Result<PathBuf> {
        let snapshot = self.jobs.snapshot(job_id)?;
        match snapshot.status {
            JobStatus::Completed => {
                if let Some(warning) = &snapshot.warning {
                    warn!("{}: {}", snapshot.filename, warning);
                }
                let produced = self.jobs.output_path(job_id)?;
                if let Some(parent) = output_path.parent() {
                    FileManager::ensure_dir(parent)?;
                }
                std::fs::copy(&produced, output_path)
                    .with_context(|| format!("Failed to copy {:?} to {:?}", produced, output_path))?;
                info!("Success: {}", output_path.display());
                Ok(output_path.to_path_buf())
            }
            status => Err(anyhow!(
                "Translation of {} ended in status {}: {}",
                snapshot.filename,
                status,
                snapshot.error.unwrap_or_else(|| "no error recorded".to_string())
            )),
        }
    }

    /// Sample cues the demo merges
    pub fn demo_cues() -> Vec<Cue> {
        DEMO_TEXTS
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let index = i + 1;
                let start = Timecode::from_millis(index as u64 * 2_000);
                let end = Timecode::from_millis(index as u64 * 2_000 + 2_000);
                Cue::new(index, start, end, text)
            })
            .collect()
    }

    /// Merge the sample cues and split a sample translation, as printable text
    pub fn demo_report(registry: &DetectorRegistry, lang_code: &str) -> String {
        let cues = Self::demo_cues();
        let selection = registry.select(lang_code);
        let sentences = merge_sentences(&cues, selection.detector.as_ref());

        let mut report = String::new();
        let rule = "=".repeat(60);
        let _ = writeln!(report, "{}", rule);
        let _ = writeln!(report, "subresync demo ({})", selection.model_name);
        let _ = writeln!(report, "{}", rule);

        let _ = writeln!(report, "\nSample fragmented cues:");
        for cue in &cues {
            let _ = writeln!(report, "  Cue {}: '{}'", cue.index(), cue.text());
        }

        let _ = writeln!(report, "\nDetected {} complete sentences:", sentences.len());
        for (i, sentence) in sentences.iter().enumerate() {
            let ratios: Vec<String> = sentence.char_ratios.iter().map(|r| format!("{:.2}", r)).collect();
            let _ = writeln!(report, "\n  Sentence {}: '{}'", i + 1, sentence.full_text);
            let _ = writeln!(report, "    Source cues: {:?}", sentence.cue_indices());
            let _ = writeln!(report, "    Char ratios: [{}]", ratios.join(", "));
        }

        let fragments = smart_split(DEMO_TRANSLATION, DEMO_RATIOS);
        let _ = writeln!(report, "\nSplit example:");
        let _ = writeln!(report, "  Original: '{}'", DEMO_TRANSLATION);
        let _ = writeln!(report, "  Ratios: {:?}", DEMO_RATIOS);
        let _ = writeln!(report, "  Split result: {:?}", fragments);
        let _ = writeln!(report, "\n{}", rule);
        report
    }

    fn progress_style(unit: &str) -> ProgressStyle {
        let template = format!(
            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}} {{eta}}",
            unit
        );
        ProgressStyle::default_bar()
            .template(&template)
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░")
    }

    // Format duration in a human-readable format (HH:MM:SS)
    pub fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
