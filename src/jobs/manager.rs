/*!
 * In-memory job registry.
 *
 * This module handles:
 * - Accepting caption files as jobs
 * - Starting one worker task per translate request
 * - Publishing job snapshots to observers
 * - Removing jobs and their files
 */

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use futures::stream::{self, Stream};
use log::{debug, error, info, warn};
use parking_lot::RwLock;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinHandle;

use crate::app_config::{Config, JobsConfig};
use crate::errors::{AppError, CaptionError, JobError};
use crate::file_utils::FileManager;
use crate::providers::Translator;
use crate::segmentation::DetectorRegistry;
use crate::subtitle_processor::SubtitleCollection;
use crate::translation::CacheStats;

use super::models::{Job, JobSnapshot, JobStatus};
use super::pipeline::{self, PipelineContext};

/// A job record with its update channel
#[derive(Debug)]
pub struct JobHandle {
    record: RwLock<Job>,
    updates: watch::Sender<JobSnapshot>,
}

impl JobHandle {
    fn new(job: Job) -> Self {
        let (updates, _) = watch::channel(job.snapshot());
        Self {
            record: RwLock::new(job),
            updates,
        }
    }

    pub fn snapshot(&self) -> JobSnapshot {
        self.record.read().snapshot()
    }

    /// Copy of the full record
    pub fn job(&self) -> Job {
        self.record.read().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<JobSnapshot> {
        self.updates.subscribe()
    }

    // Publishes while holding the write lock so observers see updates in order
    fn update<R>(&self, change: impl FnOnce(&mut Job) -> R) -> R {
        let mut job = self.record.write();
        let result = change(&mut job);
        job.updated_at = Utc::now();
        self.updates.send_replace(job.snapshot());
        result
    }

    fn try_update<R>(&self, change: impl FnOnce(&mut Job) -> Result<R, JobError>) -> Result<R, JobError> {
        let mut job = self.record.write();
        let result = change(&mut job)?;
        job.updated_at = Utc::now();
        self.updates.send_replace(job.snapshot());
        Ok(result)
    }

    /// Check-and-set `uploaded|error → processing` for a new run
    fn begin_run(&self, output_dir: &Path) -> Result<(), JobError> {
        self.try_update(|job| {
            if !job.status.accepts_translate() {
                return Err(if job.status.is_running() {
                    JobError::AlreadyRunning(job.id.clone())
                } else {
                    JobError::InvalidTransition {
                        id: job.id.clone(),
                        from: job.status.to_string(),
                        to: JobStatus::Processing.to_string(),
                    }
                });
            }

            let output_filename = FileManager::output_filename(&job.filename, &job.target_language);
            job.output_path = Some(output_dir.join(format!("{}_{}", job.id, output_filename)));
            job.output_filename = Some(output_filename);
            job.status = JobStatus::Processing;
            job.progress = 0;
            job.error = None;
            job.warning = None;
            job.used_model = None;
            job.fallback = false;
            job.detected_source_language = None;
            Ok(())
        })
    }
}

/// Write access to a running job, owned by its worker
#[derive(Debug, Clone)]
pub struct JobReporter {
    handle: Arc<JobHandle>,
    id: String,
}

impl JobReporter {
    fn new(handle: Arc<JobHandle>) -> Self {
        let id = handle.record.read().id.clone();
        Self { handle, id }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn job(&self) -> Job {
        self.handle.job()
    }

    /// Move the job to its next stage
    pub fn enter(&self, next: JobStatus) -> Result<(), JobError> {
        self.handle.try_update(|job| {
            if !job.status.can_transition_to(next) {
                return Err(JobError::InvalidTransition {
                    id: job.id.clone(),
                    from: job.status.to_string(),
                    to: next.to_string(),
                });
            }
            debug!("Job {}: {} -> {}", job.id, job.status, next);
            job.status = next;
            Ok(())
        })
    }

    /// Raise progress; lower values are ignored
    pub fn set_progress(&self, progress: u8) {
        self.handle.update(|job| {
            job.progress = job.progress.max(progress.min(100));
        });
    }

    pub fn record_detected_language(&self, language: &str) {
        self.handle.update(|job| {
            job.detected_source_language = Some(language.to_string());
        });
    }

    pub fn record_detector(&self, model_name: &str, fallback: bool, warning: Option<String>) {
        self.handle.update(|job| {
            job.used_model = Some(model_name.to_string());
            job.fallback = fallback;
            job.warning = warning;
        });
    }

    /// Put a running job in `error` with `message`; progress is kept
    pub fn fail(&self, message: String) {
        self.handle.update(|job| {
            if job.status.can_transition_to(JobStatus::Error) {
                job.status = JobStatus::Error;
                job.error = Some(message);
            } else {
                warn!("Job {}: ignoring failure in status {}: {}", job.id, job.status, message);
            }
        });
    }
}

/// Registry of jobs for one process
pub struct JobManager {
    jobs: RwLock<HashMap<String, Arc<JobHandle>>>,
    context: Arc<PipelineContext>,
    permits: Arc<Semaphore>,
    config: JobsConfig,
}

impl JobManager {
    pub fn new(context: PipelineContext, config: JobsConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent_jobs.max(1)));
        Self {
            jobs: RwLock::new(HashMap::new()),
            context: Arc::new(context),
            permits,
            config,
        }
    }

    /// Create a manager from the application configuration
    pub fn from_config(config: &Config, translator: Arc<dyn Translator>) -> Self {
        Self::new(PipelineContext::from_config(config, translator), config.jobs.clone())
    }

    pub fn config(&self) -> &JobsConfig {
        &self.config
    }

    pub fn registry(&self) -> &DetectorRegistry {
        &self.context.registry
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.context.batch.cache().stats()
    }

    /// Accept a caption file as a new job in `uploaded` state.
    ///
    /// The file must be an `.srt` file holding at least one cue; it is copied
    /// into the upload directory as `<job id>_<file name>`.
    pub fn create_job<P: AsRef<Path>>(
        &self,
        path: P,
        source_language: &str,
        target_language: &str,
    ) -> Result<JobSnapshot, AppError> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        if !FileManager::is_srt_file(path) {
            return Err(CaptionError::UnsupportedFormat(filename).into());
        }

        let records = SubtitleCollection::parse_srt_file(path)?;

        let id = Job::generate_id();
        let stored = FileManager::store_with_prefix(path, &self.config.upload_dir, &id)?;
        let job = Job::new(id.clone(), filename, stored, source_language, target_language);
        let snapshot = job.snapshot();

        info!("Job {} created for {} ({} cues)", id, snapshot.filename, records.len());
        self.jobs.write().insert(id, Arc::new(JobHandle::new(job)));
        Ok(snapshot)
    }

    /// Start translating a job in the background.
    ///
    /// Only jobs in `uploaded` or `error` are accepted. The returned handle
    /// resolves once the worker has finished; dropping it does not stop the job.
    pub fn start_translation(&self, id: &str) -> Result<JoinHandle<()>, JobError> {
        // Registry lock held across the check-and-set so `remove` cannot interleave
        let handle = {
            let jobs = self.jobs.read();
            let handle = jobs.get(id).cloned().ok_or_else(|| JobError::NotFound(id.to_string()))?;
            handle.begin_run(&self.config.output_dir)?;
            handle
        };
        info!("Job {} accepted for translation", id);

        let reporter = JobReporter::new(handle);
        let context = Arc::clone(&self.context);
        let permits = Arc::clone(&self.permits);

        Ok(tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    reporter.fail("Job scheduler is shut down".to_string());
                    return;
                }
            };

            let worker_reporter = reporter.clone();
            let worker = tokio::spawn(async move {
                pipeline::run(&context, &worker_reporter).await;
            });

            if let Err(e) = worker.await {
                let message = if e.is_panic() {
                    format!("Worker panicked: {}", panic_message(e.into_panic()))
                } else {
                    format!("Worker stopped: {}", e)
                };
                error!("Job {}: {}", reporter.id(), message);
                reporter.fail(message);
            }
        }))
    }

    /// Current snapshot of a job
    pub fn snapshot(&self, id: &str) -> Result<JobSnapshot, JobError> {
        Ok(self.handle(id)?.snapshot())
    }

    /// Snapshots of all jobs, oldest first
    pub fn list(&self) -> Vec<JobSnapshot> {
        let mut jobs: Vec<Job> = self.jobs.read().values().map(|h| h.job()).collect();
        jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        jobs.iter().map(Job::snapshot).collect()
    }

    /// Receiver holding the latest snapshot of a job
    pub fn subscribe(&self, id: &str) -> Result<watch::Receiver<JobSnapshot>, JobError> {
        Ok(self.handle(id)?.subscribe())
    }

    /// Stream of snapshots, starting with the current one and ending after
    /// the first terminal snapshot.
    ///
    /// Intermediate snapshots may be skipped when the job moves faster than
    /// the observer reads.
    pub fn watch(&self, id: &str) -> Result<impl Stream<Item = JobSnapshot> + Send + 'static, JobError> {
        let receiver = self.subscribe(id)?;
        Ok(stream::unfold((receiver, false, true), |(mut receiver, finished, first)| async move {
            if finished {
                return None;
            }
            if !first && receiver.changed().await.is_err() {
                return None;
            }
            let snapshot = receiver.borrow_and_update().clone();
            let finished = snapshot.status.is_terminal();
            Some((snapshot, (receiver, finished, false)))
        }))
    }

    /// Poll a job every `poll_interval_ms` until it is no longer running
    pub async fn wait_for_completion(&self, id: &str) -> Result<JobSnapshot, JobError> {
        let interval = Duration::from_millis(self.config.poll_interval_ms.max(1));
        loop {
            let snapshot = self.snapshot(id)?;
            if !snapshot.status.is_running() {
                return Ok(snapshot);
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Path of the translated file of a completed job
    pub fn output_path(&self, id: &str) -> Result<PathBuf, JobError> {
        let job = self.handle(id)?.job();
        match (job.status, job.output_path) {
            (JobStatus::Completed, Some(path)) => Ok(path),
            (status, _) => Err(JobError::InvalidTransition {
                id: job.id,
                from: status.to_string(),
                to: "download".to_string(),
            }),
        }
    }

    /// Forget a job and delete its stored files. Running jobs are kept.
    pub fn remove(&self, id: &str) -> Result<JobSnapshot, JobError> {
        let mut jobs = self.jobs.write();
        let handle = jobs.get(id).cloned().ok_or_else(|| JobError::NotFound(id.to_string()))?;
        let job = handle.job();
        if job.status.is_running() {
            return Err(JobError::AlreadyRunning(id.to_string()));
        }
        jobs.remove(id);
        drop(jobs);

        for path in std::iter::once(&job.source_path).chain(job.output_path.as_ref()) {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    debug!("Could not remove {:?}: {}", path, e);
                }
            }
        }

        info!("Job {} removed", id);
        Ok(job.snapshot())
    }

    /// Delete leftover files in the upload and output directories
    pub fn cleanup_dirs(config: &JobsConfig) -> Result<usize> {
        let removed = FileManager::clean_dir(&config.upload_dir)? + FileManager::clean_dir(&config.output_dir)?;
        if removed > 0 {
            info!("Removed {} leftover files from job directories", removed);
        }
        Ok(removed)
    }

    fn handle(&self, id: &str) -> Result<Arc<JobHandle>, JobError> {
        self.jobs
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| JobError::NotFound(id.to_string()))
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
