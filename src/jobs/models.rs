/*!
 * Job records and their observable snapshots.
 *
 * A job moves through a fixed sequence of stages. `JobStatus` encodes which
 * moves are legal; the manager and the pipeline reporter refuse the rest.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Job status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// File accepted, waiting for a translate request
    Uploaded,
    /// Translate request accepted, worker scheduled
    Processing,
    /// Reading cues from the stored file
    Parsing,
    /// Merging cue fragments into sentences
    Merging,
    /// Sending sentences to the provider
    Translating,
    /// Splitting translations back over cues
    Splitting,
    /// Writing the output file
    Saving,
    /// Output written
    Completed,
    /// A stage failed, see the job's error message
    Error,
}

impl JobStatus {
    /// All statuses in pipeline order, `Error` last
    pub const ALL: [JobStatus; 9] = [
        JobStatus::Uploaded,
        JobStatus::Processing,
        JobStatus::Parsing,
        JobStatus::Merging,
        JobStatus::Translating,
        JobStatus::Splitting,
        JobStatus::Saving,
        JobStatus::Completed,
        JobStatus::Error,
    ];

    /// Stage that follows this one on success
    pub fn successor(&self) -> Option<JobStatus> {
        match self {
            JobStatus::Uploaded => Some(JobStatus::Processing),
            JobStatus::Processing => Some(JobStatus::Parsing),
            JobStatus::Parsing => Some(JobStatus::Merging),
            JobStatus::Merging => Some(JobStatus::Translating),
            JobStatus::Translating => Some(JobStatus::Splitting),
            JobStatus::Splitting => Some(JobStatus::Saving),
            JobStatus::Saving => Some(JobStatus::Completed),
            JobStatus::Completed | JobStatus::Error => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }

    /// A translate request is only accepted from these statuses
    pub fn accepts_translate(&self) -> bool {
        matches!(self, JobStatus::Uploaded | JobStatus::Error)
    }

    /// Whether a worker currently owns the job
    pub fn is_running(&self) -> bool {
        !self.is_terminal() && *self != JobStatus::Uploaded
    }

    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        match next {
            JobStatus::Processing => self.accepts_translate(),
            JobStatus::Error => self.is_running(),
            _ => self.successor() == Some(next),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Uploaded => write!(f, "uploaded"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Parsing => write!(f, "parsing"),
            JobStatus::Merging => write!(f, "merging"),
            JobStatus::Translating => write!(f, "translating"),
            JobStatus::Splitting => write!(f, "splitting"),
            JobStatus::Saving => write!(f, "saving"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uploaded" => Ok(JobStatus::Uploaded),
            "processing" => Ok(JobStatus::Processing),
            "parsing" => Ok(JobStatus::Parsing),
            "merging" => Ok(JobStatus::Merging),
            "translating" => Ok(JobStatus::Translating),
            "splitting" => Ok(JobStatus::Splitting),
            "saving" => Ok(JobStatus::Saving),
            "completed" => Ok(JobStatus::Completed),
            "error" => Ok(JobStatus::Error),
            _ => Err(anyhow::anyhow!("Invalid job status: {}", s)),
        }
    }
}

/// A submitted caption file and the state of its translation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    /// 0..=100
    pub progress: u8,
    /// Name the file was submitted under
    pub filename: String,
    /// Stored copy of the submitted file
    pub source_path: PathBuf,
    pub output_path: Option<PathBuf>,
    pub output_filename: Option<String>,
    /// Requested source language, `auto` to detect it
    pub source_language: String,
    pub detected_source_language: Option<String>,
    pub target_language: String,
    pub error: Option<String>,
    /// Detector provenance note, set when a fallback model was used
    pub warning: Option<String>,
    pub used_model: Option<String>,
    pub fallback: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a job in `uploaded` state
    pub fn new(
        id: String,
        filename: String,
        source_path: PathBuf,
        source_language: &str,
        target_language: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: JobStatus::Uploaded,
            progress: 0,
            filename,
            source_path,
            output_path: None,
            output_filename: None,
            source_language: source_language.to_string(),
            detected_source_language: None,
            target_language: target_language.to_string(),
            error: None,
            warning: None,
            used_model: None,
            fallback: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Short job identifier from a v4 UUID
    pub fn generate_id() -> String {
        Uuid::new_v4().simple().to_string()[..8].to_string()
    }

    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            id: self.id.clone(),
            status: self.status,
            progress: self.progress,
            error: self.error.clone(),
            warning: self.warning.clone(),
            detected_language: self.detected_source_language.clone(),
            used_model: self.used_model.clone(),
            fallback: self.fallback,
            filename: self.filename.clone(),
            output_filename: self.output_filename.clone(),
            output_path: if self.status == JobStatus::Completed {
                self.output_path.clone()
            } else {
                None
            },
            updated_at: self.updated_at,
        }
    }
}

/// Read-only copy of a job handed to observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub id: String,
    pub status: JobStatus,
    pub progress: u8,
    pub error: Option<String>,
    pub warning: Option<String>,
    pub detected_language: Option<String>,
    pub used_model: Option<String>,
    pub fallback: bool,
    pub filename: String,
    pub output_filename: Option<String>,
    /// Only present once the job is completed
    pub output_path: Option<PathBuf>,
    pub updated_at: DateTime<Utc>,
}
