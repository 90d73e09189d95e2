/*!
 * Error types for the subresync application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with translation provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// The provider did not answer in time
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The provider returned a different number of texts than it was sent
    #[error("Provider returned {received} translations for {expected} texts")]
    ResponseMismatch {
        /// Number of texts sent
        expected: usize,
        /// Number of translations received
        received: usize,
    },
}

/// Errors raised while reading or writing caption files
#[derive(Error, Debug)]
pub enum CaptionError {
    /// The caption file could not be read
    #[error("Failed to read caption file {path}: {message}")]
    Unreadable {
        /// Path of the file
        path: String,
        /// Underlying IO message
        message: String,
    },

    /// The content holds no parsable cue
    #[error("No valid subtitle entries were found in the SRT content")]
    NoCues,

    /// A timestamp line could not be parsed
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Only .srt files are accepted
    #[error("Unsupported caption file type: {0}")]
    UnsupportedFormat(String),
}

/// Errors raised by the job registry and the pipeline
#[derive(Error, Debug)]
pub enum JobError {
    /// No job with this identifier exists
    #[error("Job not found: {0}")]
    NotFound(String),

    /// The job is already being processed
    #[error("Job {0} is already running")]
    AlreadyRunning(String),

    /// The requested state change is not allowed
    #[error("Invalid status transition for job {id}: {from} -> {to}")]
    InvalidTransition {
        /// Job identifier
        id: String,
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },

    /// A pipeline stage failed
    #[error("Stage {stage} failed: {message}")]
    StageFailed {
        /// Stage name
        stage: String,
        /// Failure description
        message: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from caption processing
    #[error("Caption error: {0}")]
    Caption(#[from] CaptionError),

    /// Error from the job pipeline
    #[error("Job error: {0}")]
    Job(#[from] JobError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(format!("{:#}", error))
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
