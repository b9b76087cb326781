//! Error taxonomy for the scraping pipeline
//!
//! Two layers: [`ScrapeError`] is what a single phase attempt produces
//! and what the retry driver consumes; [`PipelineError`] is the single
//! error type `run` surfaces, carrying which phase gave up and the root
//! cause. Validation failures never reach the retry driver.

use std::fmt;
use thiserror::Error;

/// The three phases of the pipeline template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Extract,
    Transform,
    Persist,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Extract => write!(f, "extract"),
            Phase::Transform => write!(f, "transform"),
            Phase::Persist => write!(f, "persist"),
        }
    }
}

/// Failure of a single phase attempt. Retried by the executor.
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Network or page-structure failure during extraction
    #[error("scraping error: {0}")]
    Scraping(String),

    /// Systemic failure while transforming a batch
    #[error("processing error: {0}")]
    Processing(String),

    /// Persistence did not durably complete
    #[error("saving error: {0}")]
    Saving(String),

    /// Extracted batch exceeds the configured size cap
    #[error("extracted batch is {size_mb:.2} MB, exceeds the {limit_mb:.2} MB limit")]
    PayloadTooLarge { size_mb: f64, limit_mb: f64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] animalitos_common::Error),
}

/// What `Pipeline::run` surfaces: exactly one error type for callers.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Bad input range or configuration. Fails fast, never retried.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A phase exhausted its retries; the last error is attached.
    #[error("{phase} phase failed after {attempts} attempt(s): {source}")]
    PhaseFailed {
        phase: Phase,
        attempts: u32,
        #[source]
        source: ScrapeError,
    },
}

impl PipelineError {
    pub fn phase(phase: Phase, attempts: u32, source: ScrapeError) -> Self {
        Self::PhaseFailed {
            phase,
            attempts,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_failure_names_the_phase() {
        let err = PipelineError::phase(
            Phase::Persist,
            3,
            ScrapeError::Saving("disk full".into()),
        );
        let text = err.to_string();
        assert!(text.contains("persist"));
        assert!(text.contains("3 attempt(s)"));
        assert!(text.contains("disk full"));
    }

    #[test]
    fn payload_error_reports_sizes_in_mb() {
        let err = ScrapeError::PayloadTooLarge {
            size_mb: 63.4,
            limit_mb: 50.0,
        };
        assert!(err.to_string().contains("63.40 MB"));
    }
}
