//! Run metrics
//!
//! Pure computation over counts and timestamps; the orchestrator fills
//! these in at the end of every `run`, including the degenerate
//! zero-count case for "no data found" (which is success, not failure).

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetrics {
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Seconds between start and finish; `None` if either bound is missing.
    pub duration_secs: Option<f64>,
    pub total_records: usize,
    pub successful_records: usize,
    pub failed_records: usize,
    /// `successful / total`, 0.0 when the run saw no records.
    pub success_rate: f64,
}

/// Compute the metrics record for a finished (or short-circuited) run.
pub fn compute_metrics(
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    total_records: usize,
    successful_records: usize,
) -> RunMetrics {
    let duration_secs = match (started_at, finished_at) {
        (Some(start), Some(end)) => Some((end - start).num_milliseconds() as f64 / 1000.0),
        _ => None,
    };

    let success_rate = if total_records > 0 {
        successful_records as f64 / total_records as f64
    } else {
        0.0
    };

    RunMetrics {
        started_at,
        finished_at,
        duration_secs,
        total_records,
        successful_records,
        failed_records: total_records.saturating_sub(successful_records),
        success_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn duration_and_rate_are_derived() {
        let start = Utc.with_ymd_and_hms(2025, 9, 6, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 9, 6, 12, 0, 30).unwrap();

        let metrics = compute_metrics(Some(start), Some(end), 10, 7);
        assert_eq!(metrics.duration_secs, Some(30.0));
        assert_eq!(metrics.success_rate, 0.7);
        assert_eq!(metrics.failed_records, 3);
    }

    #[test]
    fn missing_bounds_leave_duration_unset() {
        let metrics = compute_metrics(Some(Utc::now()), None, 2, 2);
        assert_eq!(metrics.duration_secs, None);
        assert_eq!(metrics.success_rate, 1.0);
    }

    #[test]
    fn empty_run_reports_zero_rate() {
        let metrics = compute_metrics(None, None, 0, 0);
        assert_eq!(metrics.total_records, 0);
        assert_eq!(metrics.success_rate, 0.0);
        assert_eq!(metrics.failed_records, 0);
    }
}
