//! Pipeline orchestrator
//!
//! The three-phase template: extract -> transform -> persist, each phase
//! driven through the shared retry executor, with uniform validation,
//! logging and metrics regardless of how different the raw pages look.
//!
//! One instance owns its run state and is not safe for concurrent
//! `run` calls; use one instance per source (or per logical unit of
//! work) when scraping in parallel.

use crate::error::{Phase, PipelineError, ScrapeError};
use crate::metrics::{compute_metrics, RunMetrics};
use crate::quality::{evaluate_quality, QualityReport};
use crate::retry::{run_with_backoff, RetryPolicy};
use crate::types::{DrawRecord, RawRecord};
use animalitos_common::config::PipelineConfig;
use animalitos_common::normalize::{clean_records, date_range_is_valid, MAX_RANGE_DAYS};
use animalitos_common::storage;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Inclusive date range for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Iterate the days of the range in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }
}

/// The per-source phase contract the orchestrator drives.
///
/// Implementations hold all page-structure knowledge; the orchestrator
/// knows nothing about selectors or URL shapes.
#[async_trait]
pub trait ScrapeSource: Send + Sync {
    /// Source identifier used in logs and filenames.
    fn name(&self) -> &str;

    /// Fetch raw records for the range. A page that legitimately has no
    /// data for the range returns an empty batch, not an error.
    async fn extract(&self, range: &DateRange) -> Result<Vec<RawRecord>, ScrapeError>;

    /// Normalize a raw batch into canonical records. Individual
    /// malformed records are dropped with a warning; only systemic
    /// failures error out the whole batch.
    fn transform(&self, raw: &[RawRecord]) -> Result<Vec<DrawRecord>, ScrapeError>;

    /// Durably write the processed batch; the returned path exists once
    /// the call returns.
    async fn persist(&self, records: &[DrawRecord]) -> Result<PathBuf, ScrapeError>;
}

/// Snapshot of a pipeline instance's current state.
#[derive(Debug, Clone, Serialize)]
pub struct RunStatus {
    pub source: String,
    pub raw_records: usize,
    pub processed_records: usize,
    /// Structural quality of the last extracted batch, pre-cleanup.
    pub quality: Option<QualityReport>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct RunState {
    raw: Vec<RawRecord>,
    processed: Vec<DrawRecord>,
    quality: Option<QualityReport>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

/// The pipeline template bound to one source.
pub struct Pipeline<S> {
    source: S,
    policy: RetryPolicy,
    max_payload_mb: f64,
    state: RunState,
}

impl<S: ScrapeSource> Pipeline<S> {
    pub fn new(source: S, config: &PipelineConfig) -> Self {
        Self {
            source,
            policy: RetryPolicy::new(config.max_retries, config.retry_delay()),
            max_payload_mb: config.max_payload_mb,
            state: RunState::default(),
        }
    }

    /// Override the retry policy (tests, aggressive callers).
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Clear all run state; also done implicitly at the start of `run`.
    pub fn reset(&mut self) {
        self.state = RunState::default();
    }

    /// Current state snapshot without exposing the batches.
    pub fn status(&self) -> RunStatus {
        RunStatus {
            source: self.source.name().to_string(),
            raw_records: self.state.raw.len(),
            processed_records: self.state.processed.len(),
            quality: self.state.quality.clone(),
            started_at: self.state.started_at,
            finished_at: self.state.finished_at,
        }
    }

    /// Run the full extract -> transform -> persist flow for a range.
    ///
    /// Returns metrics on success, including the all-zero case when the
    /// source has no data for the range. Fails fast with
    /// [`PipelineError::Validation`] on a bad range; any phase that
    /// exhausts its retries surfaces as [`PipelineError::PhaseFailed`]
    /// with the root cause attached.
    pub async fn run(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RunMetrics, PipelineError> {
        self.reset();
        self.state.started_at = Some(Utc::now());

        if !date_range_is_valid(start, end) {
            return Err(PipelineError::Validation(format!(
                "invalid date range {start} -> {end} (start must not exceed end, span at most {MAX_RANGE_DAYS} days)"
            )));
        }

        let range = DateRange { start, end };
        info!(
            source = self.source.name(),
            %start,
            %end,
            "starting pipeline run"
        );

        // Phase 1: extract, with the serialized-size guard
        let source = &self.source;
        let limit_mb = self.max_payload_mb;
        let raw = run_with_backoff(self.policy, "extract", || async move {
            let batch = source.extract(&range).await?;
            let size_mb = storage::approx_size_mb(&batch)?;
            if size_mb > limit_mb {
                return Err(ScrapeError::PayloadTooLarge {
                    size_mb,
                    limit_mb,
                });
            }
            Ok(batch)
        })
        .await
        .map_err(|e| PipelineError::phase(Phase::Extract, self.policy.attempts(), e))?;

        // Score the batch as extracted; cleanup below removes exactly
        // the records the evaluator flags, so scoring must come first.
        let report = evaluate_quality(&raw);
        if !report.valid {
            warn!(
                source = self.source.name(),
                quality_score = report.quality_score,
                issues = ?report.issues,
                "raw batch has structural issues"
            );
        }
        self.state.quality = Some(report);

        let raw = clean_records(raw);
        if raw.is_empty() {
            info!(source = self.source.name(), "no data found for range");
            return Ok(self.finish(0, 0));
        }

        let total = raw.len();
        info!(
            source = self.source.name(),
            records = total,
            "extraction complete"
        );
        self.state.raw = raw.clone();

        // Phase 2: transform
        let source = &self.source;
        let raw_ref = &raw;
        let processed = run_with_backoff(self.policy, "transform", || async move {
            source.transform(raw_ref)
        })
        .await
        .map_err(|e| PipelineError::phase(Phase::Transform, self.policy.attempts(), e))?;

        if processed.is_empty() {
            warn!(
                source = self.source.name(),
                raw_records = total,
                "no records survived transformation"
            );
            return Ok(self.finish(total, 0));
        }

        let successful = processed.len();
        info!(
            source = self.source.name(),
            valid = successful,
            dropped = total - successful,
            "transformation complete"
        );

        // Phase 3: persist
        let source = &self.source;
        let processed_ref = &processed;
        let location = run_with_backoff(self.policy, "persist", || async move {
            source.persist(processed_ref).await
        })
        .await
        .map_err(|e| PipelineError::phase(Phase::Persist, self.policy.attempts(), e))?;

        info!(
            source = self.source.name(),
            path = %location.display(),
            "batch persisted"
        );

        self.state.processed = processed;
        Ok(self.finish(total, successful))
    }

    fn finish(&mut self, total: usize, successful: usize) -> RunMetrics {
        self.state.finished_at = Some(Utc::now());
        let metrics = compute_metrics(
            self.state.started_at,
            self.state.finished_at,
            total,
            successful,
        );
        info!(
            source = self.source.name(),
            total = metrics.total_records,
            successful = metrics.successful_records,
            success_rate = metrics.success_rate,
            "pipeline run finished"
        );
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_days_iterates_inclusive_bounds() {
        let range = DateRange {
            start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
        };
        let days: Vec<_> = range.days().collect();
        assert_eq!(days.len(), 3);
        assert_eq!(range.span_days(), 2);
    }
}
