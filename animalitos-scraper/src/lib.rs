//! Extract-normalize-persist pipeline for animalitos draw results
//!
//! The pipeline template ([`pipeline::Pipeline`]) sequences three
//! swappable phases behind one contract ([`pipeline::ScrapeSource`]):
//! extract raw records from a lottery page, transform them into
//! canonical [`types::DrawRecord`]s, and persist them as JSON. Every
//! phase runs through the same retry-with-backoff driver and a run
//! yields a [`metrics::RunMetrics`] record.

pub mod append;
pub mod error;
pub mod fetch;
pub mod metrics;
pub mod pipeline;
pub mod quality;
pub mod retry;
pub mod sources;
pub mod types;

pub use crate::error::{Phase, PipelineError, ScrapeError};
pub use crate::pipeline::{DateRange, Pipeline, RunStatus, ScrapeSource};
pub use crate::types::{Draw, DrawRecord, RawRecord, SourceMetadata};
