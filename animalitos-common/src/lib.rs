//! Shared building blocks for the animalitos data pipeline
//!
//! Leaf crate consumed by the scraper crates: error type, configuration,
//! the animal vocabulary, locale normalization helpers and JSON file
//! storage. No networking and no HTML knowledge lives here.

pub mod animals;
pub mod config;
pub mod error;
pub mod normalize;
pub mod storage;

pub use crate::error::{Error, Result};
