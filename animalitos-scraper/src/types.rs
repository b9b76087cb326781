//! Canonical record types
//!
//! The persisted JSON keeps the Spanish wire keys consumed downstream
//! (`sorteo` / `fuente_scraper` / `validado`); the Rust side uses plain
//! English names. The nested shape is the canonical one — the flat
//! single-phase shape from older source versions is not emitted.

use animalitos_common::animals;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A raw record as scraped, before normalization. Shape varies per
/// source (daily blocks, pivoted weekly tables, single-result pages).
pub type RawRecord = serde_json::Value;

/// One draw result in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawRecord {
    #[serde(rename = "sorteo")]
    pub draw: Draw,
    #[serde(rename = "fuente_scraper")]
    pub source: SourceMetadata,
    #[serde(rename = "validado")]
    pub validated: bool,
}

/// The draw itself: a date, a time slot, an animal and its number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draw {
    /// ISO calendar date, `YYYY-MM-DD`
    #[serde(rename = "fecha")]
    pub date: String,
    /// `HH:MM:SS` after normalization; raw pages may carry `HH:MM AM/PM`
    #[serde(rename = "hora")]
    pub time: Option<String>,
    /// Title-case animal name
    #[serde(rename = "animal")]
    pub animal: String,
    /// Zero-padded draw number, `"0"`/`"00".."36"`
    #[serde(rename = "numero")]
    pub number: String,
    /// Page-styling tag ("rojo"/"negro"), no semantic validation
    #[serde(rename = "color", default)]
    pub color: Option<String>,
    /// Opaque image URI from the page
    #[serde(rename = "imagen", default)]
    pub image: Option<String>,
}

/// Provenance attached to every persisted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    #[serde(rename = "url_fuente")]
    pub url: String,
    /// Ingestion script identifier, e.g. "lotto-activo"
    #[serde(rename = "script")]
    pub script: String,
    /// ISO timestamp of processing
    #[serde(rename = "procesado_el")]
    pub processed_at: String,
}

impl Draw {
    /// Whether the draw satisfies the canonical invariants: the date
    /// parses, the number is a vocabulary key, and the animal maps back
    /// to that same number.
    pub fn passes_validation(&self) -> bool {
        if NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").is_err() {
            return false;
        }
        if !animals::is_valid_number(&self.number) {
            return false;
        }
        matches!(animals::number_for_animal(&self.animal), Some(n) if n == self.number)
    }
}

/// Title-case a vocabulary name for the canonical record ("VENADO" -> "Venado").
pub fn title_case(name: &str) -> String {
    let lower = name.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
