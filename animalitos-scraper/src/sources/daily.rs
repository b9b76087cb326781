//! Per-day results source
//!
//! The daily page lists one `div.col-sm-6` block per time slot. An
//! instance is bound to one calendar date, which names the output file;
//! `extract` still honors the range it is given, so the same source can
//! sweep several days in one run when a caller asks for it.

use crate::error::ScrapeError;
use crate::fetch::{self, PageClient};
use crate::pipeline::{DateRange, ScrapeSource};
use crate::sources::{clean_number, parse_result_blocks};
use crate::types::{title_case, Draw, DrawRecord, RawRecord, SourceMetadata};
use animalitos_common::animals;
use animalitos_common::config::{PipelineConfig, URL_DIARIO};
use animalitos_common::normalize::convert_time_12h_to_24h;
use animalitos_common::storage;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};

/// Scraper for the per-day results page.
pub struct DailyDrawsSource {
    name: String,
    url_template: String,
    client: PageClient,
    output_dir: PathBuf,
    date: NaiveDate,
}

impl DailyDrawsSource {
    /// Source bound to `date`; run it with `pipeline.run(date, date)`.
    pub fn for_date(config: &PipelineConfig, date: NaiveDate) -> Result<Self, ScrapeError> {
        Ok(Self {
            name: "daily-draws".to_string(),
            url_template: URL_DIARIO.to_string(),
            client: PageClient::new(config)?,
            output_dir: config.output_dir.clone(),
            date,
        })
    }

    /// The date this instance reports on.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    fn record_from_raw(&self, item: &RawRecord, url: &str) -> Option<DrawRecord> {
        let date = item.get("fecha")?.as_str()?;
        let numero_raw = item.get("numero")?.as_str()?;
        let animal_raw = item.get("animal")?.as_str()?;

        let number = clean_number(numero_raw)?;
        // resolve against the vocabulary; keep the page's name when the
        // lookup fails so the record survives as unvalidated
        let animal = animals::find_animal(animal_raw)
            .map(title_case)
            .unwrap_or_else(|| title_case(animal_raw));

        let time = item
            .get("hora")
            .and_then(|v| v.as_str())
            .map(|h| convert_time_12h_to_24h(h).unwrap_or_else(|| h.to_string()));

        let draw = Draw {
            date: date.to_string(),
            time,
            animal,
            number,
            color: item.get("color").and_then(|v| v.as_str()).map(str::to_string),
            image: item.get("imagen").and_then(|v| v.as_str()).map(str::to_string),
        };
        let validated = draw.passes_validation();
        if !validated {
            warn!(
                fecha = date,
                numero = numero_raw,
                animal = animal_raw,
                "daily block fails cross-validation, keeping as unvalidated"
            );
        }

        Some(DrawRecord {
            draw,
            source: SourceMetadata {
                url: url.to_string(),
                script: self.name.clone(),
                processed_at: Utc::now().to_rfc3339(),
            },
            validated,
        })
    }
}

#[async_trait]
impl ScrapeSource for DailyDrawsSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract(&self, range: &DateRange) -> Result<Vec<RawRecord>, ScrapeError> {
        let mut raw = Vec::new();
        for date in range.days() {
            let url = fetch::date_url(&self.url_template, &date.to_string());
            info!(url, "requesting daily results");
            let body = self.client.get_html(&url).await?;

            let blocks = daily_raw_records(&body, date);
            if blocks.is_empty() {
                warn!(%date, "no result blocks on daily page");
            }
            raw.extend(blocks);
        }
        Ok(raw)
    }

    fn transform(&self, raw: &[RawRecord]) -> Result<Vec<DrawRecord>, ScrapeError> {
        let url = fetch::date_url(&self.url_template, &self.date.to_string());
        let mut records = Vec::with_capacity(raw.len());
        let mut dropped = 0usize;

        for item in raw {
            match self.record_from_raw(item, &url) {
                Some(record) => records.push(record),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!(dropped, kept = records.len(), "malformed blocks dropped");
        }
        Ok(records)
    }

    async fn persist(&self, records: &[DrawRecord]) -> Result<PathBuf, ScrapeError> {
        let path = self
            .output_dir
            .join(format!("daily_results_{}.json", self.date));
        storage::save_json(&records, &path, false)?;
        Ok(path)
    }
}

/// Turn the page's result blocks into raw records for `date`.
fn daily_raw_records(html: &str, date: NaiveDate) -> Vec<RawRecord> {
    parse_result_blocks(html)
        .into_iter()
        .filter_map(|block| {
            let (numero, animal) = match block.split_title() {
                Some(parts) => parts,
                None => return None,
            };
            Some(json!({
                "fecha": date.to_string(),
                "numero": numero,
                "animal": animal,
                "hora": block.schedule,
                "color": block.color,
                "imagen": block.image,
            }))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <div class="col-sm-6">
            <h4 class="mt-3 rojo">34 Venado</h4>
            <h5>09:00 AM</h5>
            <div class="circle"><img src="/img/venado.png"></div>
        </div>
        <div class="col-sm-6">
            <h4 class="negro mt-3">0 Delfin</h4>
            <h5>10:00 AM</h5>
        </div>
        <div class="col-sm-6">
            <h4>Proximo sorteo</h4>
            <h5>11:00 AM</h5>
        </div>
    "#;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 6).unwrap()
    }

    #[test]
    fn page_blocks_become_raw_records() {
        let raw = daily_raw_records(PAGE, date());
        // the non-numeric "Proximo sorteo" block is dropped
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[0]["fecha"], "2025-09-06");
        assert_eq!(raw[0]["numero"], "34");
        assert_eq!(raw[0]["animal"], "Venado");
        assert_eq!(raw[0]["hora"], "09:00 AM");
        assert_eq!(raw[0]["color"], "rojo");
        assert_eq!(raw[0]["imagen"], "/img/venado.png");
        assert_eq!(raw[1]["numero"], "0");
    }

    #[test]
    fn transform_normalizes_time_and_validates() {
        let config = PipelineConfig::default();
        let source = DailyDrawsSource::for_date(&config, date()).unwrap();

        let raw = daily_raw_records(PAGE, date());
        let records = source.transform(&raw).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].draw.time.as_deref(), Some("09:00:00"));
        assert_eq!(records[0].draw.number, "34");
        assert_eq!(records[0].draw.animal, "Venado");
        assert_eq!(records[0].draw.color.as_deref(), Some("rojo"));
        assert!(records[0].validated);

        // "0 Delfin" keeps the single-zero key
        assert_eq!(records[1].draw.number, "0");
        assert!(records[1].validated);
    }

    #[test]
    fn unknown_animal_survives_as_unvalidated() {
        let config = PipelineConfig::default();
        let source = DailyDrawsSource::for_date(&config, date()).unwrap();

        let raw = vec![json!({
            "fecha": "2025-09-06",
            "numero": "12",
            "animal": "Unicornio",
            "hora": "09:00 AM",
        })];
        let records = source.transform(&raw).unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].validated);
        assert_eq!(records[0].draw.animal, "Unicornio");
    }
}
