//! Historical range source
//!
//! Scrapes the multi-day results table of the historical page. The table
//! layout drifts between site revisions, so row selection walks a
//! selector cascade and takes the first one that yields rows. The weekly
//! loader on top splits long ranges into 7-day windows so a single bad
//! week does not sink a year-long backfill request.

use crate::error::{Phase, PipelineError, ScrapeError};
use crate::fetch::{self, PageClient};
use crate::pipeline::{DateRange, ScrapeSource};
use crate::retry::{run_with_backoff, RetryPolicy};
use crate::sources::{clean_number, element_text, selector};
use crate::types::{title_case, Draw, DrawRecord, RawRecord, SourceMetadata};
use animalitos_common::animals;
use animalitos_common::config::{PipelineConfig, URL_HISTORICO};
use animalitos_common::normalize::{convert_time_12h_to_24h, date_range_is_valid, parse_spanish_date};
use animalitos_common::storage;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use scraper::Html;
use serde_json::json;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Row selectors tried in order; the first one that matches wins.
const ROW_SELECTORS: &[&str] = &[
    "table tbody tr",
    ".results-table tbody tr",
    ".lotto-table tbody tr",
    "table tr",
    ".result-row",
];

/// Scraper for the historical range pages.
pub struct LottoActivoSource {
    name: String,
    url_template: String,
    client: PageClient,
    output_dir: PathBuf,
    data_dir: PathBuf,
}

impl LottoActivoSource {
    pub fn new(config: &PipelineConfig) -> Result<Self, ScrapeError> {
        Self::with_template(config, URL_HISTORICO)
    }

    /// Same scraper pointed at an alternate historical page.
    pub fn with_template(config: &PipelineConfig, template: &str) -> Result<Self, ScrapeError> {
        Ok(Self {
            name: "lotto-activo".to_string(),
            url_template: template.to_string(),
            client: PageClient::new(config)?,
            output_dir: config.output_dir.clone(),
            data_dir: config.data_dir.clone(),
        })
    }

    fn record_from_raw(&self, item: &RawRecord) -> Option<DrawRecord> {
        let date = item.get("fecha")?.as_str()?;
        let number = item.get("numero")?.as_str()?;
        let animal = item.get("animal")?.as_str()?;
        let time = item
            .get("hora")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let draw = Draw {
            date: date.to_string(),
            time,
            animal: title_case(animal),
            number: number.to_string(),
            color: None,
            image: None,
        };
        let validated = draw.passes_validation();
        if !validated {
            warn!(
                fecha = date,
                numero = number,
                animal,
                "record fails cross-validation, keeping as unvalidated"
            );
        }

        // concrete page URL stamped at extraction; template as fallback
        let url = item
            .get("url_fuente")
            .and_then(|v| v.as_str())
            .unwrap_or(&self.url_template);

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
impl ScrapeSource for LottoActivoSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract(&self, range: &DateRange) -> Result<Vec<RawRecord>, ScrapeError> {
        let url = fetch::range_url(
            &self.url_template,
            &range.start.to_string(),
            &range.end.to_string(),
        );
        info!(url, "requesting historical range");
        let body = self.client.get_html(&url).await?;

        let mut rows = parse_history_rows(&body);
        for row in &mut rows {
            row["url_fuente"] = serde_json::Value::String(url.clone());
        }
        Ok(rows)
    }

    fn transform(&self, raw: &[RawRecord]) -> Result<Vec<DrawRecord>, ScrapeError> {
        let mut records = Vec::with_capacity(raw.len());
        let mut dropped = 0usize;

        for item in raw {
            match self.record_from_raw(item) {
                Some(record) => records.push(record),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!(dropped, kept = records.len(), "incomplete rows dropped");
        }
        Ok(records)
    }

    async fn persist(&self, records: &[DrawRecord]) -> Result<PathBuf, ScrapeError> {
        let stamp = Utc::now().format("%Y%m%d_%H%M%S");
        let file_name = format!("{}_{stamp}.json", self.name.replace('-', "_"));

        let output = self.output_dir.join(&self.name).join(&file_name);
        storage::save_json(&records, &output, false)?;

        // mirror copy for the consolidated data consumers
        let mirror = self.data_dir.join(&self.name).join(&file_name);
        storage::save_json(&records, &mirror, false)?;

        Ok(output)
    }
}

/// Parse the historical table into raw records.
///
/// Each surviving row yields an object with the normalized `fecha`,
/// `numero` and `animal`, the raw cell texts, and its 1-based position.
/// Rows missing any of the three mandatory fields are skipped here; they
/// never reach the transform phase.
fn parse_history_rows(html: &str) -> Vec<RawRecord> {
    let document = Html::parse_document(html);
    let cell_sel = selector("td, th");

    let mut rows = Vec::new();
    for css in ROW_SELECTORS {
        let sel = selector(css);
        rows = document.select(&sel).collect();
        if !rows.is_empty() {
            debug!(selector = css, rows = rows.len(), "table rows located");
            break;
        }
    }
    if rows.is_empty() {
        warn!("no table rows found on historical page");
        return Vec::new();
    }

    let mut records = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        let cells: Vec<String> = row
            .select(&cell_sel)
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect();
        if cells.len() < 3 {
            continue;
        }

        let fecha_raw = &cells[0];
        let numero_raw = &cells[1];
        let animal_raw = &cells[2];
        let hora_raw = cells.get(3);

        let Some(fecha) = parse_spanish_date(fecha_raw) else {
            debug!(fila = index + 1, fecha = %fecha_raw, "unparseable date, skipping row");
            continue;
        };
        let Some(numero) = clean_number(numero_raw) else {
            debug!(fila = index + 1, numero = %numero_raw, "unparseable number, skipping row");
            continue;
        };
        let Some(animal) = animals::find_animal(animal_raw) else {
            debug!(fila = index + 1, animal = %animal_raw, "unknown animal, skipping row");
            continue;
        };
        let hora = hora_raw.and_then(|h| convert_time_12h_to_24h(h));

        records.push(json!({
            "fecha": fecha,
            "numero": numero,
            "animal": animal,
            "hora": hora,
            "fecha_raw": fecha_raw,
            "numero_raw": numero_raw,
            "animal_raw": animal_raw,
            "fila": index + 1,
        }));
    }
    records
}

/// Backfill driver that loads a long range in 7-day windows and writes
/// one consolidated file for the whole span.
pub struct HistoricalLoader {
    source: LottoActivoSource,
    policy: RetryPolicy,
    data_dir: PathBuf,
}

impl HistoricalLoader {
    pub fn new(config: &PipelineConfig) -> Result<Self, ScrapeError> {
        Ok(Self {
            source: LottoActivoSource::new(config)?,
            policy: RetryPolicy::new(config.max_retries, config.retry_delay()),
            data_dir: config.data_dir.clone(),
        })
    }

    /// Loader over the alternate historical site.
    pub fn with_template(config: &PipelineConfig, template: &str) -> Result<Self, ScrapeError> {
        Ok(Self {
            source: LottoActivoSource::with_template(config, template)?,
            policy: RetryPolicy::new(config.max_retries, config.retry_delay()),
            data_dir: config.data_dir.clone(),
        })
    }

    /// Load `start..=end` week by week, consolidating into
    /// `historical_data_<start>_to_<end>.json` under the data directory.
    pub async fn load_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(Vec<DrawRecord>, PathBuf), PipelineError> {
        if !date_range_is_valid(start, end) {
            return Err(PipelineError::Validation(format!(
                "invalid backfill range {start} -> {end}"
            )));
        }

        let mut all = Vec::new();
        let mut week_start = start;
        while week_start <= end {
            let week_end = (week_start + Duration::days(6)).min(end);
            let range = DateRange {
                start: week_start,
                end: week_end,
            };
            info!(start = %week_start, end = %week_end, "loading week");

            let source = &self.source;
            let raw = run_with_backoff(self.policy, "extract", || async move {
                source.extract(&range).await
            })
            .await
            .map_err(|e| PipelineError::phase(Phase::Extract, self.policy.attempts(), e))?;

            let records = self
                .source
                .transform(&raw)
                .map_err(|e| PipelineError::phase(Phase::Transform, 1, e))?;
            info!(start = %week_start, records = records.len(), "week loaded");
            all.extend(records);

            week_start += Duration::days(7);
        }

        let path = self
            .data_dir
            .join(format!("historical_data_{start}_to_{end}.json"));
        storage::save_json(&all, &path, true)
            .map_err(|e| PipelineError::phase(Phase::Persist, 1, e.into()))?;

        info!(path = %path.display(), total = all.len(), "backfill consolidated");
        Ok((all, path))
    }
}
