//! Last published draw fetcher
//!
//! Incremental variant for intraday polling: fetch the daily page, take
//! only the newest result block, and merge it into the day's rolling
//! file through the deduplicating appender. No result yet is a normal
//! outcome, not an error.

use crate::append::append_if_new;
use crate::error::ScrapeError;
use crate::fetch::{self, PageClient};
use crate::sources::{clean_number, parse_result_blocks, ResultBlock};
use crate::types::{title_case, Draw, DrawRecord, SourceMetadata};
use animalitos_common::animals;
use animalitos_common::config::{PipelineConfig, URL_DIARIO};
use animalitos_common::normalize::convert_time_12h_to_24h;
use chrono::{NaiveDate, Utc};
use std::path::PathBuf;
use tracing::{info, warn};

const SCRIPT_NAME: &str = "last-draw";

/// Polls the daily page for the most recent draw.
pub struct LastDrawFetcher {
    url_template: String,
    client: PageClient,
    output_dir: PathBuf,
}

impl LastDrawFetcher {
    pub fn new(config: &PipelineConfig) -> Result<Self, ScrapeError> {
        Ok(Self {
            url_template: URL_DIARIO.to_string(),
            client: PageClient::new(config)?,
            output_dir: config.output_dir.clone(),
        })
    }

    /// Fetch the newest draw for `date` and append it to
    /// `last_results_<date>.json` unless it is already there.
    ///
    /// Returns the record when the page has one (whether or not it was
    /// new), `None` when nothing is published yet.
    pub async fn fetch_latest(&self, date: NaiveDate) -> Result<Option<DrawRecord>, ScrapeError> {
        let url = fetch::date_url(&self.url_template, &date.to_string());
        info!(url, "polling for latest draw");
        let body = self.client.get_html(&url).await?;

        let Some(record) = latest_record(&body, date, &url) else {
            warn!(%date, "no draw published yet");
            return Ok(None);
        };

        let path = self
            .output_dir
            .join(format!("last_results_{date}.json"));
        let added = append_if_new(&record, &path)?;
        info!(
            %date,
            numero = %record.draw.number,
            added,
            "latest draw processed"
        );
        Ok(Some(record))
    }
}

/// Build the record for the newest block on the page, if any.
fn latest_record(html: &str, date: NaiveDate, url: &str) -> Option<DrawRecord> {
    let blocks = parse_result_blocks(html);
    let block = blocks.last()?;
    record_from_block(block, date, url)
}

fn record_from_block(block: &ResultBlock, date: NaiveDate, url: &str) -> Option<DrawRecord> {
    let (numero_raw, animal_raw) = block.split_title()?;
    let number = clean_number(numero_raw)?;
    let animal = animals::find_animal(animal_raw)
        .map(title_case)
        .unwrap_or_else(|| title_case(animal_raw));
    let time = convert_time_12h_to_24h(&block.schedule)
        .unwrap_or_else(|| block.schedule.clone());

    let draw = Draw {
        date: date.to_string(),
        time: Some(time),
        animal,
        number,
        color: block.color.clone(),
        image: block.image.clone(),
    };
    let validated = draw.passes_validation();

    Some(DrawRecord {
        draw,
        source: SourceMetadata {
            url: url.to_string(),
            script: SCRIPT_NAME.to_string(),
            processed_at: Utc::now().to_rfc3339(),
        },
        validated,
    })
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
            <h4 class="negro mt-3">05 Leon</h4>
            <h5>10:00 AM</h5>
            <div class="circle"><img src="/img/leon.png"></div>
        </div>
    "#;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 6).unwrap()
    }

    #[test]
    fn takes_the_newest_block() {
        let record = latest_record(PAGE, date(), "https://example.com/").unwrap();
        assert_eq!(record.draw.number, "05");
        assert_eq!(record.draw.animal, "Leon");
        assert_eq!(record.draw.time.as_deref(), Some("10:00:00"));
        assert_eq!(record.draw.color.as_deref(), Some("negro"));
        assert_eq!(record.draw.image.as_deref(), Some("/img/leon.png"));
        assert_eq!(record.source.script, "last-draw");
        assert!(record.validated);
    }

    #[test]
    fn empty_page_has_no_record() {
        assert!(latest_record("<html></html>", date(), "https://example.com/").is_none());
    }

    #[test]
    fn non_result_trailing_block_is_rejected() {
        let html = r#"
            <div class="col-sm-6">
                <h4>Resultados</h4>
                <h5>cabecera</h5>
            </div>
        "#;
        assert!(latest_record(html, date(), "https://example.com/").is_none());
    }
}
