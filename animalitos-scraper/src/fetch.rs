//! HTTP page fetcher
//!
//! One `reqwest` client shared by all sources, configured with the
//! browser-like header set and the timeouts the result pages tolerate.
//! Non-2xx responses surface as scraping errors so the retry executor
//! treats them like any other fetch failure.

use crate::error::ScrapeError;
use animalitos_common::config::{PipelineConfig, DEFAULT_HEADERS};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Thin wrapper around `reqwest::Client` for HTML page requests.
#[derive(Debug, Clone)]
pub struct PageClient {
    client: Client,
}

impl PageClient {
    pub fn new(config: &PipelineConfig) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(config.user_agent.clone())
            .default_headers(default_header_map())
            .build()?;

        Ok(Self { client })
    }

    /// GET a page and return its body as text.
    pub async fn get_html(&self, url: &str) -> Result<String, ScrapeError> {
        debug!(url, "requesting page");
        let response = self.client.get(url).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        debug!(url, bytes = body.len(), "page received");
        Ok(body)
    }
}

fn default_header_map() -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in DEFAULT_HEADERS {
        // the table is static and known-good; skip rather than panic on a typo
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, value);
        }
    }
    headers
}

/// Substitute the `{start}`/`{end}` placeholders of a range URL template.
pub fn range_url(template: &str, start: &str, end: &str) -> String {
    template.replace("{start}", start).replace("{end}", end)
}

/// Substitute the `{date}` placeholder of a single-date URL template.
pub fn date_url(template: &str, date: &str) -> String {
    template.replace("{date}", date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use animalitos_common::config::{URL_DIARIO, URL_HISTORICO};

    #[test]
    fn header_table_converts_cleanly() {
        let headers = default_header_map();
        assert_eq!(headers.len(), DEFAULT_HEADERS.len());
        assert_eq!(
            headers.get("Accept-Language").unwrap(),
            "es-ES,es;q=0.9,en;q=0.8"
        );
    }

    #[test]
    fn url_templates_substitute() {
        let url = range_url(URL_HISTORICO, "2025-01-01", "2025-01-07");
        assert!(url.ends_with("/historico/2025-01-01/2025-01-07/"));

        let url = date_url(URL_DIARIO, "2025-01-07");
        assert!(url.ends_with("/resultados/2025-01-07/"));
    }
}
