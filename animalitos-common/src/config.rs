//! Pipeline configuration loading
//!
//! Resolution order follows the usual priority chain: explicit path from
//! the command line, then the `ANIMALITOS_CONFIG` environment variable,
//! then the platform config directory, then compiled defaults. Every
//! field is optional in the TOML file; unset fields keep their default.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "ANIMALITOS_CONFIG";

/// URL template for the historical range page (placeholders `{start}`, `{end}`).
pub const URL_HISTORICO: &str =
    "https://loteriadehoy.com/animalito/lottoactivo/historico/{start}/{end}/";

/// Alternate historical source, same placeholders.
pub const URL_HISTORICO_ALT: &str =
    "https://lottoactivo.com/historial/lotto_activo/{start}/{end}/";

/// URL template for the per-day results page (placeholder `{date}`).
pub const URL_DIARIO: &str =
    "https://loteriadehoy.com/animalito/lottoactivo/resultados/{date}/";

/// Browser-like headers sent with every page request.
pub const DEFAULT_HEADERS: &[(&str, &str)] = &[
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
    ),
    ("Accept-Language", "es-ES,es;q=0.9,en;q=0.8"),
    ("Accept-Encoding", "gzip, deflate, br"),
    ("Connection", "keep-alive"),
    ("DNT", "1"),
    ("Upgrade-Insecure-Requests", "1"),
    ("Cache-Control", "no-cache"),
    ("X-Request-Origin", "data-pipeline/lotto-historical"),
];

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36";

/// Tunables shared by every pipeline instance.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directory for per-run batch files and incremental sinks.
    pub output_dir: PathBuf,
    /// Directory for consolidated files consumed by the API layer.
    pub data_dir: PathBuf,
    /// Maximum retries per phase (attempts = retries + 1).
    pub max_retries: u32,
    /// Base back-off delay in seconds; doubles per failed attempt.
    pub retry_delay_secs: f64,
    /// Total HTTP request timeout in seconds.
    pub timeout_secs: u64,
    /// Reject extracted batches whose serialized size exceeds this.
    pub max_payload_mb: f64,
    /// User-Agent header for page requests.
    pub user_agent: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("outputs"),
            data_dir: PathBuf::from("data"),
            max_retries: 3,
            retry_delay_secs: 2.0,
            timeout_secs: 30,
            max_payload_mb: 50.0,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration with the documented priority order.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            info!(path = %path.display(), "loading config from explicit path");
            return Self::from_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            info!(path = %path, "loading config from {CONFIG_ENV_VAR}");
            return Self::from_file(Path::new(&path));
        }

        if let Some(path) = platform_config_file() {
            if path.exists() {
                info!(path = %path.display(), "loading config from platform directory");
                return Self::from_file(&path);
            }
        }

        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let body = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: Self = toml::from_str(&body)
            .map_err(|e| Error::Config(format!("invalid config {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Base retry delay as a `Duration`.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs_f64(self.retry_delay_secs.max(0.0))
    }

    fn validate(&self) -> Result<()> {
        if self.retry_delay_secs < 0.0 {
            return Err(Error::Config("retry_delay_secs must be >= 0".into()));
        }
        if self.max_payload_mb <= 0.0 {
            return Err(Error::Config("max_payload_mb must be > 0".into()));
        }
        Ok(())
    }
}

fn platform_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("animalitos").join("config.toml"))
}
