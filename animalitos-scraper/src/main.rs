//! Command-line entry point for the animalitos scraping pipeline.

use animalitos_common::config::{PipelineConfig, URL_HISTORICO, URL_HISTORICO_ALT};
use animalitos_scraper::pipeline::Pipeline;
use animalitos_scraper::sources::{
    DailyDrawsSource, HistoricalLoader, LastDrawFetcher, LottoActivoSource,
};
use anyhow::Context;
use chrono::{Duration, Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "animalitos-scraper")]
#[command(about = "Scrape and normalize Lotto Activo draw results")]
struct Cli {
    /// Path to a TOML config file (falls back to ANIMALITOS_CONFIG, then
    /// the platform config directory, then defaults).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Backfill a historical date range.
    Historical {
        /// Range start (YYYY-MM-DD).
        #[arg(long)]
        start: NaiveDate,
        /// Range end (YYYY-MM-DD), defaults to today.
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Load in 7-day windows and write one consolidated file.
        #[arg(long)]
        weekly: bool,
        /// Use the alternate historical site.
        #[arg(long)]
        alt: bool,
    },
    /// Scrape one day's results page (defaults to yesterday).
    Daily {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Fetch the most recent draw and append it to the day's rolling file.
    Latest {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config =
        PipelineConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Command::Historical {
            start,
            end,
            weekly,
            alt,
        } => {
            let end = end.unwrap_or_else(today);
            let template = if alt {
                URL_HISTORICO_ALT
            } else {
                URL_HISTORICO
            };
            if weekly {
                let loader = HistoricalLoader::with_template(&config, template)?;
                let (records, path) = loader.load_range(start, end).await?;
                info!(
                    records = records.len(),
                    path = %path.display(),
                    "historical backfill complete"
                );
            } else {
                let source = LottoActivoSource::with_template(&config, template)?;
                let mut pipeline = Pipeline::new(source, &config);
                let metrics = pipeline.run(start, end).await?;
                print_metrics(&metrics)?;
            }
        }
        Command::Daily { date } => {
            let date = date.unwrap_or_else(|| today() - Duration::days(1));
            let source = DailyDrawsSource::for_date(&config, date)?;
            let mut pipeline = Pipeline::new(source, &config);
            let metrics = pipeline.run(date, date).await?;
            print_metrics(&metrics)?;
        }
        Command::Latest { date } => {
            let date = date.unwrap_or_else(today);
            let fetcher = LastDrawFetcher::new(&config)?;
            match fetcher.fetch_latest(date).await? {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => info!(%date, "no draw published yet"),
            }
        }
    }

    Ok(())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn print_metrics(metrics: &animalitos_scraper::metrics::RunMetrics) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(metrics)?);
    Ok(())
}
