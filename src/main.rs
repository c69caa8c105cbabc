use anyhow::{Context, Result};
use chrono::Datelike;
use clap::Parser;
use nport2lake_config::RuntimeConfig;
use nport2lake_core::LoadRequest;
use std::path::PathBuf;
use tracing::info;

/// Stage SEC N-PORT bulk filings into a date-partitioned bronze layer
#[derive(Parser)]
#[command(name = "nport2lake")]
#[command(version)]
#[command(about = "Stage SEC N-PORT bulk filings into a date-partitioned bronze layer", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Load a single month (e.g. --month 2024 10)
    #[arg(long, num_args = 2, value_names = ["YEAR", "MONTH"], conflicts_with_all = ["quarter", "year", "range"])]
    month: Option<Vec<i64>>,

    /// Load a quarter (e.g. --quarter 2024 4)
    #[arg(long, num_args = 2, value_names = ["YEAR", "QUARTER"], conflicts_with_all = ["year", "range"])]
    quarter: Option<Vec<i64>>,

    /// Load a full year (e.g. --year 2024)
    #[arg(long, value_name = "YEAR", conflicts_with = "range")]
    year: Option<i32>,

    /// Load a date range (e.g. --range 2023 6 2024 11)
    #[arg(long, num_args = 4, value_names = ["START_YEAR", "START_MONTH", "END_YEAR", "END_MONTH"])]
    range: Option<Vec<i64>>,

    /// List available bulk files from the SEC API and exit
    #[arg(long)]
    list_files: bool,

    /// Print the resolved configuration and exit
    #[arg(long)]
    show_config: bool,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?
        .block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    let mut config = if let Some(config_path) = &cli.config {
        RuntimeConfig::load_from_path(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        RuntimeConfig::load().context("Failed to load configuration")?
    };

    // CLI overrides beat everything
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }

    init_tracing(&config);

    if cli.show_config {
        nport2lake::show_config(&config);
        return Ok(());
    }

    if cli.list_files {
        return nport2lake::list_files(&config).await;
    }

    let request = load_request(&cli)?;
    nport2lake::run_extract(&config, request).await
}

fn load_request(cli: &Cli) -> Result<LoadRequest> {
    if let Some(values) = &cli.month {
        return Ok(LoadRequest::Month {
            year: cli_year(values[0])?,
            month: clamp_month(values[1]),
        });
    }
    if let Some(values) = &cli.quarter {
        return Ok(LoadRequest::Quarter {
            year: cli_year(values[0])?,
            quarter: clamp_month(values[1]),
        });
    }
    if let Some(year) = cli.year {
        return Ok(LoadRequest::Year { year });
    }
    if let Some(values) = &cli.range {
        return Ok(LoadRequest::Range {
            start_year: cli_year(values[0])?,
            start_month: clamp_month(values[1]),
            end_year: cli_year(values[2])?,
            end_month: clamp_month(values[3]),
        });
    }

    // No window given: the most recent complete calendar month.
    let today = chrono::Utc::now().date_naive();
    let (year, month) = if today.month() == 1 {
        (today.year() - 1, 12)
    } else {
        (today.year(), today.month() - 1)
    };
    info!(
        "no load window requested; defaulting to most recent complete month {}-{:02}",
        year, month
    );
    Ok(LoadRequest::Month { year, month })
}

/// Map CLI integers onto the u32 month/quarter domain. Negative and oversized
/// values become 0, which expansion rejects as out of range.
fn clamp_month(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// Years outside the i32 domain cannot name any archive period; reject them
/// instead of wrapping.
fn cli_year(value: i64) -> Result<i32> {
    i32::try_from(value).map_err(|_| anyhow::anyhow!("year {value} is out of range"))
}

fn init_tracing(config: &RuntimeConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .init();
}
