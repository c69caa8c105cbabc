// nport2lake - SEC N-PORT bulk ELT driver
//
// Sequential per-period pipeline: download the month's compressed JSONL
// bulk file, decode it, derive the `_as_at_date` partition key on every
// record, and stage the annotated records as Hive-partitioned JSONL objects.
// Schema inference, Parquet conversion, and warehouse merge happen
// downstream and are not this binary's concern.

use anyhow::{Context, Result};
use nport2lake_config::{redact_secret, RuntimeConfig};
use nport2lake_core::{annotate_partition_date, decode_jsonl_gz, LoadRequest, ReportingPeriod};
use nport2lake_source::{SecApiClient, SourceError};
use nport2lake_storage::{init_operator, StagingWriter};
use tracing::{info, warn};

/// Aggregated counters across all periods of one run.
#[derive(Debug, Default)]
struct RunTotals {
    periods_staged: usize,
    periods_skipped: usize,
    bytes_downloaded: usize,
    records: usize,
    skipped_lines: usize,
    missing_partition_key: usize,
    files: usize,
}

/// Run the extract/annotate/stage pipeline for one load window.
///
/// The window is validated and expanded before any network call. Periods the
/// archive has not published yet are skipped with a warning; any other
/// failure aborts the run.
pub async fn run_extract(config: &RuntimeConfig, request: LoadRequest) -> Result<()> {
    let periods = request.expand()?;
    let client = SecApiClient::new(&config.source)?;
    let operator = init_operator(&config.storage)?;
    let writer = StagingWriter::new(operator, &config.storage.dataset);

    info!(
        periods = periods.len(),
        dataset = %config.storage.dataset,
        backend = %config.storage.backend,
        "starting N-PORT bulk extract"
    );

    let mut totals = RunTotals::default();
    for period in periods {
        let compressed = match client.fetch_bulk(period).await {
            Ok(bytes) => bytes,
            Err(SourceError::NotPublished(period)) => {
                warn!(%period, "bulk file not yet published; skipping period");
                totals.periods_skipped += 1;
                continue;
            }
            Err(err) => {
                return Err(err).with_context(|| format!("downloading bulk file for {period}"))
            }
        };

        let mut batch = decode_jsonl_gz(&compressed)
            .with_context(|| format!("decoding bulk file for {period}"))?;

        let mut missing = 0usize;
        for record in &mut batch.records {
            if annotate_partition_date(record) == ReportingPeriod::Absent {
                missing += 1;
            }
        }

        let summary = writer
            .write_period(period, &batch.records)
            .await
            .with_context(|| format!("staging records for {period}"))?;

        info!(
            %period,
            bytes = compressed.len(),
            records = batch.records.len(),
            skipped_lines = batch.skipped_lines,
            missing_partition_key = missing,
            files = summary.files,
            "staged period"
        );

        totals.periods_staged += 1;
        totals.bytes_downloaded += compressed.len();
        totals.records += summary.records;
        totals.skipped_lines += batch.skipped_lines;
        totals.missing_partition_key += missing;
        totals.files += summary.files;
    }

    info!(
        periods_staged = totals.periods_staged,
        periods_skipped = totals.periods_skipped,
        bytes_downloaded = totals.bytes_downloaded,
        records = totals.records,
        skipped_lines = totals.skipped_lines,
        missing_partition_key = totals.missing_partition_key,
        files = totals.files,
        "extract complete"
    );

    Ok(())
}

/// Print the manifest of bulk files the SEC API has available.
pub async fn list_files(config: &RuntimeConfig) -> Result<()> {
    let client = SecApiClient::new(&config.source)?;
    let files = client.list_available().await?;

    println!("{} bulk files available:\n", files.len());
    for file in &files {
        println!(
            "  {:<32} {:>9.1} MiB    updated: {}",
            file.key,
            file.size_mib(),
            file.updated_at
        );
    }

    Ok(())
}

/// Print the resolved configuration with secrets redacted.
pub fn show_config(config: &RuntimeConfig) {
    println!("source.base_url     = {}", config.source.base_url);
    println!(
        "source.api_key      = {}",
        config
            .source
            .api_key
            .as_deref()
            .map(redact_secret)
            .unwrap_or_else(|| "(unset)".to_string())
    );
    println!("source.user_agent   = {}", config.source.user_agent);
    println!("storage.backend     = {}", config.storage.backend);
    println!("storage.dataset     = {}", config.storage.dataset);
    match config.storage.backend {
        nport2lake_config::StorageBackend::Fs => {
            if let Some(fs) = &config.storage.fs {
                println!("storage.fs.path     = {}", fs.path);
            }
        }
        nport2lake_config::StorageBackend::S3 => {
            if let Some(s3) = &config.storage.s3 {
                println!("storage.s3.bucket   = {}", s3.bucket);
                println!("storage.s3.region   = {}", s3.region);
                if let Some(endpoint) = &s3.endpoint {
                    println!("storage.s3.endpoint = {endpoint}");
                }
                println!(
                    "storage.s3.secret   = {}",
                    redact_secret(&s3.secret_access_key)
                );
            }
        }
    }
    println!("log_level           = {}", config.log_level);
}
