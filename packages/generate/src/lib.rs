#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The `SafeCity` merging pipeline.
//!
//! Reads the crime workbook (one sheet per force and year), the population
//! workbook and the department boundaries, merges them into one row per
//! department and year with a crime rate per 100,000 inhabitants, writes
//! the result to Parquet and asks the language model for a report.
//!
//! Everything up to the Parquet file is synchronous; only the report
//! request awaits.

pub mod config;
pub mod merge;
pub mod paths;
pub mod persist;

use std::sync::Arc;

use safecity_ai::analysis::analyze;
use safecity_ai::providers::{LlmProvider, create_provider};
use safecity_analytics::filter_records;
use safecity_analytics_models::Filter;
use safecity_crime_models::UnifiedRecord;
use safecity_geography::GeoError;
use safecity_geography::ingest::load_departments;
use safecity_source::SourceError;
use safecity_source::progress::{ProgressCallback, null_progress};
use thiserror::Error;

pub use config::{ConfigError, PipelineConfig};
pub use merge::MergeStats;
pub use persist::PersistError;

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A source workbook could not be read, or the population table is
    /// missing.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The boundary file could not be loaded.
    #[error(transparent)]
    Geo(#[from] GeoError),

    /// The output could not be written or read.
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Options for a single run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Do not request the AI report.
    pub skip_report: bool,
}

/// What a run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Merge counters.
    pub stats: MergeStats,
    /// Whether the AI report was written.
    pub report_written: bool,
}

/// Loads all three sources and merges them.
///
/// A population failure aborts; missing or empty crime sheets only
/// degrade the result.
///
/// # Errors
///
/// Returns [`PipelineError`] if a workbook or the boundary file cannot be
/// read or the population table is not found.
pub fn build_dataset(
    config: &PipelineConfig,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<(Vec<UnifiedRecord>, MergeStats), PipelineError> {
    log::info!("Loading crime sheets from {}", config.crimes_path.display());
    let crimes = merge::load_crimes(&config.crimes_path, &config.crime_sheets(), progress)?;

    log::info!("Loading population from {}", config.population_path.display());
    let population =
        merge::load_population(&config.population_path, &config.population_sheet_markers)?;

    log::info!("Loading boundaries from {}", config.geo_path.display());
    let geo = load_departments(&config.geo_path, &config.geo)?;

    let (records, mut stats) = merge::merge(&crimes.records, &population, &geo, &config.years);
    stats.sheets_read = crimes.sheets_read;
    stats.empty_sheets = crimes.empty_sheets;
    stats.missing_sheets = crimes.missing_sheets;

    Ok((records, stats))
}

/// Runs the whole pipeline: merge, write Parquet, write the AI report.
///
/// The report is skipped with a warning when no API key is configured.
///
/// # Errors
///
/// Returns [`PipelineError`] if merging fails or an output cannot be
/// written.
pub async fn run(
    config: &PipelineConfig,
    options: RunOptions,
    progress: Option<Arc<dyn ProgressCallback>>,
) -> Result<RunSummary, PipelineError> {
    let progress = progress.unwrap_or_else(null_progress);

    let (records, stats) = build_dataset(config, &progress)?;
    persist::write_parquet(&records, &config.output_path)?;

    let report_written = if options.skip_report {
        log::info!("Skipping AI report");
        false
    } else {
        match create_provider(&config.ai) {
            Ok(provider) => {
                write_ai_report(provider.as_ref(), &records, config).await?;
                true
            }
            Err(e) => {
                log::warn!("AI report skipped: {e}");
                false
            }
        }
    };

    log::info!("SafeCity pipeline completed");
    Ok(RunSummary {
        stats,
        report_written,
    })
}

/// Requests a report on `records` and writes it to the configured report
/// path.
///
/// # Errors
///
/// Returns [`PipelineError::Persist`] if the report cannot be written.
pub async fn write_ai_report(
    provider: &dyn LlmProvider,
    records: &[UnifiedRecord],
    config: &PipelineConfig,
) -> Result<(), PipelineError> {
    log::info!("Generating AI report...");
    let report = analyze(provider, records, None).await;
    persist::write_report(&report, &config.report_path())?;
    Ok(())
}

/// Reads the merged table back and applies `filter`.
///
/// # Errors
///
/// Returns [`PipelineError::Persist`] if the output cannot be read.
pub fn load_output(
    config: &PipelineConfig,
    filter: &Filter,
) -> Result<Vec<UnifiedRecord>, PipelineError> {
    let records = persist::read_unified(&config.output_path)?;
    Ok(filter_records(&records, filter).into_iter().cloned().collect())
}
