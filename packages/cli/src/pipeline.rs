//! Interactive pipeline run.
//!
//! Prompts for input overrides, then merges the sources with an `indicatif`
//! bar reporting one step per crime sheet.

use std::path::PathBuf;
use std::time::Instant;

use dialoguer::{Confirm, Input};
use safecity_cli_utils::{IndicatifProgress, MultiProgress};
use safecity_generate::{PipelineConfig, RunOptions};

/// Runs the merge pipeline.
///
/// The `multi` parameter is the shared [`MultiProgress`] that is also
/// registered with the log bridge.
///
/// # Errors
///
/// Returns an error if a prompt fails or the pipeline cannot produce its
/// outputs.
#[allow(clippy::future_not_send)]
pub async fn run(
    multi: &MultiProgress,
    mut config: PipelineConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();

    let change_paths = Confirm::new()
        .with_prompt("Override input/output paths?")
        .default(false)
        .interact()?;

    if change_paths {
        config.crimes_path = prompt_path("Crime workbook", &config.crimes_path)?;
        config.population_path = prompt_path("Population workbook", &config.population_path)?;
        config.geo_path = prompt_path("Department boundaries (GeoJSON)", &config.geo_path)?;
        config.output_path = prompt_path("Parquet output", &config.output_path)?;
    }

    let skip_report = !Confirm::new()
        .with_prompt("Generate the AI report?")
        .default(true)
        .interact()?;

    let progress = IndicatifProgress::sheets_bar(multi, "Reading crime sheets");
    let summary =
        safecity_generate::run(&config, RunOptions { skip_report }, Some(progress)).await?;
    let stats = &summary.stats;

    println!();
    println!(
        "{} rows for {} departments written to {}",
        stats.rows,
        stats.departments,
        config.output_path.display()
    );
    println!(
        "Crime sheets: {} read, {} empty, {} missing",
        stats.sheets_read, stats.empty_sheets, stats.missing_sheets
    );
    if stats.departments_without_population > 0 {
        println!(
            "{} departments have no population figure",
            stats.departments_without_population
        );
    }
    if stats.departments_without_boundary > 0 {
        println!(
            "{} departments with crime data but no boundary were left out",
            stats.departments_without_boundary
        );
    }
    if summary.report_written {
        println!("AI report: {}", config.report_path().display());
    }

    log::info!("Pipeline complete in {:.1}s", start.elapsed().as_secs_f64());
    Ok(())
}

fn prompt_path(prompt: &str, current: &std::path::Path) -> Result<PathBuf, dialoguer::Error> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .default(current.display().to_string())
        .interact_text()?;
    Ok(PathBuf::from(value.trim()))
}
