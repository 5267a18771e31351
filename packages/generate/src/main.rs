#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Command-line entry point for the `SafeCity` pipeline.
//!
//! `run` merges the raw sources into the Parquet table and writes the AI
//! report; `top` and `ask` read that table back.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use safecity_ai::analysis::analyze;
use safecity_ai::providers::create_provider;
use safecity_analytics::{filter_records, headline, top_departments};
use safecity_analytics_models::Filter;
use safecity_generate::{PipelineConfig, RunOptions, load_output, persist, run};

#[derive(Parser)]
#[command(name = "safecity_generate", about = "French crime data pipeline")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge the raw sources, write the Parquet table and the AI report
    Run {
        /// Crime workbook
        #[arg(long)]
        crimes: Option<PathBuf>,
        /// Population workbook
        #[arg(long)]
        population: Option<PathBuf>,
        /// Department boundaries (`GeoJSON`)
        #[arg(long)]
        geo: Option<PathBuf>,
        /// Parquet output
        #[arg(long)]
        output: Option<PathBuf>,
        /// Do not request the AI report
        #[arg(long)]
        skip_report: bool,
    },
    /// Rank departments by mean crime rate
    Top {
        /// Only this year
        #[arg(long)]
        year: Option<i32>,
        /// Number of departments
        #[arg(short, long, default_value_t = 10)]
        n: usize,
    },
    /// Ask the language model a question about the data
    Ask {
        /// The question
        question: String,
        /// Only this year
        #[arg(long)]
        year: Option<i32>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let mut config = PipelineConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            crimes,
            population,
            geo,
            output,
            skip_report,
        } => {
            if let Some(path) = crimes {
                config.crimes_path = path;
            }
            if let Some(path) = population {
                config.population_path = path;
            }
            if let Some(path) = geo {
                config.geo_path = path;
            }
            if let Some(path) = output {
                config.output_path = path;
            }

            let summary = run(&config, RunOptions { skip_report }, None).await?;
            let stats = &summary.stats;
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
            if stats.departments_without_boundary > 0 {
                println!(
                    "{} departments with crime data but no boundary were left out",
                    stats.departments_without_boundary
                );
            }
            if summary.report_written {
                println!("AI report: {}", config.report_path().display());
            }
        }
        Commands::Top { year, n } => {
            let all = persist::read_unified(&config.output_path)?;
            let filter = Filter {
                year,
                department: None,
            };
            let records = filter_records(&all, &filter);
            let metrics = headline(records.iter().copied(), &all);

            println!("{}", filter.describe());
            println!(
                "Total crimes: {}  Mean rate: {:.2}  Evolution: {:.2}%",
                metrics.total_crimes, metrics.mean_crime_rate, metrics.evolution_percent
            );
            for (rank, entry) in top_departments(records.iter().copied(), n).iter().enumerate() {
                println!(
                    "{:>3}. {} {:<28} {:>10.2}",
                    rank + 1,
                    entry.department_id,
                    entry.name,
                    entry.mean_crime_rate
                );
            }
        }
        Commands::Ask { question, year } => {
            let filter = Filter {
                year,
                department: None,
            };
            let records = load_output(&config, &filter)?;
            let provider = create_provider(&config.ai)?;
            println!("{}", analyze(provider.as_ref(), &records, Some(&question)).await);
        }
    }

    Ok(())
}
