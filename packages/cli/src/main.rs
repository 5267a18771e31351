#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive CLI for the `SafeCity` toolchain.
//!
//! Lets users pick a task (merge the sources, browse the merged table, ask
//! the language model) and guides them through its options.
//!
//! Uses `indicatif-log-bridge` (via [`safecity_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod dashboard;
mod pipeline;

use std::path::Path;

use dialoguer::{Input, Select};
use safecity_generate::PipelineConfig;

/// Top-level task selection.
enum Tool {
    RunPipeline,
    TopDepartments,
    YearlyTotals,
    AiReport,
    AskQuestion,
}

impl Tool {
    const ALL: &[Self] = &[
        Self::RunPipeline,
        Self::TopDepartments,
        Self::YearlyTotals,
        Self::AiReport,
        Self::AskQuestion,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::RunPipeline => "Run pipeline (merge sources, write Parquet)",
            Self::TopDepartments => "Top departments by crime rate",
            Self::YearlyTotals => "Yearly totals",
            Self::AiReport => "AI report",
            Self::AskQuestion => "Ask the AI a question",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = safecity_cli_utils::init_logger();

    println!("SafeCity Toolchain");
    println!();

    let config_path: String = Input::new()
        .with_prompt("Config file (empty for defaults)")
        .allow_empty(true)
        .interact_text()?;
    let config_path = config_path.trim();
    let config = if config_path.is_empty() {
        PipelineConfig::default()
    } else {
        PipelineConfig::load(Path::new(config_path))?
    };

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::RunPipeline => pipeline::run(&multi, config).await?,
        Tool::TopDepartments => dashboard::top(&config)?,
        Tool::YearlyTotals => dashboard::yearly(&config)?,
        Tool::AiReport => dashboard::ask(&config, false).await?,
        Tool::AskQuestion => dashboard::ask(&config, true).await?,
    }

    Ok(())
}
