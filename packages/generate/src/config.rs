//! Pipeline configuration.
//!
//! Every field has a default, so the pipeline runs without a config file.
//! A TOML file may override any subset:
//!
//! ```toml
//! crimes_path = "raw/crimes.xlsx"
//! years = [2019, 2020, 2021]
//! forces = ["PN"]
//!
//! [geo]
//! code_property = "code"
//!
//! [ai]
//! model = "mistralai/mistral-7b-instruct"
//! ```
//!
//! Relative paths in a file are resolved against the file's directory.

use std::path::{Path, PathBuf};

use safecity_ai::AiConfig;
use safecity_crime_models::{CrimeSheet, ForceType, default_years};
use safecity_geography::GeoOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::paths;

/// File name of the AI report inside [`PipelineConfig::report_dir`].
pub const DEFAULT_REPORT_FILE_NAME: &str = "latest_report.txt";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Config path.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config parsed but a value is unusable.
    #[error("Invalid config: {message}")]
    Invalid {
        /// Description of what went wrong.
        message: String,
    },
}

/// Everything the pipeline needs to know about its inputs and outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct PipelineConfig {
    /// Crime workbook (one sheet per force and year).
    pub crimes_path: PathBuf,
    /// Population workbook.
    pub population_path: PathBuf,
    /// Department boundary `GeoJSON`.
    pub geo_path: PathBuf,
    /// Merged Parquet output.
    pub output_path: PathBuf,
    /// Directory receiving the AI report.
    pub report_dir: PathBuf,
    /// AI report file name.
    pub report_file_name: String,
    /// Crime sheet years.
    pub years: Vec<i32>,
    /// Crime sheet forces.
    pub forces: Vec<ForceType>,
    /// The population sheet is the first whose name contains one of these.
    pub population_sheet_markers: Vec<String>,
    /// Boundary property names.
    pub geo: GeoOptions,
    /// Language-model endpoint.
    pub ai: AiConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            crimes_path: paths::crimes_path(),
            population_path: paths::population_path(),
            geo_path: paths::geo_path(),
            output_path: paths::output_path(),
            report_dir: paths::reports_dir(),
            report_file_name: DEFAULT_REPORT_FILE_NAME.to_string(),
            years: default_years(),
            forces: ForceType::all().to_vec(),
            population_sheet_markers: vec!["Estimation".to_string(), "2023".to_string()],
            geo: GeoOptions::default(),
            ai: AiConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Loads a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, does not parse,
    /// or leaves the sheet list empty.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let mut config = Self::parse(&contents)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads `path` if given, otherwise returns the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be loaded.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Parses TOML text without resolving paths.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text does not parse or leaves the
    /// sheet list empty.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Crime sheets to read: every year for each force in turn.
    #[must_use]
    pub fn crime_sheets(&self) -> Vec<CrimeSheet> {
        CrimeSheet::all(&self.forces, &self.years)
    }

    /// Full path of the AI report.
    #[must_use]
    pub fn report_path(&self) -> PathBuf {
        self.report_dir.join(&self.report_file_name)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.years.is_empty() {
            return Err(ConfigError::Invalid {
                message: "years must not be empty".to_string(),
            });
        }
        if self.forces.is_empty() {
            return Err(ConfigError::Invalid {
                message: "forces must not be empty".to_string(),
            });
        }
        if self.population_sheet_markers.is_empty() {
            return Err(ConfigError::Invalid {
                message: "population_sheet_markers must not be empty".to_string(),
            });
        }
        if self.report_file_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "report_file_name must not be empty".to_string(),
            });
        }
        Ok(())
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        for path in [
            &mut self.crimes_path,
            &mut self.population_path,
            &mut self.geo_path,
            &mut self.output_path,
            &mut self.report_dir,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_twenty_sheets() {
        let config = PipelineConfig::default();

        assert_eq!(config.crime_sheets().len(), 20);
        assert_eq!(config.ai.api_key_env, "OPENROUTER_API_KEY");
        assert_eq!(config.geo.code_property, "code_insee");
        assert!(config.report_path().ends_with("reports/ai_reports/latest_report.txt"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = PipelineConfig::parse(
            r#"
            years = [2020, 2021]
            forces = ["GN"]

            [geo]
            code_property = "code"

            [ai]
            max_tokens = 200
            "#,
        )
        .unwrap();

        let names: Vec<String> = config.crime_sheets().iter().map(CrimeSheet::sheet_name).collect();
        assert_eq!(names, vec!["Services GN 2020", "Services GN 2021"]);
        assert_eq!(config.geo.code_property, "code");
        assert_eq!(config.geo.name_properties, vec!["nom", "name"]);
        assert_eq!(config.ai.max_tokens, 200);
        assert_eq!(config.ai.model, "mistralai/mistral-7b-instruct");
        assert_eq!(config.population_sheet_markers, vec!["Estimation", "2023"]);
    }

    #[test]
    fn rejects_unknown_force() {
        let err = PipelineConfig::parse(r#"forces = ["XX"]"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_empty_years() {
        let err = PipelineConfig::parse("years = []").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { message } if message.contains("years")));
    }

    #[test]
    fn relative_paths_follow_the_file() {
        let dir = std::env::temp_dir().join(format!("safecity_config_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("safecity.toml");
        std::fs::write(
            &path,
            "crimes_path = \"raw/crimes.xlsx\"\noutput_path = \"/tmp/out.parquet\"\n",
        )
        .unwrap();

        let config = PipelineConfig::load(&path).unwrap();

        assert_eq!(config.crimes_path, dir.join("raw/crimes.xlsx"));
        assert_eq!(config.output_path, PathBuf::from("/tmp/out.parquet"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = PipelineConfig::load_or_default(Some(Path::new("/nonexistent/safecity.toml")))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(PipelineConfig::load_or_default(None).is_ok());
    }
}
