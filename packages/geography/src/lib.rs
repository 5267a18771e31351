#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Department boundary loading.
//!
//! Reads the department boundary `GeoJSON` and turns each feature into a
//! [`safecity_geography_models::GeoRecord`] whose department code is
//! normalized the same way as the crime and population sources, so the
//! three can be joined.

pub mod ingest;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading boundaries.
#[derive(Debug, Error)]
pub enum GeoError {
    /// The boundary file could not be read.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] Box<geojson::Error>),

    /// The `GeoJSON` is valid but not a collection of features.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

impl From<geojson::Error> for GeoError {
    fn from(value: geojson::Error) -> Self {
        Self::GeoJson(Box::new(value))
    }
}

/// Which feature properties carry the department code and name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct GeoOptions {
    /// Property holding the department code.
    pub code_property: String,
    /// Properties tried in order for the department name.
    pub name_properties: Vec<String>,
}

impl Default for GeoOptions {
    fn default() -> Self {
        Self {
            code_property: "code_insee".to_string(),
            name_properties: vec!["nom".to_string(), "name".to_string()],
        }
    }
}
