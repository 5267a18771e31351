#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spreadsheet sources and their normalizers.
//!
//! The crime workbook and the population workbook are both authored for
//! humans: merged header rows, narrative preambles, regional subdivision
//! columns. The normalizers in [`crime`] and [`population`] locate the
//! data by predicate rather than by fixed offsets where the layout drifts,
//! and turn each sheet into per-department records.

pub mod crime;
pub mod parsing;
pub mod population;
pub mod progress;
pub mod workbook;

pub use workbook::{RawSheet, Workbook};

/// Errors that can occur while reading source spreadsheets.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The workbook file could not be opened.
    #[error("Failed to open workbook {path}: {source}")]
    Open {
        /// Workbook path.
        path: String,
        /// Underlying reader error.
        #[source]
        source: calamine::Error,
    },

    /// A sheet exists but could not be decoded.
    #[error("Failed to read sheet '{sheet}': {source}")]
    Sheet {
        /// Sheet name.
        sheet: String,
        /// Underlying reader error.
        #[source]
        source: calamine::Error,
    },

    /// No sheet name contains any of the expected markers.
    #[error("No sheet in {path} matches any of [{markers}]")]
    SheetNotFound {
        /// Workbook path.
        path: String,
        /// Comma-separated markers that were searched for.
        markers: String,
    },

    /// The population sheet has no row that starts the department table.
    /// The source layout has changed; parsing must not guess.
    #[error("No department data found in sheet '{sheet}'")]
    NoDepartmentData {
        /// Sheet name.
        sheet: String,
    },
}
