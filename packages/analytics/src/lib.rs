#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dashboard queries over the unified department/year table.
//!
//! Each public function answers one question the presentation layer asks
//! of the merged dataset: which rows match the current filter, which
//! departments rank highest, how totals move year over year, and the
//! headline metrics. They are pure functions over in-memory records.

pub mod queries;

pub use queries::{
    available_years, data_summary, filter_records, headline, top_departments, yearly_series,
};
