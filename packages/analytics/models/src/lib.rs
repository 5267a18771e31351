#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Parameter and result types for the dashboard queries.
//!
//! These are the shapes the presentation layer consumes: filters chosen by
//! the user, department rankings, per-year totals and headline metrics.

use safecity_geography_models::DepartmentId;
use serde::{Deserialize, Serialize};

/// Restricts which rows of the unified table a query looks at.
///
/// `None` means "all years" / "all departments".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    /// Only rows for this year.
    pub year: Option<i32>,
    /// Only rows for this department.
    pub department: Option<DepartmentId>,
}

impl Filter {
    /// Filter on a single year.
    #[must_use]
    pub const fn for_year(year: i32) -> Self {
        Self {
            year: Some(year),
            department: None,
        }
    }

    /// Whether no restriction is active.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.year.is_none() && self.department.is_none()
    }

    /// Human-readable description of the active restriction.
    #[must_use]
    pub fn describe(&self) -> String {
        match (self.year, &self.department) {
            (Some(year), Some(department)) => format!("department {department}, {year}"),
            (Some(year), None) => format!("all departments, {year}"),
            (None, Some(department)) => format!("department {department}, all years"),
            (None, None) => "all departments, all years".to_string(),
        }
    }
}

/// A department's position in a ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentRanking {
    /// Department code.
    pub department_id: DepartmentId,
    /// Display name.
    pub name: String,
    /// Mean crime rate over the rows considered.
    pub mean_crime_rate: f64,
}

/// Totals for one year across every department considered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyTotal {
    /// Year.
    pub year: i32,
    /// Sum of crime counts.
    pub crime_count: u64,
    /// Sum of populations.
    pub population: f64,
    /// Rate recomputed from the two totals.
    pub crime_rate: f64,
}

/// Key figures shown above the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Headline {
    /// Total crimes in the filtered rows.
    pub total_crimes: u64,
    /// Mean crime rate of the filtered rows.
    pub mean_crime_rate: f64,
    /// Change of the filtered mean rate against the whole-table mean, in
    /// percent.
    pub evolution_percent: f64,
}
