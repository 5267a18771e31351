#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Crime sheet naming conventions and per-department crime records.
//!
//! The national crime workbook holds one sheet per (force, year) pair,
//! e.g. `"Services PN 2015"` for the police and `"Services GN 2015"` for
//! the gendarmerie. This crate defines those sheet identities, the
//! aggregated [`CrimeRecord`], and the final [`UnifiedRecord`] row along
//! with the crime rate formula.

use geo::MultiPolygon;
use safecity_geography_models::DepartmentId;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// First year covered by the crime workbook.
pub const FIRST_YEAR: i32 = 2012;

/// Last year covered by the crime workbook.
pub const LAST_YEAR: i32 = 2021;

/// Crime rates are expressed per this many inhabitants.
pub const RATE_PER_INHABITANTS: f64 = 100_000.0;

/// The national force that recorded the offences in a sheet.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum ForceType {
    /// Police nationale (urban areas).
    #[serde(rename = "PN")]
    #[strum(serialize = "PN")]
    Police,
    /// Gendarmerie nationale (rural and peri-urban areas).
    #[serde(rename = "GN")]
    #[strum(serialize = "GN")]
    Gendarmerie,
}

impl ForceType {
    /// All forces, police first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Police, Self::Gendarmerie]
    }
}

/// Identity of one sheet in the crime workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeSheet {
    /// Recording force.
    pub force: ForceType,
    /// Year the offences were recorded.
    pub year: i32,
}

impl CrimeSheet {
    /// Returns the workbook sheet name, e.g. `"Services GN 2019"`.
    #[must_use]
    pub fn sheet_name(&self) -> String {
        format!("Services {} {}", self.force, self.year)
    }

    /// Parses a sheet name produced by [`Self::sheet_name`].
    ///
    /// The year is taken from the last whitespace-separated token.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let mut tokens = name.split_whitespace();
        if tokens.next()? != "Services" {
            return None;
        }
        let force = tokens.next()?.parse().ok()?;
        let year = name.split_whitespace().last()?.parse().ok()?;
        Some(Self { force, year })
    }

    /// Enumerates every sheet for the given forces and years: all years for
    /// the first force, then all years for the next.
    #[must_use]
    pub fn all(forces: &[ForceType], years: &[i32]) -> Vec<Self> {
        forces
            .iter()
            .flat_map(|&force| years.iter().map(move |&year| Self { force, year }))
            .collect()
    }
}

/// Every year from [`FIRST_YEAR`] to [`LAST_YEAR`] inclusive.
#[must_use]
pub fn default_years() -> Vec<i32> {
    (FIRST_YEAR..=LAST_YEAR).collect()
}

/// Offences recorded for one department in one year.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeRecord {
    /// Normalized department code.
    pub department_id: DepartmentId,
    /// Recording year.
    pub year: i32,
    /// Sum of all offence counts for the department in that year.
    pub crime_count: u64,
}

/// Offences per [`RATE_PER_INHABITANTS`] inhabitants.
///
/// Returns 0 when the population is not strictly positive, so the rate is
/// always defined and never negative.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn crime_rate(crime_count: u64, population: f64) -> f64 {
    if population > 0.0 {
        crime_count as f64 / population * RATE_PER_INHABITANTS
    } else {
        0.0
    }
}

/// One row of the merged output: a department in a given year.
#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedRecord {
    /// Normalized department code.
    pub department_id: DepartmentId,
    /// Display name.
    pub name: String,
    /// Year of the crime figures.
    pub year: i32,
    /// Reference population (same for every year of a department, 0 when
    /// unknown).
    pub population: f64,
    /// Offences recorded, 0 when no source row matched.
    pub crime_count: u64,
    /// Offences per 100,000 inhabitants.
    pub crime_rate: f64,
    /// Department boundary.
    pub boundary: MultiPolygon<f64>,
}

impl UnifiedRecord {
    /// Builds a row and derives its crime rate.
    #[must_use]
    pub fn new(
        department_id: DepartmentId,
        name: String,
        year: i32,
        population: f64,
        crime_count: u64,
        boundary: MultiPolygon<f64>,
    ) -> Self {
        Self {
            crime_rate: crime_rate(crime_count, population),
            department_id,
            name,
            year,
            population,
            crime_count,
            boundary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_names_follow_convention() {
        let pn = CrimeSheet {
            force: ForceType::Police,
            year: 2015,
        };
        let gn = CrimeSheet {
            force: ForceType::Gendarmerie,
            year: 2021,
        };
        assert_eq!(pn.sheet_name(), "Services PN 2015");
        assert_eq!(gn.sheet_name(), "Services GN 2021");
    }

    #[test]
    fn sheet_name_roundtrip() {
        for sheet in CrimeSheet::all(ForceType::all(), &default_years()) {
            assert_eq!(CrimeSheet::parse(&sheet.sheet_name()), Some(sheet));
        }
    }

    #[test]
    fn rejects_foreign_sheet_names() {
        assert_eq!(CrimeSheet::parse("Estimation 2023"), None);
        assert_eq!(CrimeSheet::parse("Services XX 2015"), None);
        assert_eq!(CrimeSheet::parse("Services PN"), None);
    }

    #[test]
    fn default_workbook_has_twenty_sheets() {
        let sheets = CrimeSheet::all(ForceType::all(), &default_years());
        assert_eq!(sheets.len(), 20);
        assert_eq!(sheets[0].sheet_name(), "Services PN 2012");
        assert_eq!(sheets[9].sheet_name(), "Services PN 2021");
        assert_eq!(sheets[10].sheet_name(), "Services GN 2012");
    }

    #[test]
    fn crime_rate_per_hundred_thousand() {
        let rate = crime_rate(650, 650_000.0);
        assert!((rate - 100.0).abs() < 1e-9);
    }

    #[test]
    fn crime_rate_zero_without_population() {
        assert!(crime_rate(1_000, 0.0).abs() < f64::EPSILON);
        assert!(crime_rate(0, 0.0).abs() < f64::EPSILON);
        assert!(crime_rate(12, -5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unified_record_derives_rate() {
        let record = UnifiedRecord::new(
            DepartmentId::normalize("1").unwrap(),
            "Ain".to_string(),
            2020,
            200_000.0,
            50,
            MultiPolygon(vec![]),
        );
        assert!((record.crime_rate - 25.0).abs() < 1e-9);
    }

    #[test]
    fn force_type_string_forms() {
        assert_eq!(ForceType::Police.to_string(), "PN");
        assert_eq!("GN".parse::<ForceType>().unwrap(), ForceType::Gendarmerie);
    }
}
