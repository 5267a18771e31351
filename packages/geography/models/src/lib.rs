#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! French department identifiers and per-department record types.
//!
//! Every source dataset spells department codes differently (bare
//! integers, float-typed spreadsheet cells, `"75.1"` column labels).
//! [`DepartmentId`] is the single normalized form all joins use.

pub mod departments;

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

/// A two-character metropolitan department code: `"01"`..`"95"` without
/// `"20"`, plus `"2A"` and `"2B"`.
///
/// Can only be built through [`DepartmentId::normalize`], so a value of
/// this type is always join-ready.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DepartmentId(String);

/// The two Corsican codes that are not numeric.
pub const CORSICA_CODES: [&str; 2] = ["2A", "2B"];

impl DepartmentId {
    /// Normalizes a raw code into a [`DepartmentId`].
    ///
    /// Accepts digit strings (zero-padded to two characters, so `"1"` and
    /// `"01"` are equal), float renderings of whole numbers (`"1.0"`) and
    /// the Corsican codes in any case. The result must be one of
    /// [`departments::DEPARTMENT_CODES`]; anything else is `None`,
    /// including the retired Corsican `"20"` and overseas codes such as
    /// `"971"`.
    #[must_use]
    pub fn normalize(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_suffix(".0").unwrap_or(trimmed);
        if trimmed.is_empty() {
            return None;
        }

        let code = if trimmed.bytes().all(|b| b.is_ascii_digit()) {
            let value: u32 = trimmed.parse().ok()?;
            format!("{value:02}")
        } else {
            trimmed.to_ascii_uppercase()
        };

        departments::DEPARTMENT_CODES
            .contains(&code.as_str())
            .then_some(Self(code))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the official department name, if the code is in the
    /// metropolitan table.
    #[must_use]
    pub fn official_name(&self) -> Option<&'static str> {
        departments::department_name(&self.0)
    }
}

impl std::fmt::Display for DepartmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DepartmentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Error returned when a string is not a valid department code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDepartmentError {
    /// The rejected input.
    pub value: String,
}

impl std::fmt::Display for InvalidDepartmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid department code {:?}", self.value)
    }
}

impl std::error::Error for InvalidDepartmentError {}

impl TryFrom<String> for DepartmentId {
    type Error = InvalidDepartmentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::normalize(&value).ok_or(InvalidDepartmentError { value })
    }
}

impl std::str::FromStr for DepartmentId {
    type Err = InvalidDepartmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s).ok_or_else(|| InvalidDepartmentError {
            value: s.to_string(),
        })
    }
}

impl From<DepartmentId> for String {
    fn from(id: DepartmentId) -> Self {
        id.0
    }
}

/// One department's reference population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationRecord {
    /// Normalized department code.
    pub department_id: DepartmentId,
    /// Department name as spelled by the population source.
    pub name: String,
    /// Population estimate. Never negative.
    pub population: f64,
}

/// One department's boundary, in longitude/latitude.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoRecord {
    /// Normalized department code.
    pub department_id: DepartmentId,
    /// Department name from the boundary file (may be empty).
    pub name: String,
    /// Boundary polygons. Single polygons are wrapped.
    pub boundary: MultiPolygon<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> Option<String> {
        DepartmentId::normalize(raw).map(String::from)
    }

    #[test]
    fn pads_single_digit_codes() {
        assert_eq!(id("1").as_deref(), Some("01"));
        assert_eq!(id("01").as_deref(), Some("01"));
        assert_eq!(id(" 9 ").as_deref(), Some("09"));
    }

    #[test]
    fn accepts_float_rendered_codes() {
        assert_eq!(id("1.0").as_deref(), Some("01"));
        assert_eq!(id("75.0").as_deref(), Some("75"));
    }

    #[test]
    fn corsica_codes_pass_through() {
        assert_eq!(id("2A").as_deref(), Some("2A"));
        assert_eq!(id("2b").as_deref(), Some("2B"));
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        assert_eq!(id("0"), None);
        assert_eq!(id("96"), None);
        assert_eq!(id("971"), None);
        assert_eq!(id("2C"), None);
        assert_eq!(id(""), None);
        assert_eq!(id("Total"), None);
        assert_eq!(id("75.1"), None);
    }

    #[test]
    fn retired_corsica_code_is_rejected() {
        assert_eq!(id("20"), None);
        assert_eq!(id("20.0"), None);
        assert_eq!(id("2A").as_deref(), Some("2A"));
    }

    #[test]
    fn every_normalized_code_is_two_chars() {
        for n in (1..=95).filter(|n| *n != 20) {
            let normalized = DepartmentId::normalize(&n.to_string()).unwrap();
            assert_eq!(normalized.as_str().len(), 2);
        }
    }

    #[test]
    fn serde_validates_on_deserialize() {
        let ok: DepartmentId = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(ok.as_str(), "07");
        assert!(serde_json::from_str::<DepartmentId>("\"99\"").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "\"07\"");
    }

    #[test]
    fn every_normalized_code_has_an_official_name() {
        for code in departments::DEPARTMENT_CODES {
            let id = DepartmentId::normalize(code).unwrap();
            assert!(id.official_name().is_some(), "no name for {code}");
        }
        let paris = DepartmentId::normalize("75").unwrap();
        assert_eq!(paris.official_name(), Some("Paris"));
    }
}
