//! Population-Table normalizer.
//!
//! The population sheet opens with a narrative preamble (title, notes,
//! multi-row headers) whose height changes between releases. The
//! department table starts at the first non-empty row whose first cell is
//! an integer code; from there on the first column is the department
//! code, the second its name and the last the population total.

use std::collections::BTreeSet;

use safecity_geography_models::{DepartmentId, PopulationRecord};

use crate::parsing::{cell_label, cell_number, is_blank, is_integer_text};
use crate::{RawSheet, SourceError};

/// Normalizes a population sheet.
///
/// Rows after the start of the table whose population is not numeric
/// (footnotes, regional subtotals) are dropped, as are rows whose code is
/// not a metropolitan department. When a department appears twice the
/// first row wins.
///
/// # Errors
///
/// Returns [`SourceError::NoDepartmentData`] if no row starts the
/// department table.
pub fn normalize_population(sheet: &RawSheet) -> Result<Vec<PopulationRecord>, SourceError> {
    let rows: Vec<&Vec<_>> = sheet
        .rows
        .iter()
        .filter(|row| !row.iter().all(is_blank))
        .collect();

    let start = rows
        .iter()
        .position(|row| row.first().is_some_and(is_integer_text))
        .ok_or_else(|| SourceError::NoDepartmentData {
            sheet: sheet.name.clone(),
        })?;
    log::debug!(
        "Sheet '{}': department table starts at non-empty row {start}",
        sheet.name
    );

    let mut seen = BTreeSet::new();
    let mut records = Vec::new();

    for row in &rows[start..] {
        let Some(code) = row.first().and_then(cell_label) else {
            continue;
        };
        let Some(department_id) = DepartmentId::normalize(&code) else {
            log::debug!("Sheet '{}': skipping row with code '{code}'", sheet.name);
            continue;
        };
        let Some(population) = row.last().and_then(cell_number).filter(|p| *p >= 0.0) else {
            log::debug!(
                "Sheet '{}': dropping {department_id}, population is not numeric",
                sheet.name
            );
            continue;
        };
        if !seen.insert(department_id.clone()) {
            log::warn!(
                "Sheet '{}': duplicate row for department {department_id}, keeping the first",
                sheet.name
            );
            continue;
        }

        let name = row.get(1).and_then(cell_label).unwrap_or_default();
        records.push(PopulationRecord {
            department_id,
            name,
            population,
        });
    }

    log::info!(
        "Sheet '{}': {} department populations",
        sheet.name,
        records.len()
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::Data;

    fn s(text: &str) -> Data {
        Data::String(text.to_string())
    }

    fn n(value: f64) -> Data {
        Data::Float(value)
    }

    #[test]
    fn finds_table_after_preamble() {
        let raw = RawSheet::new(
            "Estimation 2023",
            vec![
                vec![s("Notes:"), Data::Empty, Data::Empty, Data::Empty],
                vec![Data::Empty, Data::Empty, Data::Empty, Data::Empty],
                vec![s("Départements"), s("Nom"), s("Hommes"), s("Total")],
                vec![s("01"), s("Ain"), s("320000"), s("650000")],
            ],
        );

        let records = normalize_population(&raw).unwrap();

        assert_eq!(
            records,
            vec![PopulationRecord {
                department_id: DepartmentId::normalize("01").unwrap(),
                name: "Ain".to_string(),
                population: 650_000.0,
            }]
        );
    }

    #[test]
    fn missing_table_is_fatal() {
        let raw = RawSheet::new(
            "Estimation 2023",
            vec![
                vec![s("Notes:"), s("")],
                vec![s("Départements"), s("Total")],
                vec![s("2A"), n(150_000.0)],
            ],
        );

        let err = normalize_population(&raw).unwrap_err();

        assert!(matches!(err, SourceError::NoDepartmentData { sheet } if sheet == "Estimation 2023"));
    }

    #[test]
    fn empty_sheet_is_fatal() {
        let raw = RawSheet::new("Estimation", vec![vec![Data::Empty], vec![s("  ")]]);
        assert!(normalize_population(&raw).is_err());
    }

    #[test]
    fn drops_non_numeric_population_rows() {
        let raw = RawSheet::new(
            "Estimation 2023",
            vec![
                vec![s("1"), s("Ain"), n(650_000.0)],
                vec![s("02"), s("Aisne"), s("nd")],
                vec![s("2A"), s("Corse-du-Sud"), n(160_000.0)],
                vec![s("2B"), s("Haute-Corse"), Data::Empty],
                vec![s("Source : Insee"), Data::Empty, Data::Empty],
                vec![s("France métropolitaine"), Data::Empty, n(65_000_000.0)],
            ],
        );

        let records = normalize_population(&raw).unwrap();
        let codes: Vec<&str> = records.iter().map(|r| r.department_id.as_str()).collect();

        assert_eq!(codes, vec!["01", "2A"]);
        assert!((records[1].population - 160_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn uses_last_column_for_population() {
        let raw = RawSheet::new(
            "Estimation 2023",
            vec![vec![
                s("75"),
                s("Paris"),
                n(1.0),
                n(2.0),
                n(3.0),
                n(2_100_000.0),
            ]],
        );

        let records = normalize_population(&raw).unwrap();

        assert_eq!(records.len(), 1);
        assert!((records[0].population - 2_100_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn keeps_first_duplicate_and_rejects_negative() {
        let raw = RawSheet::new(
            "Estimation 2023",
            vec![
                vec![s("13"), s("Bouches-du-Rhône"), n(2_000_000.0)],
                vec![s("13"), s("Bouches-du-Rhône (bis)"), n(1.0)],
                vec![s("14"), s("Calvados"), n(-5.0)],
            ],
        );

        let records = normalize_population(&raw).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Bouches-du-Rhône");
    }

    #[test]
    fn codes_are_two_characters() {
        let raw = RawSheet::new(
            "Estimation 2023",
            vec![
                vec![Data::Int(5), s("Hautes-Alpes"), n(140_000.0)],
                vec![n(6.0), s("Alpes-Maritimes"), n(1_100_000.0)],
                vec![s("971"), s("Guadeloupe"), n(380_000.0)],
            ],
        );

        let records = normalize_population(&raw).unwrap();
        let codes: Vec<&str> = records.iter().map(|r| r.department_id.as_str()).collect();

        assert_eq!(codes, vec!["05", "06"]);
    }
}
