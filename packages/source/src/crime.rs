//! Crime-Table normalizer.
//!
//! A crime sheet is laid out as:
//!
//! | row | content |
//! |-----|---------|
//! | 0 | column labels: two label columns, then one column per police or gendarmerie unit, labelled with its department code (`"75"`, sometimes `"75.1"` for a second unit) |
//! | 1-2 | unit descriptions (discarded) |
//! | 3.. | one row per offence index, counts per unit |
//!
//! Every unit column is summed top to bottom and the sums are grouped by
//! department.

use std::collections::BTreeMap;

use safecity_crime_models::CrimeRecord;
use safecity_geography_models::{CORSICA_CODES, DepartmentId};

use crate::RawSheet;
use crate::parsing::{cell_label, cell_number};

/// Leading label columns (offence index code and label).
pub const LABEL_COLUMNS: usize = 2;

/// Header rows between the label row and the first observation row.
pub const DISCARDED_HEADER_ROWS: usize = 2;

/// Separates a department code from a unit disambiguation suffix.
pub const COLUMN_SUFFIX_SEPARATOR: char = '.';

/// Extracts the department from a unit column label.
///
/// Only the part before [`COLUMN_SUFFIX_SEPARATOR`] counts, and it must be
/// either all digits or one of the Corsican codes.
#[must_use]
pub fn department_from_label(label: &str) -> Option<DepartmentId> {
    let prefix = label.split(COLUMN_SUFFIX_SEPARATOR).next()?.trim();
    let accepted = (!prefix.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit()))
        || CORSICA_CODES.contains(&prefix);
    if !accepted {
        return None;
    }
    DepartmentId::normalize(prefix)
}

/// Normalizes one crime sheet into per-department records for `year`.
///
/// Returns an empty list when no column carries a department label; the
/// caller decides whether that matters.
#[must_use]
pub fn normalize_crime_sheet(sheet: &RawSheet, year: i32) -> Vec<CrimeRecord> {
    let Some(labels) = sheet.rows.first() else {
        log::debug!("Sheet '{}' is empty", sheet.name);
        return Vec::new();
    };
    let observations = sheet.rows.iter().skip(1 + DISCARDED_HEADER_ROWS);

    let columns: Vec<(usize, DepartmentId)> = labels
        .iter()
        .enumerate()
        .skip(LABEL_COLUMNS)
        .filter_map(|(idx, cell)| {
            let label = cell_label(cell)?;
            let department = department_from_label(&label);
            if department.is_none() {
                log::debug!("Sheet '{}': ignoring column '{label}'", sheet.name);
            }
            department.map(|d| (idx, d))
        })
        .collect();

    if columns.is_empty() {
        return Vec::new();
    }

    let mut column_sums = vec![0.0_f64; columns.len()];
    for row in observations {
        for (sum, (idx, _)) in column_sums.iter_mut().zip(&columns) {
            *sum += row.get(*idx).and_then(cell_number).unwrap_or(0.0);
        }
    }

    let mut by_department: BTreeMap<DepartmentId, u64> = BTreeMap::new();
    for (sum, (_, department)) in column_sums.into_iter().zip(columns) {
        *by_department.entry(department).or_default() += count_from_sum(sum);
    }

    by_department
        .into_iter()
        .map(|(department_id, crime_count)| CrimeRecord {
            department_id,
            year,
            crime_count,
        })
        .collect()
}

/// Truncates a column sum to a non-negative count.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count_from_sum(sum: f64) -> u64 {
    if sum > 0.0 { sum.trunc() as u64 } else { 0 }
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

    /// Builds a sheet with the given labels, two filler header rows and
    /// the observation rows.
    fn sheet(labels: Vec<Data>, observations: Vec<Vec<Data>>) -> RawSheet {
        let width = labels.len();
        let mut rows = vec![labels, vec![s("Périmètre"); width], vec![s("Service"); width]];
        rows.extend(observations);
        RawSheet::new("Services PN 2015", rows)
    }

    fn count_for(records: &[CrimeRecord], code: &str) -> Option<u64> {
        records
            .iter()
            .find(|r| r.department_id.as_str() == code)
            .map(|r| r.crime_count)
    }

    #[test]
    fn sums_subdivision_columns_per_department() {
        let raw = sheet(
            vec![s("x"), s("y"), s("75"), s("75.1"), s("2A")],
            vec![
                vec![n(0.0), n(0.0), n(10.0), n(5.0), n(3.0)],
                vec![n(0.0), n(0.0), n(1.0), n(1.0), n(1.0)],
            ],
        );

        let records = normalize_crime_sheet(&raw, 2015);

        assert_eq!(records.len(), 2);
        assert_eq!(count_for(&records, "75"), Some(17));
        assert_eq!(count_for(&records, "2A"), Some(4));
        assert!(records.iter().all(|r| r.year == 2015));
    }

    #[test]
    fn discards_the_two_header_rows() {
        let raw = RawSheet::new(
            "Services GN 2012",
            vec![
                vec![s("code"), s("libellé"), s("01")],
                vec![s(""), s(""), n(1_000.0)],
                vec![s(""), s(""), n(1_000.0)],
                vec![s("1"), s("Vols"), n(7.0)],
            ],
        );

        let records = normalize_crime_sheet(&raw, 2012);

        assert_eq!(count_for(&records, "01"), Some(7));
    }

    #[test]
    fn pads_numeric_labels() {
        let raw = sheet(
            vec![s("x"), s("y"), s("1"), n(9.0), Data::Int(3)],
            vec![vec![n(0.0), n(0.0), n(2.0), n(4.0), n(8.0)]],
        );

        let records = normalize_crime_sheet(&raw, 2020);

        assert_eq!(count_for(&records, "01"), Some(2));
        assert_eq!(count_for(&records, "09"), Some(4));
        assert_eq!(count_for(&records, "03"), Some(8));
        assert!(records.iter().all(|r| r.department_id.as_str().len() == 2));
    }

    #[test]
    fn label_columns_are_never_departments() {
        let raw = sheet(
            vec![s("01"), s("02"), s("03")],
            vec![vec![n(100.0), n(100.0), n(1.0)]],
        );

        let records = normalize_crime_sheet(&raw, 2013);

        assert_eq!(records.len(), 1);
        assert_eq!(count_for(&records, "03"), Some(1));
    }

    #[test]
    fn ignores_non_department_columns() {
        let raw = sheet(
            vec![s("x"), s("y"), s("Total"), s("971"), s("2C"), s("13")],
            vec![vec![n(0.0), n(0.0), n(50.0), n(6.0), n(6.0), n(5.0)]],
        );

        let records = normalize_crime_sheet(&raw, 2014);

        assert_eq!(records.len(), 1);
        assert_eq!(count_for(&records, "13"), Some(5));
    }

    #[test]
    fn no_department_columns_yields_empty() {
        let raw = sheet(
            vec![s("x"), s("y"), s("Total")],
            vec![vec![n(0.0), n(0.0), n(50.0)]],
        );

        assert!(normalize_crime_sheet(&raw, 2016).is_empty());
        assert!(normalize_crime_sheet(&RawSheet::new("empty", vec![]), 2016).is_empty());
    }

    #[test]
    fn non_numeric_cells_count_as_zero() {
        let raw = sheet(
            vec![s("x"), s("y"), s("33")],
            vec![
                vec![n(0.0), n(0.0), s("12")],
                vec![n(0.0), n(0.0), s("n/a")],
                vec![n(0.0), n(0.0), Data::Empty],
                vec![n(0.0), n(0.0)],
            ],
        );

        let records = normalize_crime_sheet(&raw, 2017);

        assert_eq!(count_for(&records, "33"), Some(12));
    }

    #[test]
    fn total_equals_sum_of_accepted_cells() {
        let labels = vec![s("x"), s("y"), s("59"), s("59.1"), s("59.2"), s("62"), s("2B")];
        let observations: Vec<Vec<Data>> = (0..25_u32)
            .map(|i| {
                let mut row = vec![n(0.0), n(0.0)];
                row.extend((0..5_u32).map(|c| n(f64::from((i * 7 + c * 3) % 11))));
                row
            })
            .collect();
        let expected: f64 = observations
            .iter()
            .flat_map(|row| row.iter().skip(LABEL_COLUMNS))
            .filter_map(cell_number)
            .sum();

        let records = normalize_crime_sheet(&sheet(labels, observations), 2018);
        let total: u64 = records.iter().map(|r| r.crime_count).sum();

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let expected = expected as u64;
        assert_eq!(total, expected);
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn department_label_prefixes() {
        assert_eq!(
            department_from_label("75.1").map(String::from).as_deref(),
            Some("75")
        );
        assert_eq!(
            department_from_label("2A.3").map(String::from).as_deref(),
            Some("2A")
        );
        assert_eq!(department_from_label("2a"), None);
        assert_eq!(department_from_label("Code index"), None);
        assert_eq!(department_from_label(".1"), None);
    }
}
