//! Dataset merger.
//!
//! Drives the crime and population normalizers over their workbooks and
//! joins the results onto the department boundaries. Boundaries anchor the
//! join: every department in the geographic input appears once per year,
//! whether or not crime or population data matched it.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use safecity_crime_models::{CrimeRecord, CrimeSheet, UnifiedRecord};
use safecity_geography_models::{DepartmentId, GeoRecord, PopulationRecord};
use safecity_source::progress::ProgressCallback;
use safecity_source::{SourceError, Workbook, crime, population};

/// Counters describing one merge run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Crime sheets that contributed at least one record.
    pub sheets_read: usize,
    /// Crime sheets present but without any department column.
    pub empty_sheets: usize,
    /// Crime sheets absent from the workbook.
    pub missing_sheets: usize,
    /// Departments in the output.
    pub departments: usize,
    /// Rows in the output.
    pub rows: usize,
    /// Departments that matched no population row.
    pub departments_without_population: usize,
    /// Departments that matched no crime record in any year.
    pub departments_without_crime: usize,
    /// Departments with crime records but no boundary, left out.
    pub departments_without_boundary: usize,
}

/// Crime records gathered from a workbook.
#[derive(Debug, Clone, Default)]
pub struct CrimeLoad {
    /// Records from every sheet, in sheet order.
    pub records: Vec<CrimeRecord>,
    /// Sheets that contributed at least one record.
    pub sheets_read: usize,
    /// Sheets without any department column.
    pub empty_sheets: usize,
    /// Sheets absent from the workbook.
    pub missing_sheets: usize,
}

/// Reads every requested crime sheet.
///
/// A missing or department-less sheet contributes nothing and is logged;
/// only an unreadable workbook or sheet is an error.
///
/// # Errors
///
/// Returns [`SourceError`] if the workbook cannot be opened or a sheet
/// cannot be decoded.
pub fn load_crimes(
    path: &Path,
    sheets: &[CrimeSheet],
    progress: &Arc<dyn ProgressCallback>,
) -> Result<CrimeLoad, SourceError> {
    let mut workbook = Workbook::open(path)?;
    let mut load = CrimeLoad::default();

    progress.set_total(sheets.len() as u64);

    for sheet in sheets {
        let name = sheet.sheet_name();
        progress.set_message(name.clone());

        match workbook.sheet(&name)? {
            None => {
                log::warn!("Sheet '{name}' not found in {}", path.display());
                load.missing_sheets += 1;
            }
            Some(raw) => {
                let records = crime::normalize_crime_sheet(&raw, sheet.year);
                if records.is_empty() {
                    log::warn!("Sheet '{name}' has no department columns, skipping");
                    load.empty_sheets += 1;
                } else {
                    log::debug!("Sheet '{name}': {} departments", records.len());
                    load.sheets_read += 1;
                    load.records.extend(records);
                }
            }
        }

        progress.inc(1);
    }

    progress.finish(format!(
        "{} crime sheets read, {} records",
        load.sheets_read,
        load.records.len()
    ));
    log::info!(
        "Crime data ready: {} records from {} sheets ({} empty, {} missing)",
        load.records.len(),
        load.sheets_read,
        load.empty_sheets,
        load.missing_sheets
    );

    Ok(load)
}

/// Reads and normalizes the population sheet.
///
/// # Errors
///
/// Returns [`SourceError`] if the workbook cannot be opened, no sheet
/// matches `markers`, or the sheet has no department table.
pub fn load_population(
    path: &Path,
    markers: &[String],
) -> Result<Vec<PopulationRecord>, SourceError> {
    let mut workbook = Workbook::open(path)?;
    let sheet = workbook.sheet_matching(markers)?;
    let records = population::normalize_population(&sheet)?;
    log::info!("Population data ready: {} departments", records.len());
    Ok(records)
}

/// Joins crime and population onto the boundaries.
///
/// The year axis is `years` plus every year present in `crimes`. Police
/// and gendarmerie counts for the same department and year are summed.
/// Population is not indexed by year, so each department carries the same
/// population in every row. Rows come out sorted by department then year.
#[must_use]
pub fn merge(
    crimes: &[CrimeRecord],
    population: &[PopulationRecord],
    geo: &[GeoRecord],
    years: &[i32],
) -> (Vec<UnifiedRecord>, MergeStats) {
    let mut crime_totals: BTreeMap<(&DepartmentId, i32), u64> = BTreeMap::new();
    for record in crimes {
        *crime_totals
            .entry((&record.department_id, record.year))
            .or_default() += record.crime_count;
    }

    let year_axis: BTreeSet<i32> = years
        .iter()
        .copied()
        .chain(crimes.iter().map(|r| r.year))
        .collect();

    let mut population_by_department: BTreeMap<&DepartmentId, &PopulationRecord> = BTreeMap::new();
    for record in population {
        population_by_department
            .entry(&record.department_id)
            .or_insert(record);
    }

    let mut anchors: BTreeMap<&DepartmentId, &GeoRecord> = BTreeMap::new();
    for record in geo {
        anchors.entry(&record.department_id).or_insert(record);
    }

    let anchored: BTreeSet<&DepartmentId> = anchors.keys().copied().collect();
    let mut stats = MergeStats {
        departments: anchors.len(),
        ..MergeStats::default()
    };
    let mut rows = Vec::with_capacity(anchors.len() * year_axis.len());

    for (department_id, boundary) in anchors {
        let population_row = population_by_department.get(department_id).copied();
        if population_row.is_none() {
            log::debug!("No population for department {department_id}");
            stats.departments_without_population += 1;
        }

        let name = display_name(department_id, boundary, population_row);
        let population = population_row.map_or(0.0, |p| p.population);
        let mut matched_crime = false;

        for &year in &year_axis {
            let crime_count = crime_totals.get(&(department_id, year)).copied();
            matched_crime |= crime_count.is_some();
            rows.push(UnifiedRecord::new(
                department_id.clone(),
                name.clone(),
                year,
                population,
                crime_count.unwrap_or(0),
                boundary.boundary.clone(),
            ));
        }

        if !matched_crime {
            log::debug!("No crime records for department {department_id}");
            stats.departments_without_crime += 1;
        }
    }

    let orphans: BTreeSet<&DepartmentId> = crime_totals
        .keys()
        .map(|(department_id, _)| *department_id)
        .filter(|department_id| !anchored.contains(department_id))
        .collect();
    for department_id in &orphans {
        log::warn!("Crime data for department {department_id} has no boundary and is dropped");
    }
    stats.departments_without_boundary = orphans.len();

    stats.rows = rows.len();
    log::info!(
        "Merged {} rows for {} departments over {} years",
        stats.rows,
        stats.departments,
        year_axis.len()
    );

    (rows, stats)
}

/// Boundary name, then population name, then the official name, then the
/// code itself.
fn display_name(
    department_id: &DepartmentId,
    boundary: &GeoRecord,
    population: Option<&PopulationRecord>,
) -> String {
    [
        Some(boundary.name.as_str()),
        population.map(|p| p.name.as_str()),
        department_id.official_name(),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .find(|name| !name.is_empty())
    .map_or_else(|| department_id.to_string(), ToString::to_string)
}
