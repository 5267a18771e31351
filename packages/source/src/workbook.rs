//! Workbook access on top of `calamine`.
//!
//! Normalizers never touch `calamine` readers directly: they consume a
//! [`RawSheet`], a plain grid of cells, which keeps them testable without
//! spreadsheet files.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};

use crate::SourceError;

/// One worksheet as a grid of cells.
///
/// Rows are stored top to bottom starting at the first non-empty row.
/// Leading empty columns are preserved so that column positions match the
/// sheet as authored.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    /// Worksheet name.
    pub name: String,
    /// Cell rows.
    pub rows: Vec<Vec<Data>>,
}

impl RawSheet {
    /// Creates a sheet from already materialized rows.
    #[must_use]
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Data>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Copies a `calamine` range into a grid.
    #[must_use]
    pub fn from_range(name: impl Into<String>, range: &Range<Data>) -> Self {
        let leading_cols = range.start().map_or(0, |(_, col)| col as usize);
        let rows = range
            .rows()
            .map(|row| {
                let mut cells = vec![Data::Empty; leading_cols];
                cells.extend_from_slice(row);
                cells
            })
            .collect();

        Self::new(name, rows)
    }
}

/// An open spreadsheet file (`.xlsx`, `.xls`, `.ods`).
pub struct Workbook {
    path: PathBuf,
    sheets: Sheets<BufReader<File>>,
}

impl Workbook {
    /// Opens a workbook, detecting the format from its extension.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Open`] if the file is missing or unreadable.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let sheets = open_workbook_auto(path).map_err(|source| SourceError::Open {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("Opened workbook {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            sheets,
        })
    }

    /// Sheet names in workbook order.
    #[must_use]
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    /// Reads a sheet by exact name. Returns `Ok(None)` if the workbook has
    /// no sheet with that name.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Sheet`] if the sheet exists but cannot be
    /// decoded.
    pub fn sheet(&mut self, name: &str) -> Result<Option<RawSheet>, SourceError> {
        if !self.sheet_names().iter().any(|n| n == name) {
            return Ok(None);
        }

        let range = self
            .sheets
            .worksheet_range(name)
            .map_err(|source| SourceError::Sheet {
                sheet: name.to_string(),
                source,
            })?;

        Ok(Some(RawSheet::from_range(name, &range)))
    }

    /// Reads the first sheet whose name contains any of `markers`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::SheetNotFound`] if no sheet name matches, or
    /// [`SourceError::Sheet`] if the matching sheet cannot be decoded.
    pub fn sheet_matching(&mut self, markers: &[String]) -> Result<RawSheet, SourceError> {
        let names = self.sheet_names();
        let Some(name) = select_sheet_name(&names, markers) else {
            return Err(SourceError::SheetNotFound {
                path: self.path.display().to_string(),
                markers: markers.join(", "),
            });
        };

        log::info!("Using sheet '{name}' from {}", self.path.display());
        let name = name.to_string();
        self.sheet(&name)?.ok_or(SourceError::SheetNotFound {
            path: self.path.display().to_string(),
            markers: markers.join(", "),
        })
    }
}

/// Picks the first name (in workbook order) that contains any marker.
#[must_use]
pub fn select_sheet_name<'a>(names: &'a [String], markers: &[String]) -> Option<&'a str> {
    names
        .iter()
        .find(|name| markers.iter().any(|m| name.contains(m.as_str())))
        .map(String::as_str)
}
