#![allow(clippy::module_name_repetitions)]
//! Canonical file paths for the project data directories.
//!
//! Raw inputs live under `data/raw/`, the merged table under
//! `data/processed/` and AI reports under `reports/ai_reports/`, all
//! relative to the project root.

use std::path::{Path, PathBuf};

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`; falls back to the
/// crate directory if the workspace layout is not the expected one.
#[must_use]
pub fn project_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .nth(2)
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

/// Returns the `data/` directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    project_root().join("data")
}

/// Returns the `data/raw/` directory holding the source files.
#[must_use]
pub fn raw_dir() -> PathBuf {
    data_dir().join("raw")
}

/// Returns the `data/processed/` directory holding the merged table.
#[must_use]
pub fn processed_dir() -> PathBuf {
    data_dir().join("processed")
}

/// Returns the `reports/ai_reports/` directory.
#[must_use]
pub fn reports_dir() -> PathBuf {
    project_root().join("reports").join("ai_reports")
}

/// Default crime workbook path.
#[must_use]
pub fn crimes_path() -> PathBuf {
    raw_dir().join("crimes.xlsx")
}

/// Default population workbook path.
#[must_use]
pub fn population_path() -> PathBuf {
    raw_dir().join("population.xls")
}

/// Default department boundary path.
#[must_use]
pub fn geo_path() -> PathBuf {
    raw_dir().join("departments.geojson")
}

/// Default merged table path.
#[must_use]
pub fn output_path() -> PathBuf {
    processed_dir().join("safecity.parquet")
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Ensures the parent directory of `path` exists.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_live_under_project_root() {
        let root = project_root();
        assert!(crimes_path().starts_with(root.join("data/raw")));
        assert!(output_path().ends_with("data/processed/safecity.parquet"));
        assert!(reports_dir().ends_with("reports/ai_reports"));
    }

    #[test]
    fn ensure_parent_creates_nested_dirs() {
        let dir = std::env::temp_dir().join(format!("safecity_paths_{}", std::process::id()));
        let file = dir.join("a/b/out.txt");

        ensure_parent(&file).unwrap();
        assert!(dir.join("a/b").is_dir());

        ensure_parent(Path::new("relative.txt")).unwrap();
        let _ = std::fs::remove_dir_all(&dir);
    }
}
