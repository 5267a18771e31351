//! Parquet output and text reports.
//!
//! The unified table is staged in an in-memory `DuckDB` database and
//! `COPY`'d to Parquet. Geometry is stored as well-known text next to an
//! explicit `geometry_encoding` column, so readers decode by tag instead
//! of inspecting values.

use std::path::Path;

use duckdb::Connection;
use geo::MultiPolygon;
use safecity_crime_models::UnifiedRecord;
use safecity_geography_models::DepartmentId;
use thiserror::Error;
use wkt::{ToWkt, TryFromWkt};

use crate::paths;

/// The only geometry encoding written.
pub const GEOMETRY_ENCODING_WKT: &str = "wkt";

/// Errors that can occur while writing or reading outputs.
#[derive(Debug, Error)]
pub enum PersistError {
    /// `DuckDB` operation failed.
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// Filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being written or read.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Geometry could not be encoded or decoded.
    #[error("Geometry error: {message}")]
    Geometry {
        /// Description of what went wrong.
        message: String,
    },

    /// A row carries a geometry encoding this reader does not know.
    #[error("Unsupported geometry encoding '{encoding}'")]
    UnsupportedEncoding {
        /// The tag found in the file.
        encoding: String,
    },

    /// A row could not be turned back into a record.
    #[error("Invalid record: {message}")]
    InvalidRecord {
        /// Description of what went wrong.
        message: String,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> PersistError + '_ {
    move |source| PersistError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Escapes a path for use inside a single-quoted SQL string.
fn sql_path(path: &Path) -> String {
    path.display().to_string().replace('\'', "''")
}

/// Encodes a boundary as WKT (`MULTIPOLYGON (...)`).
#[must_use]
pub fn encode_geometry(boundary: &MultiPolygon<f64>) -> String {
    boundary.wkt_string()
}

/// Decodes geometry text according to its encoding tag.
///
/// # Errors
///
/// Returns [`PersistError::UnsupportedEncoding`] for unknown tags and
/// [`PersistError::Geometry`] for text that is not a polygonal WKT
/// geometry.
pub fn decode_geometry(text: &str, encoding: &str) -> Result<MultiPolygon<f64>, PersistError> {
    if encoding != GEOMETRY_ENCODING_WKT {
        return Err(PersistError::UnsupportedEncoding {
            encoding: encoding.to_string(),
        });
    }

    let geometry = geo::Geometry::<f64>::try_from_wkt_str(text).map_err(|e| {
        PersistError::Geometry {
            message: e.to_string(),
        }
    })?;

    match geometry {
        geo::Geometry::MultiPolygon(mp) => Ok(mp),
        geo::Geometry::Polygon(p) => Ok(MultiPolygon(vec![p])),
        _ => Err(PersistError::Geometry {
            message: "expected POLYGON or MULTIPOLYGON".to_string(),
        }),
    }
}

/// Writes the unified table to a Parquet file, replacing any previous
/// file. Parent directories are created as needed.
///
/// Rows are written ordered by department and year.
///
/// # Errors
///
/// Returns [`PersistError`] if the directory cannot be created or `DuckDB`
/// fails to write the file.
pub fn write_parquet(records: &[UnifiedRecord], path: &Path) -> Result<(), PersistError> {
    paths::ensure_parent(path).map_err(io_error(path))?;

    let duck = Connection::open_in_memory()?;
    duck.execute_batch(
        "SET threads = 1;
         CREATE TABLE unified (
            code_insee VARCHAR NOT NULL,
            name VARCHAR NOT NULL,
            year INTEGER NOT NULL,
            population DOUBLE NOT NULL,
            crime_count UBIGINT NOT NULL,
            crime_rate DOUBLE NOT NULL,
            geometry VARCHAR NOT NULL,
            geometry_encoding VARCHAR NOT NULL
         );",
    )?;

    duck.execute_batch("BEGIN TRANSACTION")?;
    {
        let mut stmt = duck.prepare("INSERT INTO unified VALUES (?, ?, ?, ?, ?, ?, ?, ?)")?;
        for record in records {
            stmt.execute(duckdb::params![
                record.department_id.as_str(),
                record.name,
                record.year,
                record.population,
                record.crime_count,
                record.crime_rate,
                encode_geometry(&record.boundary),
                GEOMETRY_ENCODING_WKT,
            ])?;
        }
    }
    duck.execute_batch("COMMIT")?;

    duck.execute_batch(&format!(
        "COPY (SELECT * FROM unified ORDER BY code_insee, year) TO '{}' (FORMAT PARQUET)",
        sql_path(path)
    ))?;

    log::info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

/// Reads a Parquet file written by [`write_parquet`].
///
/// # Errors
///
/// Returns [`PersistError`] if the file cannot be read, a row carries an
/// unknown geometry encoding, or a department code is invalid.
pub fn read_unified(path: &Path) -> Result<Vec<UnifiedRecord>, PersistError> {
    if !path.exists() {
        return Err(PersistError::Io {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        });
    }

    let duck = Connection::open_in_memory()?;
    let mut stmt = duck.prepare(&format!(
        "SELECT code_insee, name, year, population, crime_count, crime_rate,
                geometry, geometry_encoding
         FROM read_parquet('{}')
         ORDER BY code_insee, year",
        sql_path(path)
    ))?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i32>(2)?,
            row.get::<_, f64>(3)?,
            row.get::<_, u64>(4)?,
            row.get::<_, f64>(5)?,
            row.get::<_, String>(6)?,
            row.get::<_, String>(7)?,
        ))
    })?;

    let mut records = Vec::new();
    for row in rows {
        let (code, name, year, population, crime_count, crime_rate, geometry, encoding) = row?;
        let department_id =
            DepartmentId::normalize(&code).ok_or_else(|| PersistError::InvalidRecord {
                message: format!("invalid department code '{code}'"),
            })?;

        records.push(UnifiedRecord {
            department_id,
            name,
            year,
            population,
            crime_count,
            crime_rate,
            boundary: decode_geometry(&geometry, &encoding)?,
        });
    }

    log::debug!("Read {} rows from {}", records.len(), path.display());
    Ok(records)
}

/// Writes a UTF-8 text report, replacing any previous file. Parent
/// directories are created as needed.
///
/// # Errors
///
/// Returns [`PersistError::Io`] if the file cannot be written.
pub fn write_report(text: &str, path: &Path) -> Result<(), PersistError> {
    paths::ensure_parent(path).map_err(io_error(path))?;
    std::fs::write(path, text).map_err(io_error(path))?;
    log::info!("Report saved to {}", path.display());
    Ok(())
}
