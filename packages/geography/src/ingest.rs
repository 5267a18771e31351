//! Department boundary ingestion from `GeoJSON`.
//!
//! Accepts a `FeatureCollection` (or a single `Feature`) in
//! longitude/latitude. Each feature needs a department code property and
//! a `Polygon` or `MultiPolygon` geometry; features missing either are
//! skipped with a warning rather than failing the whole file.

use std::collections::BTreeSet;
use std::path::Path;

use geo::MultiPolygon;
use geojson::{Feature, GeoJson};
use safecity_geography_models::{DepartmentId, GeoRecord};

use crate::{GeoError, GeoOptions};

/// Loads department boundaries from a `GeoJSON` file.
///
/// # Errors
///
/// Returns [`GeoError`] if the file cannot be read, is not valid
/// `GeoJSON`, or holds a bare geometry instead of features.
pub fn load_departments(path: &Path, options: &GeoOptions) -> Result<Vec<GeoRecord>, GeoError> {
    let contents = std::fs::read_to_string(path).map_err(|source| GeoError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let records = parse_departments(&contents, options)?;
    log::info!(
        "Loaded {} department boundaries from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Parses department boundaries from a `GeoJSON` string.
///
/// # Errors
///
/// Returns [`GeoError`] if the string is not valid `GeoJSON` or holds a
/// bare geometry.
pub fn parse_departments(geojson_str: &str, options: &GeoOptions) -> Result<Vec<GeoRecord>, GeoError> {
    let features = match geojson_str.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => {
            return Err(GeoError::Conversion {
                message: "expected a FeatureCollection, found a bare geometry".to_string(),
            });
        }
    };

    Ok(normalize_features(&features, options))
}

/// Normalizes features into boundary records.
///
/// Duplicate department codes keep the first feature.
#[must_use]
pub fn normalize_features(features: &[Feature], options: &GeoOptions) -> Vec<GeoRecord> {
    let mut seen = BTreeSet::new();

    features
        .iter()
        .enumerate()
        .filter_map(|(idx, feature)| {
            let record = normalize_feature(feature, options);
            if record.is_none() {
                log::warn!("Skipping boundary feature #{idx}: no usable code or geometry");
            }
            record
        })
        .filter(|record| {
            let first = seen.insert(record.department_id.clone());
            if !first {
                log::warn!(
                    "Duplicate boundary for department {}, keeping the first",
                    record.department_id
                );
            }
            first
        })
        .collect()
}

/// Normalizes a single feature.
fn normalize_feature(feature: &Feature, options: &GeoOptions) -> Option<GeoRecord> {
    let raw_code = feature
        .property(&options.code_property)
        .and_then(property_text)?;
    let department_id = DepartmentId::normalize(&raw_code)?;

    let name = options
        .name_properties
        .iter()
        .filter_map(|key| feature.property(key).and_then(property_text))
        .find(|name| !name.is_empty())
        .unwrap_or_default();

    let boundary = to_multipolygon(feature.geometry.clone()?)?;

    Some(GeoRecord {
        department_id,
        name,
        boundary,
    })
}

/// Renders a string or number property as text.
fn property_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn to_multipolygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}
