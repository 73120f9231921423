//! Loads the area-of-interest geometry from a GeoJSON file and renders it as
//! WKT for embedding in the catalog's spatial predicate. Coordinates are
//! expected in EPSG:4326 lon/lat order; geometry validity is not checked.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::AoiError;

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    geometry: Option<RawGeometry>,
}

#[derive(Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    coordinates: Value,
}

type Ring = Vec<Vec<f64>>;

/// Reads the AOI file and returns the WKT of the first feature's geometry.
/// The first feature is authoritative even if the file contains several.
pub fn load_aoi<P: AsRef<Path>>(path: P) -> Result<String, AoiError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| AoiError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let collection: FeatureCollection =
        serde_json::from_str(&content).map_err(|source| AoiError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let geometry = collection
        .features
        .into_iter()
        .next()
        .and_then(|feature| feature.geometry)
        .ok_or_else(|| AoiError::NoGeometry(path.to_path_buf()))?;

    let wkt = match geometry.kind.as_str() {
        "Polygon" => {
            let rings: Vec<Ring> =
                serde_json::from_value(geometry.coordinates).map_err(|source| AoiError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?;
            polygon_wkt(&rings)
        }
        "MultiPolygon" => {
            let polygons: Vec<Vec<Ring>> =
                serde_json::from_value(geometry.coordinates).map_err(|source| AoiError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?;
            multi_polygon_wkt(&polygons)
        }
        other => return Err(AoiError::UnsupportedGeometry(other.to_string())),
    };

    wkt.ok_or_else(|| AoiError::NoGeometry(path.to_path_buf()))
}

fn polygon_wkt(rings: &[Ring]) -> Option<String> {
    Some(format!("POLYGON {}", rings_text(rings)?))
}

fn multi_polygon_wkt(polygons: &[Vec<Ring>]) -> Option<String> {
    if polygons.is_empty() {
        return None;
    }
    let parts = polygons
        .iter()
        .map(|rings| rings_text(rings))
        .collect::<Option<Vec<_>>>()?;
    Some(format!("MULTIPOLYGON ({})", parts.join(", ")))
}

fn rings_text(rings: &[Ring]) -> Option<String> {
    if rings.is_empty() {
        return None;
    }
    let parts = rings
        .iter()
        .map(|ring| ring_text(ring))
        .collect::<Option<Vec<_>>>()?;
    Some(format!("({})", parts.join(", ")))
}

fn ring_text(ring: &[Vec<f64>]) -> Option<String> {
    if ring.is_empty() {
        return None;
    }
    let coords = ring
        .iter()
        .map(|position| position_text(position))
        .collect::<Option<Vec<_>>>()?;
    Some(format!("({})", coords.join(", ")))
}

fn position_text(position: &[f64]) -> Option<String> {
    // Any elevation component beyond lon/lat is dropped.
    let x = position.first()?;
    let y = position.get(1)?;
    Some(format!("{} {}", x, y))
}
