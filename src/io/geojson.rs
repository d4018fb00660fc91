use super::UNKNOWN_CATEGORY;
use crate::error::HexAggError;
use crate::feature::Feature;
use crate::geom::parse::convert_geojson;
use geojson::{GeoJson, JsonValue};
use std::path::Path;

/// Reads features from a GeoJSON document.
///
/// Each feature's category is the value of `category_property`; features
/// without it are tagged `"unknown"`. Features with a null geometry are
/// skipped. Multi-part geometries yield one feature per part.
///
/// # Example
///
/// ```
/// use hexagg_rs::features_from_geojson;
///
/// # fn main() -> Result<(), hexagg_rs::HexAggError> {
/// let doc = r#"{"type": "FeatureCollection", "features": [
///     {"type": "Feature", "properties": {"amenity": "cafe"},
///      "geometry": {"type": "Point", "coordinates": [21.0122, 52.2297]}}
/// ]}"#;
/// let features = features_from_geojson(doc, "amenity")?;
/// assert_eq!(features[0].category, "cafe");
/// # Ok(())
/// # }
/// ```
pub fn features_from_geojson(
    s: &str,
    category_property: &str,
) -> Result<Vec<Feature>, HexAggError> {
    features_from_geojson_with_fallback(s, &[category_property])
}

/// Like [`features_from_geojson`], but tries `category_properties` in order
/// and takes the first one holding a value.
///
/// Buildings tagged as amenities can thus be categorised by their amenity and
/// fall back to the building type:
///
/// ```
/// use hexagg_rs::features_from_geojson_with_fallback;
///
/// # fn main() -> Result<(), hexagg_rs::HexAggError> {
/// let doc = r#"{"type": "FeatureCollection", "features": [
///     {"type": "Feature", "properties": {"amenity": "school", "building": "yes"},
///      "geometry": {"type": "Point", "coordinates": [21.0122, 52.2297]}},
///     {"type": "Feature", "properties": {"building": "house"},
///      "geometry": {"type": "Point", "coordinates": [21.0130, 52.2299]}}
/// ]}"#;
/// let features = features_from_geojson_with_fallback(doc, &["amenity", "building"])?;
/// assert_eq!(features[0].category, "school");
/// assert_eq!(features[1].category, "house");
/// # Ok(())
/// # }
/// ```
pub fn features_from_geojson_with_fallback(
    s: &str,
    category_properties: &[&str],
) -> Result<Vec<Feature>, HexAggError> {
    let geojson: GeoJson = s
        .parse()
        .map_err(|e: geojson::Error| HexAggError::GeometryParseError(e.to_string()))?;

    let sources = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(geometry) => {
            return Feature::from_geometry(UNKNOWN_CATEGORY, convert_geojson(geometry)?);
        }
    };

    let mut features = Vec::with_capacity(sources.len());
    let mut skipped = 0;
    for source in sources {
        let category = category_of(&source, category_properties);
        match source.geometry {
            Some(geometry) => {
                features.extend(Feature::from_geometry(&category, convert_geojson(geometry)?)?)
            }
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        log::debug!("Ignored {} GeoJSON features without geometry", skipped);
    }
    Ok(features)
}

/// Reads a GeoJSON file with [`features_from_geojson`].
pub fn features_from_geojson_file(
    path: impl AsRef<Path>,
    category_property: &str,
) -> Result<Vec<Feature>, HexAggError> {
    features_from_geojson_file_with_fallback(path, &[category_property])
}

/// Reads a GeoJSON file with [`features_from_geojson_with_fallback`].
pub fn features_from_geojson_file_with_fallback(
    path: impl AsRef<Path>,
    category_properties: &[&str],
) -> Result<Vec<Feature>, HexAggError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| HexAggError::IoError(e.to_string()))?;
    features_from_geojson_with_fallback(&contents, category_properties)
}

fn category_of(feature: &geojson::Feature, properties: &[&str]) -> String {
    properties
        .iter()
        .find_map(|property| match feature.property(property) {
            Some(JsonValue::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(JsonValue::String(_)) | Some(JsonValue::Null) | None => None,
            Some(other) => Some(other.to_string()),
        })
        .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string())
}
