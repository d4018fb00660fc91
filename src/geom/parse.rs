use crate::error::HexAggError;
use crate::feature::Feature;
use geo_types::{Geometry, GeometryCollection};
use geojson::GeoJson;
use std::str::FromStr;
use wkt::Wkt;

/// Parses a lon/lat geometry string, auto-detecting WKT or GeoJSON.
///
/// GeoJSON is detected by a leading `{`, everything else is tried as WKT.
pub fn parse_geometry(s: &str) -> Result<Geometry<f64>, HexAggError> {
    let trimmed = s.trim();
    if trimmed.starts_with('{') {
        parse_geojson(trimmed)
    } else {
        parse_wkt(trimmed)
    }
}

/// Parses a geometry string straight into features of one category.
pub fn parse_features(category: &str, s: &str) -> Result<Vec<Feature>, HexAggError> {
    Feature::from_geometry(category, parse_geometry(s)?)
}

/// Parses a GeoJSON string into a `geo_types::Geometry`.
///
/// A `FeatureCollection` becomes a `GeometryCollection` of its feature
/// geometries; features without geometry are ignored.
pub fn parse_geojson(s: &str) -> Result<Geometry<f64>, HexAggError> {
    let geojson: GeoJson = s
        .parse()
        .map_err(|e: geojson::Error| HexAggError::GeometryParseError(e.to_string()))?;

    match geojson {
        GeoJson::Geometry(geom) => convert_geojson(geom),
        GeoJson::Feature(feat) => feat
            .geometry
            .ok_or_else(|| HexAggError::GeometryParseError("Feature has no geometry".to_string()))
            .and_then(convert_geojson),
        GeoJson::FeatureCollection(fc) => {
            let geometries = fc
                .features
                .into_iter()
                .filter_map(|f| f.geometry)
                .map(convert_geojson)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Geometry::GeometryCollection(GeometryCollection::new_from(
                geometries,
            )))
        }
    }
}

pub(crate) fn convert_geojson(geom: geojson::Geometry) -> Result<Geometry<f64>, HexAggError> {
    Geometry::try_from(geom).map_err(|e| HexAggError::GeometryParseError(e.to_string()))
}

/// Parses a WKT string into a `geo_types::Geometry`.
pub fn parse_wkt(s: &str) -> Result<Geometry<f64>, HexAggError> {
    let wkt: Wkt<f64> =
        Wkt::from_str(s).map_err(|e| HexAggError::GeometryParseError(e.to_string()))?;

    wkt.try_into().map_err(|_| {
        HexAggError::GeometryParseError("Failed to convert WKT to geometry".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{FeatureGeometry, GeometryKind};

    #[test]
    fn test_parse_geojson_point() -> Result<(), HexAggError> {
        let json = r#"{"type":"Point","coordinates":[21.0122,52.2297]}"#;
        match parse_geometry(json)? {
            Geometry::Point(pt) => {
                assert!((pt.x() - 21.0122).abs() < 1e-9);
                assert!((pt.y() - 52.2297).abs() < 1e-9);
            }
            _ => panic!("Expected Point"),
        }
        Ok(())
    }

    #[test]
    fn test_parse_geojson_feature_collection() -> Result<(), HexAggError> {
        let json = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[21.0,52.2]}},
            {"type":"Feature","properties":{},"geometry":null},
            {"type":"Feature","properties":{},"geometry":{"type":"LineString","coordinates":[[21.0,52.2],[21.1,52.3]]}}
        ]}"#;
        match parse_geometry(json)? {
            Geometry::GeometryCollection(gc) => assert_eq!(gc.0.len(), 2),
            _ => panic!("Expected GeometryCollection"),
        }
        Ok(())
    }

    #[test]
    fn test_parse_wkt_polygon_features() -> Result<(), HexAggError> {
        let wkt = "POLYGON((21.0 52.2, 21.001 52.2, 21.001 52.201, 21.0 52.201, 21.0 52.2))";
        let features = parse_features("building", wkt)?;

        assert_eq!(features.len(), 1);
        assert_eq!(features[0].kind(), GeometryKind::Polygon);
        match &features[0].geometry {
            FeatureGeometry::Polygon(ring) => {
                assert_eq!(ring.len(), 5);
                assert!((ring[1].lon - 21.001).abs() < 1e-12);
                assert!((ring[1].lat - 52.2).abs() < 1e-12);
            }
            _ => panic!("Expected Polygon"),
        }
        Ok(())
    }

    #[test]
    fn test_parse_wkt_linestring() -> Result<(), HexAggError> {
        match parse_geometry("LINESTRING(21.0 52.2, 21.1 52.3)")? {
            Geometry::LineString(line) => assert_eq!(line.0.len(), 2),
            _ => panic!("Expected LineString"),
        }
        Ok(())
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_geometry("CIRCLE(1 2)"),
            Err(HexAggError::GeometryParseError(_))
        ));
        assert!(matches!(
            parse_geometry("{not json"),
            Err(HexAggError::GeometryParseError(_))
        ));
    }
}
