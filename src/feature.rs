use crate::coord::Coordinate;
use crate::error::HexAggError;
use geo_types::{Coord, Geometry, LineString, Polygon};
use serde::{Deserialize, Serialize};

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// True when latitude is within [-90, 90] and longitude within [-180, 180].
    pub fn in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

impl Coordinate for GeoPoint {
    fn x(&self) -> f64 {
        self.lon
    }
    fn y(&self) -> f64 {
        self.lat
    }
}

impl From<GeoPoint> for Coord<f64> {
    fn from(p: GeoPoint) -> Self {
        Coord { x: p.lon, y: p.lat }
    }
}

impl From<Coord<f64>> for GeoPoint {
    fn from(c: Coord<f64>) -> Self {
        GeoPoint::new(c.y, c.x)
    }
}

/// The three geometry kinds the feature source produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureGeometry {
    Point(GeoPoint),
    /// At least two points.
    Line(Vec<GeoPoint>),
    /// Exterior ring; the closing vertex may be repeated or left implicit.
    Polygon(Vec<GeoPoint>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    Line,
    Polygon,
}

/// A categorised geographic feature, consumed read-only by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub category: String,
    pub geometry: FeatureGeometry,
}

impl Feature {
    pub fn point(category: impl Into<String>, point: GeoPoint) -> Self {
        Self {
            category: category.into(),
            geometry: FeatureGeometry::Point(point),
        }
    }

    pub fn line(category: impl Into<String>, points: Vec<GeoPoint>) -> Self {
        Self {
            category: category.into(),
            geometry: FeatureGeometry::Line(points),
        }
    }

    pub fn polygon(category: impl Into<String>, ring: Vec<GeoPoint>) -> Self {
        Self {
            category: category.into(),
            geometry: FeatureGeometry::Polygon(ring),
        }
    }

    pub fn kind(&self) -> GeometryKind {
        match self.geometry {
            FeatureGeometry::Point(_) => GeometryKind::Point,
            FeatureGeometry::Line(_) => GeometryKind::Line,
            FeatureGeometry::Polygon(_) => GeometryKind::Polygon,
        }
    }

    /// Create Features from an arbitrary lon/lat `geo_types::Geometry`.
    ///
    /// Multi-part geometries and collections are split into one feature per
    /// part, all sharing `category`. Polygon holes are dropped: only the
    /// exterior ring is attributed.
    pub fn from_geometry(
        category: &str,
        geom: Geometry<f64>,
    ) -> Result<Vec<Self>, HexAggError> {
        match geom {
            Geometry::Point(pt) => Ok(vec![Self::point(category, GeoPoint::from(pt.0))]),
            Geometry::Line(line) => Ok(vec![Self::line(
                category,
                vec![GeoPoint::from(line.start), GeoPoint::from(line.end)],
            )]),
            Geometry::LineString(ls) => Ok(vec![Self::line(category, line_points(&ls))]),
            Geometry::Polygon(poly) => Ok(vec![Self::polygon(category, ring_points(&poly))]),
            Geometry::MultiPoint(mp) => Ok(mp
                .0
                .into_iter()
                .map(|pt| Self::point(category, GeoPoint::from(pt.0)))
                .collect()),
            Geometry::MultiLineString(mls) => Ok(mls
                .0
                .iter()
                .map(|ls| Self::line(category, line_points(ls)))
                .collect()),
            Geometry::MultiPolygon(mp) => Ok(mp
                .0
                .iter()
                .map(|poly| Self::polygon(category, ring_points(poly)))
                .collect()),
            Geometry::Rect(rect) => Ok(vec![Self::polygon(
                category,
                ring_points(&rect.to_polygon()),
            )]),
            Geometry::Triangle(tri) => Ok(vec![Self::polygon(
                category,
                ring_points(&tri.to_polygon()),
            )]),
            Geometry::GeometryCollection(gc) => {
                let mut features = Vec::new();
                for g in gc.0 {
                    features.extend(Self::from_geometry(category, g)?);
                }
                Ok(features)
            }
        }
    }
}

fn line_points(ls: &LineString<f64>) -> Vec<GeoPoint> {
    ls.coords().map(|c| GeoPoint::from(*c)).collect()
}

fn ring_points(poly: &Polygon<f64>) -> Vec<GeoPoint> {
    line_points(poly.exterior())
}

/// Returns the ring without its closing vertex, if the ring repeats it.
pub fn open_ring(ring: &[GeoPoint]) -> &[GeoPoint] {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() > 1 && first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}
