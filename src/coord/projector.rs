use crate::coord::Coordinate;
use crate::error::HexAggError;
use crate::feature::{GeoPoint, open_ring};
use geo_types::{Coord, LineString, Polygon};
use proj::Proj;

const GEOGRAPHIC_CRS: &str = "EPSG:4326";

/// The planar coordinate system used for every area and length measurement in a run.
///
/// A `Projector` only holds the configured CRS identifier. The underlying `proj`
/// handles are not shareable between threads, so each worker asks for its own
/// [`PlanarTransform`] via [`Projector::transform`].
///
/// # Example
///
/// ```no_run
/// use hexagg_rs::{GeoPoint, Projector};
///
/// # fn main() -> Result<(), hexagg_rs::HexAggError> {
/// let projector = Projector::new("EPSG:2180")?;
/// let planar = projector.to_planar(&[GeoPoint::new(52.2297, 21.0122)])?;
/// println!("{:?}", planar[0]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Projector {
    crs: String,
}

impl Projector {
    /// Creates a projector for the given CRS identifier (e.g. `"EPSG:2180"`).
    ///
    /// Fails with `ConfigError` for an empty identifier and with `ProjectionError`
    /// when `proj` cannot resolve it.
    pub fn new(crs: impl Into<String>) -> Result<Self, HexAggError> {
        let crs = crs.into();
        if crs.trim().is_empty() {
            return Err(HexAggError::ConfigError(
                "Projection must be an explicit CRS identifier".to_string(),
            ));
        }
        let projector = Self { crs };
        projector.transform()?;
        Ok(projector)
    }

    pub fn crs(&self) -> &str {
        &self.crs
    }

    /// Builds a fresh forward/inverse transform pair for this CRS.
    pub fn transform(&self) -> Result<PlanarTransform, HexAggError> {
        let forward = Proj::new_known_crs(GEOGRAPHIC_CRS, &self.crs, None)
            .map_err(|e| HexAggError::ProjectionError(e.to_string()))?;
        let inverse = Proj::new_known_crs(&self.crs, GEOGRAPHIC_CRS, None)
            .map_err(|e| HexAggError::ProjectionError(e.to_string()))?;
        Ok(PlanarTransform { forward, inverse })
    }

    pub fn to_planar(&self, points: &[GeoPoint]) -> Result<Vec<Coord<f64>>, HexAggError> {
        self.transform()?.to_planar(points)
    }

    pub fn to_geographic(&self, coords: &[Coord<f64>]) -> Result<Vec<GeoPoint>, HexAggError> {
        self.transform()?.to_geographic(coords)
    }
}

/// A live WGS84 <-> planar transform for one worker.
pub struct PlanarTransform {
    forward: Proj,
    inverse: Proj,
}

impl PlanarTransform {
    pub fn point_to_planar(&self, point: &impl Coordinate) -> Result<Coord<f64>, HexAggError> {
        let (x, y) = self
            .forward
            .convert((point.x(), point.y()))
            .map_err(|e| HexAggError::ProjectionError(e.to_string()))?;
        if !x.is_finite() || !y.is_finite() {
            return Err(HexAggError::ProjectionError(format!(
                "({}, {}) is outside the domain of the projected system",
                point.x(),
                point.y()
            )));
        }
        Ok(Coord { x, y })
    }

    pub fn to_planar(&self, points: &[GeoPoint]) -> Result<Vec<Coord<f64>>, HexAggError> {
        points.iter().map(|p| self.point_to_planar(p)).collect()
    }

    pub fn to_geographic(&self, coords: &[Coord<f64>]) -> Result<Vec<GeoPoint>, HexAggError> {
        coords
            .iter()
            .map(|c| {
                let (lon, lat) = self
                    .inverse
                    .convert((c.x, c.y))
                    .map_err(|e| HexAggError::ProjectionError(e.to_string()))?;
                Ok(GeoPoint::new(lat, lon))
            })
            .collect()
    }

    pub fn line_to_planar(&self, line: &[GeoPoint]) -> Result<LineString<f64>, HexAggError> {
        Ok(LineString::new(self.to_planar(line)?))
    }

    /// Projects a ring given as WGS84 points; the result is always closed.
    pub fn ring_to_planar(&self, ring: &[GeoPoint]) -> Result<Polygon<f64>, HexAggError> {
        let coords = self.to_planar(open_ring(ring))?;
        Ok(Polygon::new(LineString::new(coords), vec![]))
    }

    /// Projects a lon/lat polygon's exterior ring.
    pub fn polygon_to_planar(&self, polygon: &Polygon<f64>) -> Result<Polygon<f64>, HexAggError> {
        let coords = polygon
            .exterior()
            .coords()
            .map(|c| self.point_to_planar(c))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Polygon::new(LineString::new(coords), vec![]))
    }
}
