use crate::error::HexAggError;
use crate::feature::GeoPoint;
use geo_types::{Coord, LineString, Polygon};
use h3o::{CellIndex, LatLng};
use std::fmt;
use std::str::FromStr;

/// Identifier of one H3 hexagon at a fixed resolution.
///
/// Rendered as its canonical lowercase hex string (e.g. `891f53c9a0bffff`),
/// which is also the row key of every exported table.
///
/// # Example
///
/// ```
/// use hexagg_rs::{CellId, HexGrid, GeoPoint};
///
/// # fn main() -> Result<(), hexagg_rs::HexAggError> {
/// let grid = HexGrid::new(9)?;
/// let cell = grid.cell_for(&GeoPoint::new(52.2297, 21.0122))?;
/// let restored: CellId = cell.to_string().parse()?;
/// assert_eq!(cell, restored);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(CellIndex);

impl CellId {
    pub fn index(&self) -> CellIndex {
        self.0
    }

    /// Resolution (0-15) of this cell.
    pub fn resolution(&self) -> u8 {
        u8::from(self.0.resolution())
    }

    /// Center of the cell in WGS84.
    pub fn center(&self) -> GeoPoint {
        let ll = LatLng::from(self.0);
        GeoPoint::new(ll.lat(), ll.lng())
    }

    /// The cell's edge ring in WGS84.
    pub fn boundary(&self) -> CellBoundary {
        let points = self
            .0
            .boundary()
            .iter()
            .map(|ll| GeoPoint::new(ll.lat(), ll.lng()))
            .collect();
        CellBoundary { points }
    }
}

impl From<CellIndex> for CellId {
    fn from(index: CellIndex) -> Self {
        Self(index)
    }
}

impl TryFrom<u64> for CellId {
    type Error = HexAggError;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        CellIndex::try_from(raw)
            .map(Self)
            .map_err(|e| HexAggError::InvalidCell(format!("{:#x}: {}", raw, e)))
    }
}

impl FromStr for CellId {
    type Err = HexAggError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<CellIndex>()
            .map(Self)
            .map_err(|e| HexAggError::InvalidCell(format!("'{}': {}", s, e)))
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered ring of WGS84 points describing one cell's edge (not closed).
#[derive(Debug, Clone, PartialEq)]
pub struct CellBoundary {
    points: Vec<GeoPoint>,
}

impl CellBoundary {
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Converts the boundary to a closed lon/lat polygon.
    pub fn to_polygon(&self) -> Polygon<f64> {
        let coords: Vec<Coord<f64>> = self.points.iter().map(|p| Coord::from(*p)).collect();
        Polygon::new(LineString::new(coords), vec![])
    }
}
