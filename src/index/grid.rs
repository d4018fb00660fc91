use crate::cell::{CellBoundary, CellId};
use crate::coord::Coordinate;
use crate::error::HexAggError;
use crate::feature::{GeoPoint, open_ring};
use geo::{Contains, Intersects};
use geo_types::{Coord, LineString, Point, Polygon};
use h3o::{LatLng, Resolution};
use std::collections::{HashSet, VecDeque};

/// The H3 hexagonal grid at one configured resolution.
///
/// # Example
///
/// ```
/// use hexagg_rs::{GeoPoint, HexGrid};
///
/// # fn main() -> Result<(), hexagg_rs::HexAggError> {
/// let grid = HexGrid::new(9)?;
/// let cell = grid.cell_for(&GeoPoint::new(52.2297, 21.0122))?;
/// let neighbours = grid.neighbors(&cell, 1)?;
/// assert_eq!(neighbours.len(), 6);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexGrid {
    resolution: Resolution,
}

impl HexGrid {
    pub fn new(resolution: u8) -> Result<Self, HexAggError> {
        let resolution = Resolution::try_from(resolution)
            .map_err(|_| HexAggError::InvalidResolution(resolution))?;
        Ok(Self { resolution })
    }

    pub fn resolution(&self) -> u8 {
        u8::from(self.resolution)
    }

    /// Returns the cell containing a WGS84 point (x = longitude, y = latitude).
    ///
    /// Latitudes outside [-90, 90] and longitudes outside [-180, 180] are
    /// rejected as `InvalidGeometry` rather than wrapped.
    pub fn cell_for(&self, point: &impl Coordinate) -> Result<CellId, HexAggError> {
        if !(-90.0..=90.0).contains(&point.y()) || !(-180.0..=180.0).contains(&point.x()) {
            return Err(HexAggError::InvalidGeometry(format!(
                "({}, {}) is outside the WGS84 range",
                point.y(),
                point.x()
            )));
        }
        let ll = LatLng::new(point.y(), point.x()).map_err(|e| {
            HexAggError::InvalidGeometry(format!(
                "({}, {}) is not a valid position: {}",
                point.y(),
                point.x(),
                e
            ))
        })?;
        Ok(CellId::from(ll.to_cell(self.resolution)))
    }

    /// Returns the cell's boundary ring, rejecting cells of another resolution.
    pub fn boundary_of(&self, cell: &CellId) -> Result<CellBoundary, HexAggError> {
        self.check_resolution(cell)?;
        Ok(cell.boundary())
    }

    /// Cells whose center lies inside the ring, plus the cell of every ring vertex.
    ///
    /// Interior-only coverage misses cells that straddle the boundary, so the
    /// vertex cells are always unioned in. The closing vertex may be repeated.
    pub fn cells_covering(&self, ring: &[GeoPoint]) -> Result<HashSet<CellId>, HexAggError> {
        let ring = open_ring(ring);
        if ring.len() < 3 {
            return Err(HexAggError::InvalidGeometry(format!(
                "Polygon ring has {} points, at least 3 are required",
                ring.len()
            )));
        }

        let mut cells = HashSet::with_capacity(ring.len());
        for point in ring {
            cells.insert(self.cell_for(point)?);
        }
        cells.extend(self.cells_with_center_in(ring)?);
        Ok(cells)
    }

    /// Cells within `ring_distance` grid steps of `cell`, excluding `cell` itself.
    pub fn neighbors(
        &self,
        cell: &CellId,
        ring_distance: u32,
    ) -> Result<HashSet<CellId>, HexAggError> {
        self.check_resolution(cell)?;
        Ok(cell
            .index()
            .grid_disk::<Vec<_>>(ring_distance)
            .into_iter()
            .map(CellId::from)
            .filter(|n| n != cell)
            .collect())
    }

    fn check_resolution(&self, cell: &CellId) -> Result<(), HexAggError> {
        if cell.resolution() != self.resolution() {
            return Err(HexAggError::InvalidCell(format!(
                "{} has resolution {}, grid uses {}",
                cell,
                cell.resolution(),
                self.resolution()
            )));
        }
        Ok(())
    }

    // Flood fill over cells whose hexagon touches the polygon, starting from the
    // first vertex's cell. That set is connected, so every cell with its center
    // inside is reached.
    fn cells_with_center_in(&self, ring: &[GeoPoint]) -> Result<HashSet<CellId>, HexAggError> {
        let coords: Vec<Coord<f64>> = ring.iter().map(|p| Coord::from(*p)).collect();
        let polygon = Polygon::new(LineString::new(coords), vec![]);

        let seed = self.cell_for(&ring[0])?;
        let mut visited: HashSet<CellId> = HashSet::from([seed]);
        let mut queue = VecDeque::from([seed]);
        let mut inside = HashSet::new();

        while let Some(cell) = queue.pop_front() {
            let center = cell.center();
            if polygon.contains(&Point::new(center.lon, center.lat)) {
                inside.insert(cell);
            }

            for index in cell.index().grid_disk::<Vec<_>>(1) {
                let next = CellId::from(index);
                if visited.insert(next) && next.boundary().to_polygon().intersects(&polygon) {
                    queue.push_back(next);
                }
            }
        }

        Ok(inside)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WARSAW: GeoPoint = GeoPoint {
        lat: 52.2297,
        lon: 21.0122,
    };

    #[test]
    fn test_invalid_resolution() {
        let result = HexGrid::new(16);
        assert!(matches!(result, Err(HexAggError::InvalidResolution(16))));
    }

    #[test]
    fn test_same_point_same_cell() -> Result<(), HexAggError> {
        let grid = HexGrid::new(9)?;
        let cell1 = grid.cell_for(&WARSAW)?;
        let cell2 = grid.cell_for(&WARSAW)?;
        let cell3 = grid.cell_for(&(WARSAW.lon, WARSAW.lat))?;

        assert_eq!(cell1, cell2);
        assert_eq!(cell1, cell3);
        assert_eq!(cell1.resolution(), 9);
        Ok(())
    }

    #[test]
    fn test_non_finite_point_rejected() -> Result<(), HexAggError> {
        let grid = HexGrid::new(9)?;
        let result = grid.cell_for(&GeoPoint::new(f64::NAN, 21.0));
        assert!(matches!(result, Err(HexAggError::InvalidGeometry(_))));
        Ok(())
    }

    #[test]
    fn test_out_of_range_point_rejected() -> Result<(), HexAggError> {
        let grid = HexGrid::new(9)?;
        for point in [
            GeoPoint::new(91.0, 21.0),
            GeoPoint::new(-90.5, 21.0),
            GeoPoint::new(52.0, 181.0),
        ] {
            assert!(matches!(
                grid.cell_for(&point),
                Err(HexAggError::InvalidGeometry(_))
            ));
        }
        assert!(grid.cell_for(&GeoPoint::new(90.0, 180.0)).is_ok());
        Ok(())
    }

    #[test]
    fn test_boundary_of_wrong_resolution() -> Result<(), HexAggError> {
        let coarse = HexGrid::new(7)?;
        let fine = HexGrid::new(9)?;
        let cell = coarse.cell_for(&WARSAW)?;

        assert_eq!(coarse.boundary_of(&cell)?.len(), 6);
        assert!(matches!(
            fine.boundary_of(&cell),
            Err(HexAggError::InvalidCell(_))
        ));
        Ok(())
    }

    #[test]
    fn test_neighbors_exclude_self() -> Result<(), HexAggError> {
        let grid = HexGrid::new(9)?;
        let cell = grid.cell_for(&WARSAW)?;

        let ring1 = grid.neighbors(&cell, 1)?;
        assert_eq!(ring1.len(), 6);
        assert!(!ring1.contains(&cell));

        let ring2 = grid.neighbors(&cell, 2)?;
        assert_eq!(ring2.len(), 18);
        assert!(ring1.is_subset(&ring2));
        Ok(())
    }

    #[test]
    fn test_neighbors_are_symmetric() -> Result<(), HexAggError> {
        let grid = HexGrid::new(9)?;
        let cell = grid.cell_for(&WARSAW)?;

        for n in grid.neighbors(&cell, 1)? {
            assert!(grid.neighbors(&n, 1)?.contains(&cell));
        }
        Ok(())
    }

    #[test]
    fn test_cells_covering_small_ring_is_vertex_cell() -> Result<(), HexAggError> {
        let grid = HexGrid::new(9)?;
        let center = grid.cell_for(&WARSAW)?.center();
        let d = 0.0002;
        let ring = vec![
            GeoPoint::new(center.lat - d, center.lon - d),
            GeoPoint::new(center.lat - d, center.lon + d),
            GeoPoint::new(center.lat + d, center.lon + d),
            GeoPoint::new(center.lat + d, center.lon - d),
            GeoPoint::new(center.lat - d, center.lon - d),
        ];

        let cells = grid.cells_covering(&ring)?;
        assert_eq!(cells.len(), 1);
        assert!(cells.contains(&grid.cell_for(&center)?));
        Ok(())
    }

    #[test]
    fn test_cells_covering_includes_interior_centers() -> Result<(), HexAggError> {
        let grid = HexGrid::new(9)?;
        let cell = grid.cell_for(&WARSAW)?;
        let center = cell.center();
        // ~2km square, far larger than a res-9 cell
        let d = 0.01;
        let ring = vec![
            GeoPoint::new(center.lat - d, center.lon - d),
            GeoPoint::new(center.lat - d, center.lon + d),
            GeoPoint::new(center.lat + d, center.lon + d),
            GeoPoint::new(center.lat + d, center.lon - d),
        ];

        let cells = grid.cells_covering(&ring)?;
        assert!(cells.len() > 20);
        assert!(cells.contains(&cell));
        for n in grid.neighbors(&cell, 1)? {
            assert!(cells.contains(&n));
        }
        for point in &ring {
            assert!(cells.contains(&grid.cell_for(point)?));
        }
        Ok(())
    }

    #[test]
    fn test_cells_covering_rejects_short_ring() -> Result<(), HexAggError> {
        let grid = HexGrid::new(9)?;
        let ring = vec![WARSAW, GeoPoint::new(52.23, 21.02)];

        let result = grid.cells_covering(&ring);
        assert!(matches!(result, Err(HexAggError::InvalidGeometry(_))));
        Ok(())
    }
}
