use crate::cell::CellId;
use crate::error::HexAggError;
use crate::feature::GeoPoint;
use geo::ConvexHull;
use geo_types::{MultiPoint, Point, Polygon};

/// Builds the lon/lat polygon bounding a set of cells.
///
/// Collects every boundary vertex of every cell and returns their convex hull.
/// For a single cell this is the cell's own hexagon. For a multi-cell coverage
/// region it approximates, but does not reproduce, the union of hexagons.
///
/// # Example
///
/// ```
/// use hexagg_rs::{GeoPoint, HexGrid, cells_to_polygon};
///
/// # fn main() -> Result<(), hexagg_rs::HexAggError> {
/// let grid = HexGrid::new(9)?;
/// let cell = grid.cell_for(&GeoPoint::new(52.2297, 21.0122))?;
/// let hexagon = cells_to_polygon([&cell])?;
/// assert_eq!(hexagon.exterior().coords().count(), 7);
/// # Ok(())
/// # }
/// ```
pub fn cells_to_polygon<'a>(
    cells: impl IntoIterator<Item = &'a CellId>,
) -> Result<Polygon<f64>, HexAggError> {
    let points: Vec<Point<f64>> = cells
        .into_iter()
        .flat_map(|cell| {
            cell.boundary()
                .points()
                .iter()
                .map(|p| Point::new(p.lon, p.lat))
                .collect::<Vec<_>>()
        })
        .collect();

    if points.is_empty() {
        return Err(HexAggError::InvalidGeometry(
            "Cannot build a polygon from an empty cell set".to_string(),
        ));
    }

    Ok(MultiPoint::new(points).convex_hull())
}

/// Returns a polygon's exterior as WGS84 points (closed).
pub fn polygon_ring(polygon: &Polygon<f64>) -> Vec<GeoPoint> {
    polygon
        .exterior()
        .coords()
        .map(|c| GeoPoint::from(*c))
        .collect()
}
