use super::{AttributionContext, Attributor, Contribution, column_name, wrong_kind};
use crate::cell::CellId;
use crate::error::HexAggError;
use crate::feature::{Feature, FeatureGeometry, GeoPoint, GeometryKind};
use crate::geom::{cells_to_polygon, length_of_intersection, validate_line};
use crate::index::HexGrid;
use std::collections::HashSet;

/// Attributes a line's length to the cells its vertices fall in.
///
/// Each vertex cell is clipped against the whole projected line, so a segment
/// passing through a cell that holds none of the line's vertices is not
/// counted there.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineLengthAttributor;

impl Attributor for LineLengthAttributor {
    fn attribute(
        &self,
        feature: &Feature,
        ctx: &AttributionContext<'_>,
    ) -> Result<Vec<Contribution>, HexAggError> {
        let FeatureGeometry::Line(points) = &feature.geometry else {
            return Err(wrong_kind(GeometryKind::Line, feature));
        };
        validate_line(points)?;

        let column = column_name(GeometryKind::Line, &feature.category);
        let line = ctx.transform.line_to_planar(points)?;

        let mut contributions = Vec::new();
        for cell in vertex_cells(ctx.grid, points)? {
            let hexagon = ctx.transform.polygon_to_planar(&cells_to_polygon([&cell])?)?;
            let length = length_of_intersection(&hexagon, &line);
            if length > 0.0 {
                contributions.push(Contribution::new(cell, column.as_str(), length));
            }
        }
        Ok(contributions)
    }
}

// Vertex cells in first-seen order, each once.
fn vertex_cells(grid: &HexGrid, points: &[GeoPoint]) -> Result<Vec<CellId>, HexAggError> {
    let mut seen = HashSet::new();
    let mut cells = Vec::new();
    for point in points {
        let cell = grid.cell_for(point)?;
        if seen.insert(cell) {
            cells.push(cell);
        }
    }
    Ok(cells)
}
