use super::{AttributionContext, Attributor, Contribution, column_name, wrong_kind};
use crate::cell::CellId;
use crate::config::AreaAttribution;
use crate::error::HexAggError;
use crate::feature::{Feature, FeatureGeometry, GeometryKind};
use crate::geom::{area_of_intersection, cells_to_polygon, validate_ring};

/// Attributes a polygon's area to the cells covering it.
///
/// In [`AreaAttribution::Coverage`] mode the feature is intersected once with
/// the hull of all covering cells and that total is written to every covering
/// cell. Summing an area column over cells therefore over-counts; the value is
/// "area of this category in the region around the cell". [`AreaAttribution::PerCell`]
/// intersects each covering cell's own hexagon instead.
///
/// Every covering cell receives a contribution, including zero ones, so the
/// cell shows up in the table.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolygonAreaAttributor {
    mode: AreaAttribution,
}

impl PolygonAreaAttributor {
    pub fn new(mode: AreaAttribution) -> Self {
        Self { mode }
    }
}

impl Attributor for PolygonAreaAttributor {
    fn attribute(
        &self,
        feature: &Feature,
        ctx: &AttributionContext<'_>,
    ) -> Result<Vec<Contribution>, HexAggError> {
        let FeatureGeometry::Polygon(ring) = &feature.geometry else {
            return Err(wrong_kind(GeometryKind::Polygon, feature));
        };
        validate_ring(ring)?;

        let column = column_name(GeometryKind::Polygon, &feature.category);
        let shape = ctx.transform.ring_to_planar(ring)?;

        let mut cells: Vec<CellId> = ctx.grid.cells_covering(ring)?.into_iter().collect();
        cells.sort_by_key(|c| u64::from(c.index()));

        match self.mode {
            AreaAttribution::Coverage => {
                let region = ctx.transform.polygon_to_planar(&cells_to_polygon(&cells)?)?;
                let area = area_of_intersection(&region, &shape);
                Ok(cells
                    .into_iter()
                    .map(|cell| Contribution::new(cell, column.as_str(), area))
                    .collect())
            }
            AreaAttribution::PerCell => cells
                .into_iter()
                .map(|cell| {
                    let hexagon = ctx.transform.polygon_to_planar(&cells_to_polygon([&cell])?)?;
                    Ok(Contribution::new(
                        cell,
                        column.as_str(),
                        area_of_intersection(&hexagon, &shape),
                    ))
                })
                .collect(),
        }
    }
}
