use super::{AttributionContext, Attributor, Contribution, column_name, wrong_kind};
use crate::error::HexAggError;
use crate::feature::{Feature, FeatureGeometry, GeometryKind};

/// Counts a point feature once in the cell containing it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointCounter;

impl Attributor for PointCounter {
    fn attribute(
        &self,
        feature: &Feature,
        ctx: &AttributionContext<'_>,
    ) -> Result<Vec<Contribution>, HexAggError> {
        let FeatureGeometry::Point(point) = &feature.geometry else {
            return Err(wrong_kind(GeometryKind::Point, feature));
        };

        let cell = ctx.grid.cell_for(point)?;
        Ok(vec![Contribution::new(
            cell,
            column_name(GeometryKind::Point, &feature.category),
            1.0,
        )])
    }
}
