//! Per-feature attribution: turns one feature into `(cell, column, value)`
//! contributions.
//!
//! Each geometry kind has its own [`Attributor`]. They share an
//! [`AttributionContext`] holding the grid and a worker-local planar transform,
//! and never touch shared state, so features can be attributed in any order
//! and on any thread.

mod line;
mod point;
mod polygon;

pub use line::LineLengthAttributor;
pub use point::PointCounter;
pub use polygon::PolygonAreaAttributor;

use crate::cell::CellId;
use crate::config::AreaAttribution;
use crate::coord::PlanarTransform;
use crate::error::HexAggError;
use crate::feature::{Feature, GeometryKind};
use crate::index::HexGrid;
use crate::table::is_neighbour_column;

/// Column prefix for polygon area totals.
pub const AREA_PREFIX: &str = "area_";
/// Column prefix for line length totals.
pub const LENGTH_PREFIX: &str = "length_";

/// One value destined for the accumulator.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub cell: CellId,
    pub column: String,
    pub value: f64,
}

impl Contribution {
    pub fn new(cell: CellId, column: impl Into<String>, value: f64) -> Self {
        Self {
            cell,
            column: column.into(),
            value,
        }
    }
}

/// Table column a feature of `kind` and `category` contributes to.
///
/// Points use the bare category, polygons `area_<category>` and lines
/// `length_<category>`.
pub fn column_name(kind: GeometryKind, category: &str) -> String {
    match kind {
        GeometryKind::Point => category.to_string(),
        GeometryKind::Line => format!("{}{}", LENGTH_PREFIX, category),
        GeometryKind::Polygon => format!("{}{}", AREA_PREFIX, category),
    }
}

/// Everything an attributor needs besides the feature itself.
pub struct AttributionContext<'a> {
    pub grid: &'a HexGrid,
    pub transform: &'a PlanarTransform,
    pub area_attribution: AreaAttribution,
}

pub trait Attributor {
    /// Contributions of one feature. An `Err` drops the whole feature.
    fn attribute(
        &self,
        feature: &Feature,
        ctx: &AttributionContext<'_>,
    ) -> Result<Vec<Contribution>, HexAggError>;
}

/// Dispatches a feature to the attributor for its geometry kind.
///
/// Features whose column would end in `_neighbour_count` are rejected with
/// `InvalidCategory`, since that name belongs to a derived column.
pub fn attribute_feature(
    feature: &Feature,
    ctx: &AttributionContext<'_>,
) -> Result<Vec<Contribution>, HexAggError> {
    let column = column_name(feature.kind(), &feature.category);
    if is_neighbour_column(&column) {
        return Err(HexAggError::InvalidCategory(format!(
            "'{}' maps to column '{}', which is reserved for neighbour totals",
            feature.category, column
        )));
    }
    match feature.kind() {
        GeometryKind::Point => PointCounter.attribute(feature, ctx),
        GeometryKind::Line => LineLengthAttributor.attribute(feature, ctx),
        GeometryKind::Polygon => {
            PolygonAreaAttributor::new(ctx.area_attribution).attribute(feature, ctx)
        }
    }
}

fn wrong_kind(expected: GeometryKind, feature: &Feature) -> HexAggError {
    HexAggError::InvalidGeometry(format!(
        "Expected a {:?} feature, got {:?}",
        expected,
        feature.kind()
    ))
}
