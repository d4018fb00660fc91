use crate::attribute::{AttributionContext, Contribution, attribute_feature};
use crate::config::AggregationConfig;
use crate::coord::Projector;
use crate::error::HexAggError;
use crate::feature::{Feature, GeometryKind};
use crate::index::HexGrid;
use crate::table::{Accumulator, FeatureTable, add_neighbour_counts, merge_summed, shared_columns};
use rayon::prelude::*;
use std::fmt;

/// Why a feature was left out of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    InvalidGeometry,
    InvalidCategory,
    Projection,
}

impl FailureKind {
    /// Classifies a per-feature error; `None` for errors that must abort the run.
    pub fn of(err: &HexAggError) -> Option<Self> {
        match err {
            HexAggError::InvalidGeometry(_) => Some(Self::InvalidGeometry),
            HexAggError::InvalidCategory(_) => Some(Self::InvalidCategory),
            HexAggError::ProjectionError(_) => Some(Self::Projection),
            _ => None,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGeometry => write!(f, "invalid geometry"),
            Self::InvalidCategory => write!(f, "invalid category"),
            Self::Projection => write!(f, "projection"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFailure {
    /// Position of the feature in the input slice.
    pub index: usize,
    pub category: String,
    pub kind: FailureKind,
    pub message: String,
}

/// Counts and per-feature failures of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    pub features_total: usize,
    pub features_attributed: usize,
    pub contributions: usize,
    /// Sorted by feature index.
    pub failures: Vec<FeatureFailure>,
}

impl Diagnostics {
    pub fn skipped(&self) -> usize {
        self.failures.len()
    }

    pub fn skipped_by(&self, kind: FailureKind) -> usize {
        self.failures.iter().filter(|f| f.kind == kind).count()
    }
}

#[derive(Debug, Clone)]
pub struct AggregationOutput {
    pub table: FeatureTable,
    pub diagnostics: Diagnostics,
}

enum Outcome {
    Attributed(GeometryKind, Vec<Contribution>),
    Skipped(FeatureFailure),
}

// One worker's share of the run, one accumulator per geometry kind.
#[derive(Default)]
struct Partial {
    points: Accumulator,
    lines: Accumulator,
    polygons: Accumulator,
    attributed: usize,
    contributions: usize,
    failures: Vec<FeatureFailure>,
}

impl Partial {
    fn absorb(mut self, outcome: Outcome) -> Self {
        match outcome {
            Outcome::Attributed(kind, contributions) => {
                self.attributed += 1;
                self.contributions += contributions.len();
                let target = match kind {
                    GeometryKind::Point => &mut self.points,
                    GeometryKind::Line => &mut self.lines,
                    GeometryKind::Polygon => &mut self.polygons,
                };
                target.extend(contributions);
            }
            Outcome::Skipped(failure) => self.failures.push(failure),
        }
        self
    }

    fn merge(mut self, other: Partial) -> Self {
        self.points = self.points.merge(other.points);
        self.lines = self.lines.merge(other.lines);
        self.polygons = self.polygons.merge(other.polygons);
        self.attributed += other.attributed;
        self.contributions += other.contributions;
        self.failures.extend(other.failures);
        self
    }
}

/// Runs feature lists through attribution, assembly and neighbour aggregation.
///
/// The grid and projector are resolved once in [`Aggregator::new`], so a bad
/// resolution or unknown CRS fails before any feature is touched.
///
/// # Example
///
/// ```no_run
/// use hexagg_rs::{AggregationConfig, Aggregator, Feature, GeoPoint};
///
/// # fn main() -> Result<(), hexagg_rs::HexAggError> {
/// let aggregator = Aggregator::new(AggregationConfig::new("EPSG:2180"))?;
/// let features = vec![Feature::point("amenity", GeoPoint::new(52.2297, 21.0122))];
///
/// let output = aggregator.run(&features)?;
/// println!("{} cells, {} skipped", output.table.len(), output.diagnostics.skipped());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Aggregator {
    config: AggregationConfig,
    grid: HexGrid,
    projector: Projector,
}

impl Aggregator {
    pub fn new(config: AggregationConfig) -> Result<Self, HexAggError> {
        config.validate()?;
        let grid = HexGrid::new(config.hexagon_resolution)?;
        let projector = Projector::new(config.projection.as_str())?;
        Ok(Self {
            config,
            grid,
            projector,
        })
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    /// Aggregates `features` into one table.
    ///
    /// Malformed features and features outside the projection's domain are
    /// skipped and reported in the diagnostics. Any other error aborts.
    pub fn run(&self, features: &[Feature]) -> Result<AggregationOutput, HexAggError> {
        log::info!(
            "Aggregating {} features at resolution {} in {}",
            features.len(),
            self.grid.resolution(),
            self.projector.crs()
        );

        let partial = self.attribute_all(features)?;

        let tables = [
            partial.points.into_table(),
            partial.lines.into_table(),
            partial.polygons.into_table(),
        ];
        log::debug!(
            "Assembled {} point, {} line and {} polygon rows",
            tables[0].len(),
            tables[1].len(),
            tables[2].len()
        );
        // a point category such as `area_building` lands in a polygon column
        let shared = shared_columns(&tables);
        if !shared.is_empty() {
            log::warn!(
                "Columns {:?} are fed by more than one geometry kind; their values are summed",
                shared
            );
        }
        let mut table = merge_summed(&tables);

        if self.config.include_neighbour_aggregation {
            table = add_neighbour_counts(&table, &self.grid)?;
        }

        let mut failures = partial.failures;
        failures.sort_by_key(|f| f.index);
        let diagnostics = Diagnostics {
            features_total: features.len(),
            features_attributed: partial.attributed,
            contributions: partial.contributions,
            failures,
        };

        log::info!(
            "Aggregated {} of {} features into {} cells x {} columns ({} skipped)",
            diagnostics.features_attributed,
            diagnostics.features_total,
            table.len(),
            table.columns().len(),
            diagnostics.skipped()
        );
        Ok(AggregationOutput { table, diagnostics })
    }

    // proj handles are not thread safe, so every rayon split builds its own.
    fn attribute_all(&self, features: &[Feature]) -> Result<Partial, HexAggError> {
        features
            .par_iter()
            .enumerate()
            .map_init(
                || self.projector.transform(),
                |transform, (index, feature)| {
                    let transform = transform.as_ref().map_err(Clone::clone)?;
                    let ctx = AttributionContext {
                        grid: &self.grid,
                        transform,
                        area_attribution: self.config.area_attribution,
                    };
                    self.outcome(index, feature, &ctx)
                },
            )
            .try_fold(Partial::default, |partial, outcome| {
                Ok::<_, HexAggError>(partial.absorb(outcome?))
            })
            .try_reduce(Partial::default, |a, b| Ok(a.merge(b)))
    }

    fn outcome(
        &self,
        index: usize,
        feature: &Feature,
        ctx: &AttributionContext<'_>,
    ) -> Result<Outcome, HexAggError> {
        match attribute_feature(feature, ctx) {
            Ok(contributions) => Ok(Outcome::Attributed(feature.kind(), contributions)),
            Err(err) => {
                let kind = FailureKind::of(&err).ok_or_else(|| err.clone())?;
                log::warn!(
                    "Skipping feature {} ({}): {} error: {}",
                    index,
                    feature.category,
                    kind,
                    err
                );
                Ok(Outcome::Skipped(FeatureFailure {
                    index,
                    category: feature.category.clone(),
                    kind,
                    message: err.to_string(),
                }))
            }
        }
    }
}

/// Builds an [`Aggregator`] for `config` and runs it once.
pub fn aggregate(
    features: &[Feature],
    config: &AggregationConfig,
) -> Result<AggregationOutput, HexAggError> {
    Aggregator::new(config.clone())?.run(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::GeoPoint;
    use geo::Area;

    #[test]
    fn test_failure_kind_classification() {
        assert_eq!(
            FailureKind::of(&HexAggError::InvalidGeometry("ring".into())),
            Some(FailureKind::InvalidGeometry)
        );
        assert_eq!(
            FailureKind::of(&HexAggError::ProjectionError("domain".into())),
            Some(FailureKind::Projection)
        );
        assert_eq!(FailureKind::of(&HexAggError::InvalidCell("x".into())), None);
    }

    #[test]
    fn test_new_rejects_bad_config() {
        assert!(matches!(
            Aggregator::new(AggregationConfig::new("EPSG:2180").resolution(16)),
            Err(HexAggError::InvalidResolution(16))
        ));
        assert!(matches!(
            Aggregator::new(AggregationConfig::new("")),
            Err(HexAggError::ConfigError(_))
        ));
    }

    #[test]
    fn test_empty_input() -> Result<(), HexAggError> {
        let output = Aggregator::new(AggregationConfig::new("EPSG:2180"))?.run(&[])?;

        assert!(output.table.is_empty());
        assert_eq!(output.diagnostics, Diagnostics::default());
        Ok(())
    }

    #[test]
    fn test_failures_sorted_and_classified() -> Result<(), HexAggError> {
        let warsaw = GeoPoint::new(52.2297, 21.0122);
        let features = vec![
            Feature::point("amenity", warsaw),
            Feature::line("highway", vec![warsaw]),
            Feature::point("amenity", warsaw),
            Feature::polygon("building", vec![warsaw, GeoPoint::new(52.23, 21.02)]),
        ];

        let aggregator = Aggregator::new(AggregationConfig::new("EPSG:2180"))?;
        let output = aggregator.run(&features)?;

        let d = &output.diagnostics;
        assert_eq!(d.features_total, 4);
        assert_eq!(d.features_attributed, 2);
        assert_eq!(d.skipped(), 2);
        assert_eq!(d.skipped_by(FailureKind::InvalidGeometry), 2);
        assert_eq!(d.failures[0].index, 1);
        assert_eq!(d.failures[0].category, "highway");
        assert_eq!(d.failures[1].index, 3);
        Ok(())
    }

    #[test]
    fn test_colliding_columns_are_summed() -> Result<(), HexAggError> {
        let grid = HexGrid::new(9)?;
        let center = grid.cell_for(&GeoPoint::new(52.2297, 21.0122))?.center();
        let d = 0.0004;
        let ring = vec![
            GeoPoint::new(center.lat - d, center.lon - d),
            GeoPoint::new(center.lat - d, center.lon + d),
            GeoPoint::new(center.lat + d, center.lon + d),
            GeoPoint::new(center.lat + d, center.lon - d),
        ];
        let features = vec![
            Feature::point("area_building", center),
            Feature::polygon("building", ring.clone()),
        ];

        let aggregator = Aggregator::new(AggregationConfig::new("EPSG:2180"))?;
        let output = aggregator.run(&features)?;

        let area = aggregator.projector().transform()?.ring_to_planar(&ring)?.unsigned_area();
        let cell = grid.cell_for(&center)?;
        assert_eq!(output.table.len(), 1);
        assert_eq!(output.table.columns(), &["area_building", "area_building_neighbour_count"]);
        let value = output.table.get(&cell, "area_building").unwrap_or_default();
        assert!((value - (area + 1.0)).abs() < 1e-6 * area);
        Ok(())
    }

    #[test]
    fn test_reserved_category_keeps_neighbour_column() -> Result<(), HexAggError> {
        let grid = HexGrid::new(9)?;
        let cell = grid.cell_for(&GeoPoint::new(52.2297, 21.0122))?;
        let neighbour = grid
            .neighbors(&cell, 1)?
            .into_iter()
            .next()
            .ok_or_else(|| HexAggError::InvalidCell("no neighbour".into()))?;
        let features = vec![
            Feature::point("shop", cell.center()),
            Feature::point("shop_neighbour_count", neighbour.center()),
            Feature::point("shop", neighbour.center()),
        ];

        let output = aggregate(&features, &AggregationConfig::new("EPSG:2180"))?;

        assert_eq!(output.table.columns(), &["shop", "shop_neighbour_count"]);
        assert_eq!(output.table.get(&cell, "shop_neighbour_count"), Some(1.0));
        assert_eq!(output.table.get(&neighbour, "shop_neighbour_count"), Some(1.0));
        assert_eq!(output.diagnostics.skipped_by(FailureKind::InvalidCategory), 1);
        assert_eq!(output.diagnostics.failures[0].index, 1);
        Ok(())
    }

    #[test]
    fn test_out_of_range_point_is_skipped() -> Result<(), HexAggError> {
        let features = vec![
            Feature::point("amenity", GeoPoint::new(52.2297, 21.0122)),
            Feature::point("amenity", GeoPoint::new(95.0, 21.0122)),
        ];

        let output = aggregate(&features, &AggregationConfig::new("EPSG:2180"))?;

        assert_eq!(output.table.column_total("amenity"), Some(1.0));
        assert_eq!(output.diagnostics.skipped_by(FailureKind::InvalidGeometry), 1);
        assert_eq!(output.diagnostics.failures[0].index, 1);
        Ok(())
    }

    #[test]
    fn test_out_of_domain_feature_is_skipped() -> Result<(), HexAggError> {
        // more than 90 degrees from the UTM 34N central meridian
        let features = vec![
            Feature::point("amenity", GeoPoint::new(52.2297, 21.0122)),
            Feature::line(
                "highway",
                vec![GeoPoint::new(0.0, 112.0), GeoPoint::new(0.001, 112.001)],
            ),
        ];

        let config = AggregationConfig::new("EPSG:32634").neighbour_aggregation(false);
        let output = aggregate(&features, &config)?;

        assert_eq!(output.table.column_total("amenity"), Some(1.0));
        assert_eq!(output.diagnostics.skipped(), 1);
        assert_eq!(output.diagnostics.skipped_by(FailureKind::Projection), 1);
        Ok(())
    }
}
