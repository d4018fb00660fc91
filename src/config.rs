use crate::coord::Projector;
use crate::error::HexAggError;
use crate::index::{DEFAULT_RESOLUTION, MAX_RESOLUTION};
use serde::{Deserialize, Serialize};

/// How a polygon feature's area is written into the cells it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaAttribution {
    /// One intersection against the hull of all covering cells; every covering
    /// cell receives that same total.
    #[default]
    Coverage,
    /// Each covering cell receives the intersection with its own hexagon.
    PerCell,
}

/// Options for one aggregation run.
///
/// The projection has no default: it must be a planar CRS chosen for the
/// study area.
///
/// # Example
/// ```
/// use hexagg_rs::{AggregationConfig, AreaAttribution};
///
/// let config = AggregationConfig::new("EPSG:2180")
///     .resolution(8)
///     .neighbour_aggregation(false)
///     .area_attribution(AreaAttribution::PerCell);
/// assert_eq!(config.hexagon_resolution, 8);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationConfig {
    #[serde(default = "default_resolution")]
    pub hexagon_resolution: u8,
    pub projection: String,
    #[serde(default = "default_neighbour_aggregation")]
    pub include_neighbour_aggregation: bool,
    #[serde(default)]
    pub area_attribution: AreaAttribution,
}

fn default_resolution() -> u8 {
    DEFAULT_RESOLUTION
}

fn default_neighbour_aggregation() -> bool {
    true
}

impl AggregationConfig {
    pub fn new(projection: impl Into<String>) -> Self {
        Self {
            hexagon_resolution: DEFAULT_RESOLUTION,
            projection: projection.into(),
            include_neighbour_aggregation: true,
            area_attribution: AreaAttribution::default(),
        }
    }

    pub fn resolution(mut self, resolution: u8) -> Self {
        self.hexagon_resolution = resolution;
        self
    }

    pub fn neighbour_aggregation(mut self, enabled: bool) -> Self {
        self.include_neighbour_aggregation = enabled;
        self
    }

    pub fn area_attribution(mut self, mode: AreaAttribution) -> Self {
        self.area_attribution = mode;
        self
    }

    /// Loads a config from a JSON document. Omitted optional fields take their
    /// defaults; `projection` is required.
    pub fn from_json_str(s: &str) -> Result<Self, HexAggError> {
        serde_json::from_str(s).map_err(|e| HexAggError::ConfigError(e.to_string()))
    }

    /// Checks the resolution range and that the projection resolves.
    pub fn validate(&self) -> Result<(), HexAggError> {
        if self.hexagon_resolution > MAX_RESOLUTION {
            return Err(HexAggError::InvalidResolution(self.hexagon_resolution));
        }
        Projector::new(self.projection.as_str())?;
        Ok(())
    }
}
