//! # hexagg-rs
//!
//! Aggregates categorised vector features into an H3 hexagon feature table:
//! one row per cell, point counts, intersection areas and lengths per
//! category, plus `<column>_neighbour_count` columns summing each column over
//! the cell's 1-ring neighbours.
//!
//! ### 1. `Aggregator` - Batch Runs
//!
//! ```no_run
//! use hexagg_rs::{AggregationConfig, Aggregator, Feature, GeoPoint};
//!
//! # fn main() -> Result<(), hexagg_rs::HexAggError> {
//! let config = AggregationConfig::new("EPSG:2180").resolution(9);
//! let aggregator = Aggregator::new(config)?;
//!
//! let features = vec![
//!     Feature::point("amenity", GeoPoint::new(52.2297, 21.0122)),
//!     Feature::line("highway", vec![GeoPoint::new(52.2297, 21.0122), GeoPoint::new(52.2310, 21.0150)]),
//! ];
//! let output = aggregator.run(&features)?;
//! output.table.write_csv("cells.csv")?;
//! # Ok(())
//! # }
//! ```
//!
//! ### 2. `HexGrid` - Cell Lookup
//!
//! ```
//! use hexagg_rs::{GeoPoint, HexGrid};
//!
//! # fn main() -> Result<(), hexagg_rs::HexAggError> {
//! let grid = HexGrid::new(9)?;
//! let cell = grid.cell_for(&GeoPoint::new(52.2297, 21.0122))?;
//! println!("{} has {} neighbours", cell, grid.neighbors(&cell, 1)?.len());
//! # Ok(())
//! # }
//! ```
//!
//! ### 3. Loading and Exporting
//!
//! Features can be read from GeoJSON or CSV, and tables written to CSV or
//! GeoParquet:
//!
//! ```no_run
//! use hexagg_rs::{
//!     AggregationConfig, FeatureCsvConfig, FeatureTableToGeoParquet, aggregate, features_from_csv,
//! };
//!
//! let config = FeatureCsvConfig::new("landuse", "geometry");
//! let features = features_from_csv("landuse.csv", &config).unwrap();
//!
//! let output = aggregate(&features, &AggregationConfig::new("EPSG:3035")).unwrap();
//! output.table.to_geoparquet("landuse.parquet").unwrap();
//! ```

pub mod attribute;
pub mod cell;
pub mod config;
pub mod coord;
pub mod error;
pub mod feature;
pub mod geom;
pub mod index;
pub mod io;
pub mod pipeline;
pub mod table;

pub use attribute::{
    AttributionContext, Attributor, Contribution, LineLengthAttributor, PointCounter,
    PolygonAreaAttributor, attribute_feature, column_name,
};
pub use cell::{CellBoundary, CellId};
pub use config::{AggregationConfig, AreaAttribution};
pub use coord::{Coordinate, PlanarTransform, Projector};
pub use error::HexAggError;
pub use feature::{Feature, FeatureGeometry, GeoPoint, GeometryKind};
pub use geom::{
    area_of_intersection, cells_to_polygon, length_of_intersection, parse_geojson, parse_geometry,
    parse_wkt, polygon_ring, validate_line, validate_ring,
};
pub use index::{DEFAULT_RESOLUTION, HexGrid, MAX_RESOLUTION, NEIGHBOUR_RING};
pub use io::{
    CoordinateSource, CsvToFeatures, FeatureCsvConfig, FeatureTableToArrow,
    FeatureTableToGeoParquet, GeometryFormat, features_from_csv, features_from_geojson,
    features_from_geojson_file, features_from_geojson_file_with_fallback,
    features_from_geojson_with_fallback, write_geoparquet,
};
pub use pipeline::{
    AggregationOutput, Aggregator, Diagnostics, FailureKind, FeatureFailure, aggregate,
};
pub use table::{
    Accumulator, FeatureTable, NEIGHBOUR_SUFFIX, add_neighbour_counts, assemble, merge,
    merge_summed, shared_columns,
};

pub use geo_types;
pub use geoarrow_array;
pub use geoarrow_schema;
pub use geoparquet;
