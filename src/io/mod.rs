//! Reading features from files and exporting finished tables.

pub mod arrow;
pub mod csv;
pub mod geojson;
pub mod parquet;

pub use self::arrow::FeatureTableToArrow;
pub use self::csv::{
    CoordinateSource, CsvToFeatures, FeatureCsvConfig, features_from_csv, features_from_csv_reader,
};
pub use self::geojson::{
    features_from_geojson, features_from_geojson_file, features_from_geojson_file_with_fallback,
    features_from_geojson_with_fallback,
};
pub use self::parquet::{FeatureTableToGeoParquet, TABLE_METADATA_KEY, write_geoparquet};

/// Category given to features whose source row carries none.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Text encoding for cell polygons in CSV output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryFormat {
    /// Well-Known Text format (e.g., "POLYGON((...))")
    Wkt,
    /// GeoJSON format
    GeoJson,
}
