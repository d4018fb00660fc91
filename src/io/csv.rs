use super::{GeometryFormat, UNKNOWN_CATEGORY};
use crate::error::HexAggError;
use crate::feature::{Feature, GeoPoint};
use crate::geom::parse::parse_features;
use crate::table::FeatureTable;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

enum SourceIndices {
    Geometry(usize),
    Coordinates { lon_idx: usize, lat_idx: usize },
}

/// Where a CSV row keeps its location.
#[derive(Debug, Clone)]
pub enum CoordinateSource {
    /// A single column containing WKT or GeoJSON geometry (lon/lat)
    GeometryColumn(String),
    /// Separate longitude and latitude columns
    CoordinateColumns {
        lon_column: String,
        lat_column: String,
    },
}

/// Configuration for reading features from CSV.
#[derive(Debug, Clone)]
pub struct FeatureCsvConfig {
    pub category_column: String,
    pub source: CoordinateSource,
}

impl FeatureCsvConfig {
    /// Config for a CSV with a geometry column (WKT or GeoJSON).
    ///
    /// # Example
    /// ```
    /// use hexagg_rs::FeatureCsvConfig;
    ///
    /// let config = FeatureCsvConfig::new("category", "geometry");
    /// ```
    pub fn new(category_column: impl Into<String>, geometry_column: impl Into<String>) -> Self {
        Self {
            category_column: category_column.into(),
            source: CoordinateSource::GeometryColumn(geometry_column.into()),
        }
    }

    /// Config for a CSV of points with separate longitude/latitude columns.
    ///
    /// # Example
    /// ```
    /// use hexagg_rs::FeatureCsvConfig;
    ///
    /// let config = FeatureCsvConfig::from_coords("amenity", "Longitude", "Latitude");
    /// ```
    pub fn from_coords(
        category_column: impl Into<String>,
        lon_column: impl Into<String>,
        lat_column: impl Into<String>,
    ) -> Self {
        Self {
            category_column: category_column.into(),
            source: CoordinateSource::CoordinateColumns {
                lon_column: lon_column.into(),
                lat_column: lat_column.into(),
            },
        }
    }
}

/// Reads features from a CSV file at a path.
pub trait CsvToFeatures {
    fn to_features(&self, config: &FeatureCsvConfig) -> Result<Vec<Feature>, HexAggError>;
}

impl<P: AsRef<Path>> CsvToFeatures for P {
    fn to_features(&self, config: &FeatureCsvConfig) -> Result<Vec<Feature>, HexAggError> {
        features_from_csv(self, config)
    }
}

/// Reads features from a CSV file.
///
/// Multi-part geometries yield one feature per part. Empty categories become
/// `"unknown"`.
///
/// ```no_run
/// use hexagg_rs::{FeatureCsvConfig, features_from_csv};
///
/// let config = FeatureCsvConfig::new("landuse", "WKT");
/// let features = features_from_csv("landuse.csv", &config).unwrap();
/// ```
pub fn features_from_csv(
    csv_path: impl AsRef<Path>,
    config: &FeatureCsvConfig,
) -> Result<Vec<Feature>, HexAggError> {
    let file = File::open(csv_path).map_err(|e| HexAggError::CsvError(e.to_string()))?;
    features_from_csv_reader(file, config)
}

/// Reads features from any CSV source.
pub fn features_from_csv_reader<R: Read>(
    source: R,
    config: &FeatureCsvConfig,
) -> Result<Vec<Feature>, HexAggError> {
    let mut reader = csv::Reader::from_reader(source);
    let headers = reader
        .headers()
        .map_err(|e| HexAggError::CsvError(e.to_string()))?
        .clone();

    let find = |name: &str, role: &str| -> Result<usize, HexAggError> {
        if name.is_empty() {
            return Err(HexAggError::CsvError(format!(
                "{} column name cannot be empty",
                role
            )));
        }
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| HexAggError::CsvError(format!("{} column '{}' not found", role, name)))
    };

    let category_idx = find(&config.category_column, "Category")?;
    let source_indices = match &config.source {
        CoordinateSource::GeometryColumn(col) => SourceIndices::Geometry(find(col, "Geometry")?),
        CoordinateSource::CoordinateColumns {
            lon_column,
            lat_column,
        } => SourceIndices::Coordinates {
            lon_idx: find(lon_column, "Longitude")?,
            lat_idx: find(lat_column, "Latitude")?,
        },
    };

    let mut features = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| HexAggError::CsvError(e.to_string()))?;
        let field = |idx: usize| {
            record
                .get(idx)
                .map(str::trim)
                .ok_or_else(|| HexAggError::CsvError(format!("Missing field at index {}", idx)))
        };

        let category = match field(category_idx)? {
            "" => UNKNOWN_CATEGORY,
            c => c,
        };

        match &source_indices {
            SourceIndices::Geometry(idx) => {
                features.extend(parse_features(category, field(*idx)?)?);
            }
            SourceIndices::Coordinates { lon_idx, lat_idx } => {
                let lon = parse_coordinate(field(*lon_idx)?, "longitude")?;
                let lat = parse_coordinate(field(*lat_idx)?, "latitude")?;
                features.push(Feature::point(category, GeoPoint::new(lat, lon)));
            }
        }
    }

    log::debug!("Read {} features from CSV", features.len());
    Ok(features)
}

fn parse_coordinate(s: &str, name: &str) -> Result<f64, HexAggError> {
    s.parse()
        .map_err(|_| HexAggError::CsvError(format!("Invalid {}: '{}'", name, s)))
}

fn polygon_to_wkt(polygon: &geo_types::Polygon<f64>) -> String {
    use wkt::ToWkt;
    polygon.wkt_string()
}

fn polygon_to_geojson(polygon: &geo_types::Polygon<f64>) -> String {
    let geom = geojson::Geometry::from(polygon);
    geom.to_string()
}

impl FeatureTable {
    /// Writes the table as CSV: `hex_id` followed by the table's columns, one
    /// row per cell ordered by cell id.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), HexAggError> {
        let file = File::create(path).map_err(|e| HexAggError::IoError(e.to_string()))?;
        self.write_csv_rows(file, None)
    }

    /// As [`FeatureTable::write_csv`], plus a `hex_geometry` column after `hex_id`.
    pub fn write_csv_with_geometry(
        &self,
        path: impl AsRef<Path>,
        format: GeometryFormat,
    ) -> Result<(), HexAggError> {
        let file = File::create(path).map_err(|e| HexAggError::IoError(e.to_string()))?;
        self.write_csv_rows(file, Some(format))
    }

    /// Writes the CSV to any writer, e.g. stdout.
    pub fn write_csv_to<W: Write>(&self, writer: W) -> Result<(), HexAggError> {
        self.write_csv_rows(writer, None)
    }

    fn write_csv_rows<W: Write>(
        &self,
        out: W,
        geometry: Option<GeometryFormat>,
    ) -> Result<(), HexAggError> {
        let mut writer = csv::Writer::from_writer(out);

        let mut header_row: Vec<&str> = vec!["hex_id"];
        if geometry.is_some() {
            header_row.push("hex_geometry");
        }
        header_row.extend(self.columns().iter().map(String::as_str));
        writer
            .write_record(&header_row)
            .map_err(|e| HexAggError::CsvError(e.to_string()))?;

        for cell in self.sorted_cells() {
            let mut row: Vec<String> = vec![cell.to_string()];

            if let Some(format) = geometry {
                let polygon = cell.boundary().to_polygon();
                row.push(match format {
                    GeometryFormat::Wkt => polygon_to_wkt(&polygon),
                    GeometryFormat::GeoJson => polygon_to_geojson(&polygon),
                });
            }

            if let Some(values) = self.row(&cell) {
                row.extend(values.iter().map(f64::to_string));
            }
            writer
                .write_record(&row)
                .map_err(|e| HexAggError::CsvError(e.to_string()))?;
        }

        writer
            .flush()
            .map_err(|e| HexAggError::CsvError(e.to_string()))?;

        Ok(())
    }
}
