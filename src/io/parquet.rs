use super::arrow::FeatureTableToArrow;
use crate::error::HexAggError;
use crate::table::{FeatureTable, is_neighbour_column};
use arrow_array::RecordBatch;
use geoparquet::writer::{
    GeoParquetRecordBatchEncoder, GeoParquetWriterEncoding, GeoParquetWriterOptionsBuilder,
};
use parquet::arrow::ArrowWriter;
use parquet::file::metadata::KeyValue;
use parquet::file::properties::WriterProperties;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

/// Key of the file-level metadata entry describing a feature table.
pub const TABLE_METADATA_KEY: &str = "hexagg";

/// What a reader needs to interpret the columns of a written feature table.
#[derive(Debug, Serialize)]
struct TableMetadata<'a> {
    /// `None` for an empty table.
    resolution: Option<u8>,
    rows: usize,
    base_columns: Vec<&'a str>,
    neighbour_columns: Vec<&'a str>,
}

impl<'a> TableMetadata<'a> {
    fn of(table: &'a FeatureTable) -> Self {
        let (neighbour_columns, base_columns) = table
            .columns()
            .iter()
            .map(String::as_str)
            .partition(|c| is_neighbour_column(c));
        Self {
            resolution: table.cells().next().map(|c| c.resolution()),
            rows: table.len(),
            base_columns,
            neighbour_columns,
        }
    }

    fn to_key_value(&self) -> Result<KeyValue, HexAggError> {
        let value = serde_json::to_string(self).map_err(|e| HexAggError::IoError(e.to_string()))?;
        Ok(KeyValue::new(TABLE_METADATA_KEY.to_string(), value))
    }
}

/// Writes one record batch as a WKB-encoded GeoParquet file.
pub fn write_geoparquet(batch: &RecordBatch, path: impl AsRef<Path>) -> Result<(), HexAggError> {
    write_batch(batch, path.as_ref(), Vec::new())
}

fn write_batch(
    batch: &RecordBatch,
    path: &Path,
    metadata: Vec<KeyValue>,
) -> Result<(), HexAggError> {
    let options = GeoParquetWriterOptionsBuilder::default()
        .set_encoding(GeoParquetWriterEncoding::WKB)
        .build();
    let mut encoder = GeoParquetRecordBatchEncoder::try_new(&batch.schema(), &options)
        .map_err(|e| HexAggError::IoError(e.to_string()))?;

    // one row group per table; rows arrive sorted by cell id
    let properties = WriterProperties::builder()
        .set_max_row_group_size(batch.num_rows().max(1))
        .set_key_value_metadata((!metadata.is_empty()).then_some(metadata))
        .build();

    let file = File::create(path).map_err(|e| HexAggError::IoError(e.to_string()))?;
    let mut writer = ArrowWriter::try_new(file, encoder.target_schema(), Some(properties))
        .map_err(|e| HexAggError::IoError(e.to_string()))?;

    let encoded = encoder
        .encode_record_batch(batch)
        .map_err(|e| HexAggError::IoError(e.to_string()))?;
    writer
        .write(&encoded)
        .map_err(|e| HexAggError::IoError(e.to_string()))?;

    let geo_metadata = encoder
        .into_keyvalue()
        .map_err(|e| HexAggError::IoError(e.to_string()))?;
    writer.append_key_value_metadata(geo_metadata);
    writer
        .finish()
        .map_err(|e| HexAggError::IoError(e.to_string()))?;

    log::debug!("Wrote {} rows to {}", batch.num_rows(), path.display());
    Ok(())
}

/// GeoParquet export of a [`FeatureTable`].
///
/// Besides the `geo` entry, the file carries a `hexagg` metadata entry with
/// the grid resolution and the split between base and neighbour columns.
pub trait FeatureTableToGeoParquet: FeatureTableToArrow {
    fn to_geoparquet(&self, path: impl AsRef<Path>) -> Result<(), HexAggError>;
}

impl FeatureTableToGeoParquet for FeatureTable {
    fn to_geoparquet(&self, path: impl AsRef<Path>) -> Result<(), HexAggError> {
        let batch = self.to_record_batch()?;
        let metadata = TableMetadata::of(self).to_key_value()?;
        write_batch(&batch, path.as_ref(), vec![metadata])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Contribution;
    use crate::feature::GeoPoint;
    use crate::index::HexGrid;
    use crate::table::{add_neighbour_counts, assemble};
    use parquet::file::reader::{FileReader, SerializedFileReader};
    use tempfile::tempdir;

    fn io_err(e: impl ToString) -> HexAggError {
        HexAggError::IoError(e.to_string())
    }

    fn read_metadata(path: &Path) -> Result<(i64, Vec<KeyValue>), HexAggError> {
        let reader = SerializedFileReader::new(File::open(path).map_err(io_err)?).map_err(io_err)?;
        let file_metadata = reader.metadata().file_metadata();
        Ok((
            file_metadata.num_rows(),
            file_metadata.key_value_metadata().cloned().unwrap_or_default(),
        ))
    }

    #[test]
    fn test_table_to_geoparquet() -> Result<(), HexAggError> {
        let grid = HexGrid::new(9)?;
        let a = grid.cell_for(&GeoPoint::new(52.2297, 21.0122))?;
        let b = grid.cell_for(&GeoPoint::new(52.2400, 21.0300))?;
        let table = assemble([
            Contribution::new(a, "amenity", 2.0),
            Contribution::new(b, "area_building", 350.0),
        ]);
        let table = add_neighbour_counts(&table, &grid)?;

        let dir = tempdir().map_err(io_err)?;
        let path = dir.path().join("cells.parquet");

        table.to_geoparquet(&path)?;

        let (rows, kv) = read_metadata(&path)?;
        assert_eq!(rows, 2);
        assert!(kv.iter().any(|e| e.key == "geo"));

        let entry = kv
            .iter()
            .find(|e| e.key == TABLE_METADATA_KEY)
            .and_then(|e| e.value.clone())
            .ok_or_else(|| io_err("missing table metadata"))?;
        let json: serde_json::Value = serde_json::from_str(&entry).map_err(io_err)?;
        assert_eq!(json["resolution"], 9);
        assert_eq!(json["rows"], 2);
        assert_eq!(json["base_columns"], serde_json::json!(["amenity", "area_building"]));
        assert_eq!(
            json["neighbour_columns"],
            serde_json::json!(["amenity_neighbour_count", "area_building_neighbour_count"])
        );
        Ok(())
    }

    #[test]
    fn test_plain_batch_has_only_geo_metadata() -> Result<(), HexAggError> {
        let grid = HexGrid::new(9)?;
        let a = grid.cell_for(&GeoPoint::new(52.2297, 21.0122))?;
        let batch = assemble([Contribution::new(a, "amenity", 1.0)]).to_record_batch()?;

        let dir = tempdir().map_err(io_err)?;
        let path = dir.path().join("batch.parquet");
        write_geoparquet(&batch, &path)?;

        let (rows, kv) = read_metadata(&path)?;
        assert_eq!(rows, 1);
        assert!(kv.iter().any(|e| e.key == "geo"));
        assert!(kv.iter().all(|e| e.key != TABLE_METADATA_KEY));
        Ok(())
    }
}
