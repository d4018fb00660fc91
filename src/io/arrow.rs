use crate::error::HexAggError;
use crate::table::FeatureTable;
use arrow_array::{ArrayRef, Float64Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use geoarrow_array::IntoArrow;
use geoarrow_array::array::PolygonArray;
use geoarrow_array::builder::PolygonBuilder;
use geoarrow_schema::{Crs, Dimension, Metadata, PolygonType};
use rayon::prelude::*;
use std::sync::Arc;

fn wgs84_metadata() -> Arc<Metadata> {
    let crs = Crs::from_authority_code("EPSG:4326".to_string());
    Arc::new(Metadata::new(crs, None))
}

/// Conversion of a [`FeatureTable`] to Arrow.
///
/// Rows follow [`FeatureTable::sorted_cells`] in every method, so the polygon
/// array lines up with the record batch.
pub trait FeatureTableToArrow {
    /// Cell hexagons (WGS84) as a GeoArrow PolygonArray.
    fn to_arrow_polygons(&self) -> PolygonArray;
    /// `hex_id`, one Float64 column per table column, and `geometry`.
    fn to_record_batch(&self) -> Result<RecordBatch, HexAggError>;
}

impl FeatureTableToArrow for FeatureTable {
    fn to_arrow_polygons(&self) -> PolygonArray {
        let poly = PolygonType::new(Dimension::XY, wgs84_metadata());
        let polygons: Vec<_> = self
            .sorted_cells()
            .par_iter()
            .map(|cell| cell.boundary().to_polygon())
            .collect();
        PolygonBuilder::from_polygons(&polygons, poly).finish()
    }

    fn to_record_batch(&self) -> Result<RecordBatch, HexAggError> {
        let cells = self.sorted_cells();
        let polygon_array = self.to_arrow_polygons();

        let ids: StringArray = cells.iter().map(|c| Some(c.to_string())).collect();

        let mut fields = vec![Field::new("hex_id", DataType::Utf8, false)];
        let mut arrays: Vec<ArrayRef> = vec![Arc::new(ids)];

        for (i, column) in self.columns().iter().enumerate() {
            let values: Float64Array = cells
                .iter()
                .map(|c| self.row(c).map(|row| row[i]))
                .collect();
            fields.push(Field::new(column, DataType::Float64, false));
            arrays.push(Arc::new(values));
        }

        fields.push(polygon_array.extension_type().to_field("geometry", false));
        arrays.push(Arc::new(polygon_array.into_arrow()));

        RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
            .map_err(|e| HexAggError::IoError(e.to_string()))
    }
}
