use thiserror::Error;

/// Error type for hexagg-rs operations.
///
/// `InvalidGeometry` and `ProjectionError` describe a single bad feature and are
/// recovered by the pipeline. Every other variant aborts the call that raised it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HexAggError {
    /// Malformed ring or line (too few points, self-intersecting, non-finite).
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    /// A cell id outside the supported id space or at the wrong resolution.
    #[error("Invalid cell: {0}")]
    InvalidCell(String),
    /// The resolution is outside the valid range (0-15).
    #[error("Invalid resolution: {0}")]
    InvalidResolution(u8),
    /// Category whose column name is reserved for derived columns.
    #[error("Invalid category: {0}")]
    InvalidCategory(String),
    /// Coordinate projection failed or left the projected system's domain.
    #[error("Projection error: {0}")]
    ProjectionError(String),
    /// Run configuration is incomplete or inconsistent.
    #[error("Config error: {0}")]
    ConfigError(String),
    /// File I/O or serialization error.
    #[error("IO error: {0}")]
    IoError(String),
    /// CSV parsing or reading error.
    #[error("CSV error: {0}")]
    CsvError(String),
    /// Failed to parse geometry from string (GeoJSON or WKT).
    #[error("Geometry parse error: {0}")]
    GeometryParseError(String),
}

impl HexAggError {
    /// True for failures that only invalidate the feature being processed.
    pub fn is_feature_local(&self) -> bool {
        matches!(
            self,
            HexAggError::InvalidGeometry(_)
                | HexAggError::InvalidCategory(_)
                | HexAggError::ProjectionError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_local_classification() {
        assert!(HexAggError::InvalidGeometry("ring".into()).is_feature_local());
        assert!(HexAggError::ProjectionError("domain".into()).is_feature_local());
        assert!(HexAggError::InvalidCategory("shop_neighbour_count".into()).is_feature_local());
        assert!(!HexAggError::InvalidCell("0".into()).is_feature_local());
        assert!(!HexAggError::InvalidResolution(16).is_feature_local());
        assert!(!HexAggError::ConfigError("projection".into()).is_feature_local());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            HexAggError::InvalidResolution(20).to_string(),
            "Invalid resolution: 20"
        );
        assert_eq!(
            HexAggError::ProjectionError("out of range".into()).to_string(),
            "Projection error: out of range"
        );
    }
}
