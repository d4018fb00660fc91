pub mod clip;
pub mod hull;
pub mod parse;
pub mod validate;

pub use clip::{area_of_intersection, length_of_intersection};
pub use hull::{cells_to_polygon, polygon_ring};
pub use parse::{parse_geojson, parse_geometry, parse_wkt};
pub use validate::{validate_line, validate_ring};
