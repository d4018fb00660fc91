pub mod constants;
mod grid;

pub use constants::{DEFAULT_RESOLUTION, MAX_RESOLUTION, NEIGHBOUR_RING};
pub use grid::HexGrid;
