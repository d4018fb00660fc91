/// Maximum H3 resolution
pub const MAX_RESOLUTION: u8 = 15;

/// Resolution used when the caller does not pick one (~0.1 km² cells)
pub const DEFAULT_RESOLUTION: u8 = 9;

/// Grid distance used for neighbour aggregation
pub const NEIGHBOUR_RING: u32 = 1;
