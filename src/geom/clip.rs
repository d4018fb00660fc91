//! Planar intersection measures used by the attributors.
//!
//! Inputs are already projected. Degenerate operands (no area, too few
//! distinct vertices) produce `0.0` rather than an error.

use geo::{Area, BooleanOps, BoundingRect, Intersects};
use geo_types::{LineString, MultiLineString, Polygon};

/// Area of the intersection of two planar polygons, in squared CRS units.
pub fn area_of_intersection(a: &Polygon<f64>, b: &Polygon<f64>) -> f64 {
    if is_degenerate(a) || is_degenerate(b) {
        log::trace!("Skipping intersection with a degenerate polygon");
        return 0.0;
    }
    if !bounds_overlap(a, b) {
        return 0.0;
    }

    let area = a.intersection(b).unsigned_area();
    if area.is_finite() { area } else { 0.0 }
}

/// Length of the part of `line` inside `polygon`, in CRS units.
pub fn length_of_intersection(polygon: &Polygon<f64>, line: &LineString<f64>) -> f64 {
    if is_degenerate(polygon) || line.0.len() < 2 {
        return 0.0;
    }

    let clipped = polygon.clip(&MultiLineString::new(vec![line.clone()]), false);
    let length: f64 = clipped.0.iter().map(planar_length).sum();
    if length.is_finite() { length } else { 0.0 }
}

/// Euclidean length of a planar line string.
pub fn planar_length(line: &LineString<f64>) -> f64 {
    line.lines().map(|l| l.dx().hypot(l.dy())).sum()
}

fn is_degenerate(polygon: &Polygon<f64>) -> bool {
    let mut distinct = 0;
    let mut last = None;
    for c in polygon.exterior().coords() {
        if last != Some(*c) {
            distinct += 1;
            last = Some(*c);
        }
    }
    distinct < 3 || polygon.unsigned_area() == 0.0
}

fn bounds_overlap(a: &Polygon<f64>, b: &Polygon<f64>) -> bool {
    match (a.bounding_rect(), b.bounding_rect()) {
        (Some(ra), Some(rb)) => ra.intersects(&rb),
        _ => false,
    }
}
