//! Rejection of malformed feature geometry before it reaches the clipper.
//!
//! A feature that fails here is skipped by the pipeline and counted as a
//! diagnostic; it never aborts the batch.

use crate::error::HexAggError;
use crate::feature::{GeoPoint, open_ring};
use geo::line_intersection::{LineIntersection, line_intersection};
use geo_types::{Coord, Line};

/// Checks a line has at least two finite, in-range points.
pub fn validate_line(line: &[GeoPoint]) -> Result<(), HexAggError> {
    if line.len() < 2 {
        return Err(HexAggError::InvalidGeometry(format!(
            "Line has {} points, at least 2 are required",
            line.len()
        )));
    }
    check_coordinates(line, "line")
}

/// Checks a polygon ring: finite in-range coordinates, at least 3 distinct points, no
/// crossing edges. The closing vertex may be repeated or implicit.
pub fn validate_ring(ring: &[GeoPoint]) -> Result<(), HexAggError> {
    let ring = open_ring(ring);
    check_coordinates(ring, "ring")?;

    let distinct = distinct_count(ring);
    if distinct < 3 {
        return Err(HexAggError::InvalidGeometry(format!(
            "Ring has {} distinct points, at least 3 are required",
            distinct
        )));
    }

    if has_self_intersection(ring) {
        return Err(HexAggError::InvalidGeometry(
            "Ring has a self-intersection".to_string(),
        ));
    }
    Ok(())
}

fn check_coordinates(points: &[GeoPoint], name: &str) -> Result<(), HexAggError> {
    if let Some(idx) = points.iter().position(|p| !p.is_finite()) {
        return Err(HexAggError::InvalidGeometry(format!(
            "{} has a non-finite coordinate at index {}",
            name, idx
        )));
    }
    if let Some(idx) = points.iter().position(|p| !p.in_range()) {
        return Err(HexAggError::InvalidGeometry(format!(
            "{} has a coordinate outside the WGS84 range at index {}",
            name, idx
        )));
    }
    Ok(())
}

fn distinct_count(points: &[GeoPoint]) -> usize {
    let mut seen: Vec<GeoPoint> = Vec::with_capacity(points.len());
    for p in points {
        if !seen.contains(p) {
            seen.push(*p);
        }
    }
    seen.len()
}

// Tests each pair of non-adjacent edges of the implicitly closed ring. Edges
// meeting only at shared vertices are touches, not crossings.
fn has_self_intersection(ring: &[GeoPoint]) -> bool {
    let n = ring.len();
    if n < 4 {
        return false;
    }

    let edges: Vec<Line<f64>> = (0..n)
        .map(|i| Line::new(Coord::from(ring[i]), Coord::from(ring[(i + 1) % n])))
        .collect();

    for i in 0..n {
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let (a, b) = (edges[i], edges[j]);
            match line_intersection(a, b) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    let at_a = intersection == a.start || intersection == a.end;
                    let at_b = intersection == b.start || intersection == b.end;
                    if !(at_a && at_b) {
                        return true;
                    }
                }
                Some(LineIntersection::Collinear { .. }) => return true,
                None => {}
            }
        }
    }
    false
}
