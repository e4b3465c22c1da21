//! Planar helpers used by the splitting productions.
//!
//! Corners are ordered by the angle they make around their centroid, which
//! is correct for convex and star-shaped polygons. Coincident corners are
//! not handled.

use crate::core::Point;

/// Midpoint of the segment `a`–`b`.
#[inline]
pub fn midpoint(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}

/// Arithmetic mean of a set of positions. Returns the origin for an empty set.
pub fn centroid<I>(positions: I) -> (f64, f64)
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let (mut sx, mut sy, mut n) = (0.0, 0.0, 0usize);
    for (x, y) in positions {
        sx += x;
        sy += y;
        n += 1;
    }
    if n == 0 {
        return (0.0, 0.0);
    }
    (sx / n as f64, sy / n as f64)
}

/// Sorts points counter-clockwise by `atan2` of their offset from the centroid.
///
/// The sequence starts at the point with the smallest angle in `(-π, π]`.
pub fn sort_counter_clockwise(points: &mut [&Point]) {
    let (cx, cy) = centroid(points.iter().map(|p| p.position()));
    points.sort_by(|a, b| {
        let angle_a = (a.y - cy).atan2(a.x - cx);
        let angle_b = (b.y - cy).atan2(b.x - cx);
        angle_a.total_cmp(&angle_b)
    });
}
