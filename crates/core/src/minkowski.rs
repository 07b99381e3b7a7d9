//! Convex Minkowski sums and No-Fit Polygons.
//!
//! The No-Fit Polygon NFP(A, B) of a stationary polygon A and an orbiting
//! polygon B is the set of *translations* `t` of B for which `B + t`
//! overlaps A; its boundary is the locus of touching-but-not-overlapping
//! translations. For convex A and B it equals the Minkowski sum `A ⊕ (−B)`
//! and is computed by the classic O(n+m) edge merge: the edge vectors of
//! both polygons are traversed in increasing angular order starting from the
//! bottom-most vertices.
//!
//! Angle comparison is exact: edges are ranked by octant and, within a
//! diagonal octant, by their [`Rational`] slope. Collinear edges from the
//! two polygons therefore merge into a single summed edge instead of
//! producing slivers.

use std::cmp::Ordering;

use crate::point::Point;
use crate::polygon::{is_ccw, open_ring, signed_area_x2};
use crate::rational::Rational;

/// Octant rank of a non-zero direction vector, increasing with the polar
/// angle from the positive X axis.
fn angle_rank(d: Point) -> u8 {
    match (d.x.signum(), d.y.signum()) {
        (1, 0) => 0,
        (1, 1) => 1,
        (0, 1) => 2,
        (-1, 1) => 3,
        (-1, 0) => 4,
        (-1, -1) => 5,
        (0, -1) => 6,
        (1, -1) => 7,
        _ => unreachable!("zero-length edge in convex polygon"),
    }
}

/// Exact comparison of two edge vectors by polar angle.
fn edge_angle_cmp(a: Point, b: Point) -> Ordering {
    let ra = angle_rank(a);
    let rb = angle_rank(b);
    ra.cmp(&rb).then_with(|| match ra {
        // Within an open quadrant the angle is monotone in the slope.
        1 | 3 | 5 | 7 => {
            Rational::new(a.y as i128, a.x as i128).cmp(&Rational::new(b.y as i128, b.x as i128))
        }
        _ => Ordering::Equal,
    })
}

/// Normalizes a convex ring for the edge merge: open, no duplicate
/// consecutive vertices, counter-clockwise, starting at the bottom-most
/// (then left-most) vertex.
fn normalize(ring: &[Point]) -> Vec<Point> {
    let mut pts: Vec<Point> = open_ring(ring).to_vec();
    pts.dedup();
    if pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    if pts.len() >= 3 && !is_ccw(&pts) && signed_area_x2(&pts) != 0 {
        pts.reverse();
    }
    if pts.len() > 1 {
        let start = (0..pts.len())
            .min_by_key(|&i| (pts[i].y, pts[i].x))
            .unwrap_or(0);
        pts.rotate_left(start);
    }
    pts
}

/// Minkowski sum of two convex polygons, O(n+m).
///
/// Accepts open or closed rings in either orientation; returns an open
/// counter-clockwise ring. A single-vertex operand degenerates to a
/// translation of the other.
pub fn minkowski_sum_convex(a: &[Point], b: &[Point]) -> Vec<Point> {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    if a.len() == 1 {
        return b.iter().map(|&p| p + a[0]).collect();
    }
    if b.len() == 1 {
        return a.iter().map(|&p| p + b[0]).collect();
    }

    let n = a.len();
    let m = b.len();
    let mut result = Vec::with_capacity(n + m);
    let mut p = a[0] + b[0];
    let mut i = 0;
    let mut j = 0;
    while i < n || j < m {
        result.push(p);
        let ea = (i < n).then(|| a[(i + 1) % n] - a[i]);
        let eb = (j < m).then(|| b[(j + 1) % m] - b[j]);
        let step = match (ea, eb) {
            (Some(ea), Some(eb)) => match edge_angle_cmp(ea, eb) {
                Ordering::Less => {
                    i += 1;
                    ea
                }
                Ordering::Greater => {
                    j += 1;
                    eb
                }
                // Parallel edges advance together and fuse into one edge.
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                    ea + eb
                }
            },
            (Some(ea), None) => {
                i += 1;
                ea
            }
            (None, Some(eb)) => {
                j += 1;
                eb
            }
            (None, None) => unreachable!(),
        };
        p += step;
    }
    result
}

/// No-Fit Polygon of two convex polygons: the translations of `orbiting`
/// whose interior would overlap `stationary`. Boundary translations touch
/// without overlapping.
pub fn nfp_convex(stationary: &[Point], orbiting: &[Point]) -> Vec<Point> {
    let negated: Vec<Point> = open_ring(orbiting).iter().map(|&p| -p).collect();
    minkowski_sum_convex(open_ring(stationary), &negated)
}
