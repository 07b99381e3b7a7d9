//! Polygon operations on scaled-integer rings.
//!
//! A *ring* is a `&[Point]` slice describing a simple polygon. Rings may be
//! stored closed (first vertex repeated at the end, the arranger's storage
//! convention) or open; every function here accepts both and treats them
//! identically. Functions returning rings return them open unless stated
//! otherwise.
//!
//! All area and orientation arithmetic is exact: products of two coordinates
//! are carried in `i128`.

use crate::bbox::Aabb;
use crate::error::{Error, Result};
use crate::point::{orient2d, Point};
use crate::MAX_COORD;

/// Strips the repeated closing vertex, if present.
#[inline]
pub fn open_ring(ring: &[Point]) -> &[Point] {
    match ring {
        [first, .., last] if first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}

/// Appends the closing vertex, if missing.
pub fn close_ring(mut ring: Vec<Point>) -> Vec<Point> {
    if let (Some(&first), Some(&last)) = (ring.first(), ring.last()) {
        if first != last {
            ring.push(first);
        }
    }
    ring
}

/// Twice the signed area (shoelace), exact in `i128`. Positive for
/// counter-clockwise rings.
pub fn signed_area_x2(ring: &[Point]) -> i128 {
    let ring = open_ring(ring);
    if ring.len() < 3 {
        return 0;
    }
    let mut acc: i128 = 0;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[(i + 1) % ring.len()];
        acc += a.cross(b);
    }
    acc
}

/// Twice the absolute area, exact in `i128`.
#[inline]
pub fn area_x2(ring: &[Point]) -> i128 {
    signed_area_x2(ring).abs()
}

/// Absolute area as `f64`.
#[inline]
pub fn area(ring: &[Point]) -> f64 {
    area_x2(ring) as f64 / 2.0
}

/// True when the ring winds counter-clockwise.
#[inline]
pub fn is_ccw(ring: &[Point]) -> bool {
    signed_area_x2(ring) > 0
}

/// Total boundary length.
pub fn perimeter(ring: &[Point]) -> f64 {
    let ring = open_ring(ring);
    if ring.len() < 2 {
        return 0.0;
    }
    let mut acc = 0.0;
    for i in 0..ring.len() {
        acc += ring[i].distance(ring[(i + 1) % ring.len()]);
    }
    acc
}

/// Bounding box of the ring. `None` when empty.
#[inline]
pub fn bounding_box(ring: &[Point]) -> Option<Aabb> {
    Aabb::from_points(ring)
}

/// Translates every vertex by `d`.
pub fn translate(ring: &[Point], d: Point) -> Vec<Point> {
    ring.iter().map(|&p| p + d).collect()
}

/// Rotates every vertex around the origin by `angle` radians, rounding back
/// to integer coordinates. Identity rotations return an exact copy.
pub fn rotate(ring: &[Point], angle: f64) -> Vec<Point> {
    if angle.abs() < 1e-12 {
        return ring.to_vec();
    }
    let (sin, cos) = angle.sin_cos();
    ring.iter()
        .map(|p| {
            let x = p.x as f64;
            let y = p.y as f64;
            Point::new(
                (x * cos - y * sin).round() as i64,
                (x * sin + y * cos).round() as i64,
            )
        })
        .collect()
}

/// Convex hull (Andrew's monotone chain). Returns an open counter-clockwise
/// ring without collinear vertices. Degenerate inputs (fewer than three
/// distinct points) are returned as-is.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pts: Vec<Point> = open_ring(points).to_vec();
    pts.sort_unstable();
    pts.dedup();
    let n = pts.len();
    if n < 3 {
        return pts;
    }

    let mut hull: Vec<Point> = Vec::with_capacity(2 * n);
    // Lower hull, then upper hull; strict right turns only.
    for &p in pts.iter() {
        while hull.len() >= 2 && orient2d(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && orient2d(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

/// True when the ring is convex (collinear vertices allowed).
pub fn is_convex(ring: &[Point]) -> bool {
    let ring = open_ring(ring);
    let n = ring.len();
    if n < 4 {
        return n == 3;
    }
    let mut sign = 0i32;
    for i in 0..n {
        let turn = orient2d(ring[i], ring[(i + 1) % n], ring[(i + 2) % n]);
        if turn != 0 {
            let s = if turn > 0 { 1 } else { -1 };
            if sign == 0 {
                sign = s;
            } else if sign != s {
                return false;
            }
        }
    }
    true
}

/// True when `p` lies exactly on the ring's boundary.
pub fn on_boundary(ring: &[Point], p: Point) -> bool {
    let ring = open_ring(ring);
    let n = ring.len();
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        if orient2d(a, b, p) == 0
            && p.x >= a.x.min(b.x)
            && p.x <= a.x.max(b.x)
            && p.y >= a.y.min(b.y)
            && p.y <= a.y.max(b.y)
        {
            return true;
        }
    }
    false
}

/// Point-in-polygon test (even-odd rule), inclusive of the boundary.
pub fn contains_point(ring: &[Point], p: Point) -> bool {
    let ring = open_ring(ring);
    if ring.len() < 3 {
        return false;
    }
    if on_boundary(ring, p) {
        return true;
    }
    let mut inside = false;
    let n = ring.len();
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        if (a.y > p.y) != (b.y > p.y) {
            let d = orient2d(a, b, p);
            if (b.y > a.y && d > 0) || (b.y < a.y && d < 0) {
                inside = !inside;
            }
        }
    }
    inside
}

/// Point-in-polygon test that excludes the boundary.
pub fn contains_point_strict(ring: &[Point], p: Point) -> bool {
    !on_boundary(open_ring(ring), p) && contains_point(ring, p)
}

/// Offsets the ring outward by `delta` (inward for negative values) using
/// miter joins. Orientation is preserved. Nearly parallel joins fall back to
/// a plain normal displacement so the miter cannot run away.
pub fn offset(ring: &[Point], delta: i64) -> Vec<Point> {
    let mut pts: Vec<Point> = open_ring(ring).to_vec();
    pts.dedup();
    if pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    let n = pts.len();
    if n < 3 || delta == 0 {
        return pts;
    }

    // Outward for a CCW ring is to the right of each directed edge.
    let sign = if is_ccw(&pts) { 1.0 } else { -1.0 };
    let d = delta as f64;

    let normal = |e: Point| -> (f64, f64) {
        let len = (e.length_sq() as f64).sqrt();
        (sign * e.y as f64 / len, sign * -e.x as f64 / len)
    };

    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let prev = pts[(i + n - 1) % n];
        let cur = pts[i];
        let next = pts[(i + 1) % n];
        let e_prev = cur - prev;
        let e_next = next - cur;

        let (nx1, ny1) = normal(e_prev);
        let (nx2, ny2) = normal(e_next);

        let cross = e_prev.x as f64 * e_next.y as f64 - e_prev.y as f64 * e_next.x as f64;
        let (vx, vy) = if cross.abs() < 1e-9 * (e_prev.length_sq() as f64).sqrt() {
            (cur.x as f64 + nx2 * d, cur.y as f64 + ny2 * d)
        } else {
            // Intersection of the two offset edge lines.
            let p1x = cur.x as f64 + nx1 * d;
            let p1y = cur.y as f64 + ny1 * d;
            let p2x = cur.x as f64 + nx2 * d;
            let p2y = cur.y as f64 + ny2 * d;
            let t = ((p2x - p1x) * e_next.y as f64 - (p2y - p1y) * e_next.x as f64) / cross;
            (p1x + t * e_prev.x as f64, p1y + t * e_prev.y as f64)
        };
        out.push(Point::new(vx.round() as i64, vy.round() as i64));
    }
    out
}

/// Validates a part contour: at least three distinct vertices, coordinates
/// within the supported range, non-zero area, and no properly intersecting
/// edge pair.
pub fn validate_simple(ring: &[Point]) -> Result<()> {
    let ring = open_ring(ring);
    if ring.len() < 3 {
        return Err(Error::InvalidGeometry(
            "contour must have at least 3 vertices".into(),
        ));
    }
    for p in ring {
        if p.x.abs() > MAX_COORD || p.y.abs() > MAX_COORD {
            return Err(Error::Overflow(format!(
                "coordinate ({}, {}) outside the supported range",
                p.x, p.y
            )));
        }
    }
    if signed_area_x2(ring) == 0 {
        return Err(Error::InvalidGeometry("contour has zero area".into()));
    }
    let n = ring.len();
    for i in 0..n {
        let a1 = ring[i];
        let a2 = ring[(i + 1) % n];
        for j in (i + 1)..n {
            // Skip the edge itself and its two neighbors.
            if j == i || (j + 1) % n == i || (i + 1) % n == j {
                continue;
            }
            let b1 = ring[j];
            let b2 = ring[(j + 1) % n];
            if segments_properly_intersect(a1, a2, b1, b2) {
                return Err(Error::InvalidGeometry(format!(
                    "self-intersecting contour (edges {} and {})",
                    i, j
                )));
            }
        }
    }
    Ok(())
}

/// Exact proper-intersection test: the open interiors of the two segments
/// cross.
pub fn segments_properly_intersect(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let d1 = orient2d(b1, b2, a1);
    let d2 = orient2d(b1, b2, a2);
    let d3 = orient2d(a1, a2, b1);
    let d4 = orient2d(a1, a2, b2);
    ((d1 > 0 && d2 < 0) || (d1 < 0 && d2 > 0)) && ((d3 > 0 && d4 < 0) || (d3 < 0 && d4 > 0))
}
