//! No-Fit and Inner-Fit regions in translation space.
//!
//! Everything here works in the *translation space* of the part being
//! placed: a candidate is a translation `t` applied to the part's reference
//! shape. The forbidden region is the union of per-pair NFPs against the
//! already committed parts; the inner-fit region restricts `t` so the part
//! stays inside the bin. The feasible set is their difference, and its
//! boundary supplies the candidate positions.
//!
//! Convex pairs use the exact integer edge merge from `platen_core`. A
//! non-convex operand is decomposed by ear clipping into triangles and the
//! pairwise convex NFPs are kept as separate pieces; the merged forbidden
//! region unions them anyway. This decomposition path is experimental.
//!
//! Boolean operations run through `i_overlay` on `f64` coordinates, which
//! represent every in-range scaled integer exactly.

use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;

use platen_core::minkowski::nfp_convex;
use platen_core::point::orient2d;
use platen_core::polygon::{self, open_ring};
use platen_core::{Aabb, Point};

use crate::bed::Bin;
use crate::item::Item;

/// Appends the NFP pieces of one placed part against the part being placed.
///
/// Each piece is a convex ring; a candidate translation collides with
/// `stationary` exactly when it lies strictly inside one of the pieces.
pub fn pair_nfp(stationary: &Item, orbiting: &Item, out: &mut Vec<Vec<Point>>) {
    let stat = stationary.transformed_shape();
    let orb = orbiting.reference_shape();

    if stationary.is_convex() && orbiting.is_convex() {
        out.push(nfp_convex(&stat, orb));
        return;
    }

    let stat_parts = decompose(&stat);
    let orb_parts = decompose(orb);
    for s in &stat_parts {
        for o in &orb_parts {
            out.push(nfp_convex(s, o));
        }
    }
}

/// Splits a simple ring into convex pieces (the ring itself when already
/// convex, ear-clipping triangles otherwise). Falls back to the convex hull
/// when clipping cannot make progress.
fn decompose(ring: &[Point]) -> Vec<Vec<Point>> {
    let mut pts: Vec<Point> = open_ring(ring).to_vec();
    pts.dedup();
    if pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    if pts.len() < 3 {
        return vec![pts];
    }
    if polygon::is_convex(&pts) {
        return vec![pts];
    }
    if !polygon::is_ccw(&pts) {
        pts.reverse();
    }

    let mut triangles = Vec::with_capacity(pts.len() - 2);
    while pts.len() > 3 {
        let n = pts.len();
        let mut clipped = false;
        for i in 0..n {
            let prev = pts[(i + n - 1) % n];
            let cur = pts[i];
            let next = pts[(i + 1) % n];
            if orient2d(prev, cur, next) <= 0 {
                continue;
            }
            let blocked = pts.iter().enumerate().any(|(j, &p)| {
                j != (i + n - 1) % n
                    && j != i
                    && j != (i + 1) % n
                    && point_in_triangle(prev, cur, next, p)
            });
            if !blocked {
                triangles.push(vec![prev, cur, next]);
                pts.remove(i);
                clipped = true;
                break;
            }
        }
        if !clipped {
            // Degenerate input; a conservative hull never lets parts overlap.
            triangles.push(polygon::convex_hull(&pts));
            return triangles;
        }
    }
    triangles.push(pts);
    triangles
}

/// Inclusive point-in-triangle test for a CCW triangle.
fn point_in_triangle(a: Point, b: Point, c: Point, p: Point) -> bool {
    orient2d(a, b, p) >= 0 && orient2d(b, c, p) >= 0 && orient2d(c, a, p) >= 0
}

/// The inner-fit region of a part in a bin: all translations keeping the
/// part inside. `None` when the part cannot fit at any translation.
pub fn inner_fit(bin: &Bin, item: &Item) -> Option<Vec<Vec<Point>>> {
    let bb = item.reference_bbox();
    match bin {
        Bin::Rect(bin_bb) => {
            let min = bin_bb.min - bb.min;
            let max = bin_bb.max - bb.max;
            if max.x < min.x || max.y < min.y {
                return None;
            }
            Some(vec![vec![
                Point::new(min.x, min.y),
                Point::new(max.x, min.y),
                Point::new(max.x, max.y),
                Point::new(min.x, max.y),
            ]])
        }
        Bin::Disc { center, radius } => {
            let anchor = bb.center();
            let reach = item
                .reference_shape()
                .iter()
                .map(|&p| anchor.distance(p))
                .fold(0.0_f64, f64::max);
            let inner = *radius - reach.ceil() as i64;
            if inner < 0 {
                return None;
            }
            let c = *center - anchor;
            if inner == 0 {
                return Some(vec![vec![c]]);
            }
            let ring = (0..64)
                .map(|i| {
                    let a = i as f64 / 64.0 * std::f64::consts::TAU;
                    Point::new(
                        c.x + (inner as f64 * a.cos()).round() as i64,
                        c.y + (inner as f64 * a.sin()).round() as i64,
                    )
                })
                .collect();
            Some(vec![ring])
        }
        Bin::Polygon(bin_ring) => erode(bin_ring, item.reference_shape()),
        Bin::Infinite { center } => {
            let bb = Aabb::new(
                Point::new(
                    center.x - crate::bed::INFINITE_HALF_EXTENT,
                    center.y - crate::bed::INFINITE_HALF_EXTENT,
                ),
                Point::new(
                    center.x + crate::bed::INFINITE_HALF_EXTENT,
                    center.y + crate::bed::INFINITE_HALF_EXTENT,
                ),
            );
            Some(vec![bb.corners().to_vec()])
        }
    }
}

/// Minkowski erosion of a polygonal bin by the part shape: the intersection
/// of the bin translated by every negated shape vertex.
fn erode(bin_ring: &[Point], shape: &[Point]) -> Option<Vec<Vec<Point>>> {
    let shape = open_ring(shape);
    let first = *shape.first()?;
    let mut acc = vec![polygon::translate(open_ring(bin_ring), -first)];
    for &v in &shape[1..] {
        let translated = vec![polygon::translate(open_ring(bin_ring), -v)];
        acc = overlay(&acc, &translated, OverlayRule::Intersect);
        if acc.is_empty() {
            return None;
        }
    }
    Some(acc)
}

/// Boundary of `IFP \ ⋃ NFP`: the feasible candidate rings.
pub fn feasible_region(ifp: &[Vec<Point>], nfp_pieces: &[Vec<Point>]) -> Vec<Vec<Point>> {
    if nfp_pieces.is_empty() {
        return ifp.to_vec();
    }
    overlay(ifp, nfp_pieces, OverlayRule::Difference)
}

/// Unions a transformed part shape into the merged pile.
pub fn union_pile(pile: &[Vec<Point>], shape: &[Point]) -> Vec<Vec<Point>> {
    if pile.is_empty() {
        return vec![open_ring(shape).to_vec()];
    }
    let shapes = vec![open_ring(shape).to_vec()];
    let merged = overlay(pile, &shapes, OverlayRule::Union);
    if merged.is_empty() {
        // The overlay degenerated; fall back to keeping both operands.
        let mut out = pile.to_vec();
        out.push(open_ring(shape).to_vec());
        out
    } else {
        merged
    }
}

/// Runs one boolean operation through `i_overlay`, returning every contour
/// (outer rings and hole rings alike) rounded back to integer coordinates.
fn overlay(subject: &[Vec<Point>], clip: &[Vec<Point>], rule: OverlayRule) -> Vec<Vec<Point>> {
    let subj: Vec<Vec<[f64; 2]>> = subject.iter().map(|r| to_overlay(r)).collect();
    let clips: Vec<Vec<[f64; 2]>> = clip.iter().map(|r| to_overlay(r)).collect();
    let shapes = subj.overlay(&clips, rule, FillRule::NonZero);

    let mut out = Vec::new();
    for shape in shapes {
        for contour in shape {
            if contour.len() >= 3 {
                out.push(
                    contour
                        .into_iter()
                        .map(|[x, y]| Point::new(x.round() as i64, y.round() as i64))
                        .collect(),
                );
            }
        }
    }
    out
}

/// Converts a ring to `i_overlay` coordinates with a consistent CCW
/// winding, so the non-zero fill rule sees every operand positively.
fn to_overlay(ring: &[Point]) -> Vec<[f64; 2]> {
    let ring = open_ring(ring);
    let to = |p: &Point| [p.x as f64, p.y as f64];
    if ring.len() >= 3 && !polygon::is_ccw(ring) {
        ring.iter().rev().map(to).collect()
    } else {
        ring.iter().map(to).collect()
    }
}

/// Subsamples candidate translations from region boundaries.
///
/// Keeps roughly `accuracy * n` evenly strided vertices per ring (at least
/// three where the ring has them) and sprinkles interior points along each
/// retained edge, so flush mid-edge contacts are reachable. The result is
/// deduplicated and sorted for a deterministic sweep order.
pub fn sample_boundary(rings: &[Vec<Point>], accuracy: f64) -> Vec<Point> {
    let edge_samples = (accuracy * 4.0) as usize;
    let mut out = Vec::new();
    for ring in rings {
        let ring = open_ring(ring);
        let n = ring.len();
        if n == 0 {
            continue;
        }
        let keep = ((n as f64 * accuracy).ceil() as usize).clamp(n.min(3).max(1), n);
        for i in 0..keep {
            let idx = i * n / keep;
            let a = ring[idx];
            out.push(a);
            let b = ring[(idx + 1) % n];
            for s in 1..=edge_samples {
                let f = s as f64 / (edge_samples + 1) as f64;
                out.push(Point::new(
                    (a.x as f64 + (b.x - a.x) as f64 * f).round() as i64,
                    (a.y as f64 + (b.y - a.y) as f64 * f).round() as i64,
                ));
            }
        }
    }
    out.sort_unstable();
    out.dedup();
    out
}

/// True when the translation would make the part overlap the piece's
/// stationary polygon (boundary contact is allowed).
pub fn collides(nfp_pieces: &[Vec<Point>], t: Point) -> bool {
    nfp_pieces
        .iter()
        .any(|piece| polygon::contains_point_strict(piece, t))
}
