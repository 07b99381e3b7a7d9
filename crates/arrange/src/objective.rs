//! Placement scoring.
//!
//! The evaluator is a pure function over an immutable [`PileView`] snapshot
//! captured once per placement step; lower scores are better. Three regimes
//! share the work:
//!
//! - **Big items** (area above [`BIG_ITEM_THRESHOLD`] of the bin, or any
//!   item while no big item has landed yet) balance distance to the pile's
//!   gravity center, pack density and alignment with an equally sized
//!   neighbor.
//! - The **last big item** ignores neighbors and minimizes the convex-hull
//!   circumference of the final pile.
//! - **Small items** cluster around the center of the big-item cloud.
//!
//! A bin-kind wrapper then penalizes candidates whose pile would outgrow the
//! bin; preload mode swaps in a milder penalty that tolerates overfit when
//! nothing better exists.

use platen_core::polygon::{self, open_ring};
use platen_core::{Aabb, Point};

use crate::bed::Bin;
use crate::item::Item;
use crate::spatial_index::SpatialIndex;

/// Area ratio separating big items from small ones.
pub const BIG_ITEM_THRESHOLD: f64 = 0.02;

/// Which overfit wrapper the score goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectiveMode {
    /// Hard quadratic penalty per bin kind.
    #[default]
    Standard,
    /// Preload mode: linear penalty on the bounding-box area exceeding the
    /// bin, tolerating overfit that fixed parts make unavoidable.
    FixedOverfit,
}

/// Immutable snapshot of the arranger state for one placement step.
#[derive(Clone, Copy)]
pub struct PileView<'a> {
    /// Part storage; spatial-index payloads index into this.
    pub items: &'a [Item],
    /// Union of the transformed shapes committed to the current bin.
    pub merged_pile: &'a [Vec<Point>],
    /// Bounding box of the merged pile.
    pub pile_bb: Option<Aabb>,
    /// Whether no further parts wait after the current one.
    pub remaining_empty: bool,
    /// Index over the big committed parts (and preloaded fixed parts).
    pub big_index: &'a SpatialIndex,
    /// Index over every committed movable part.
    pub all_index: &'a SpatialIndex,
    /// The bin being packed.
    pub bin: &'a Bin,
    /// Cached bin area.
    pub bin_area: f64,
    /// Normalization factor `sqrt(bin_area)`.
    pub norm: f64,
    /// Cached bin center.
    pub bin_center: Point,
    /// Active overfit wrapper.
    pub mode: ObjectiveMode,
}

impl<'a> PileView<'a> {
    #[inline]
    fn is_big(&self, area: f64) -> bool {
        area / self.bin_area > BIG_ITEM_THRESHOLD
    }

    #[inline]
    fn norm(&self, v: f64) -> f64 {
        v / self.norm
    }
}

/// Scores a candidate translation, including the bin overfit penalty.
pub fn score(view: &PileView<'_>, item: &Item, t: Point) -> f64 {
    let (raw, full_bb) = evaluate(view, item, t);
    match view.mode {
        ObjectiveMode::FixedOverfit => {
            let bin_bb = view.bin.bounding_box();
            let diff = (full_bb.union(&bin_bb).area() - bin_bb.area()) as f64;
            if diff > 0.0 {
                raw + diff
            } else {
                raw
            }
        }
        ObjectiveMode::Standard => match view.bin {
            Bin::Rect(bin_bb) => {
                let miss = rect_overfit(&full_bb, bin_bb);
                if miss > 0.0 {
                    raw + miss * miss
                } else {
                    raw
                }
            }
            Bin::Disc { center, radius } => {
                if view.is_big(item.area()) {
                    let hull = pile_hull_with(view, item, t);
                    let miss = hull
                        .iter()
                        .map(|&p| center.distance(p))
                        .fold(0.0_f64, f64::max)
                        - *radius as f64;
                    if miss > 0.0 {
                        raw + miss * miss
                    } else {
                        raw
                    }
                } else {
                    raw
                }
            }
            // Polygonal and infinite bins confine candidates through the
            // inner-fit region alone.
            Bin::Polygon(_) | Bin::Infinite { .. } => raw,
        },
    }
}

/// The area by which the pile bounding box exceeds the bin; zero when it
/// fits.
fn rect_overfit(bb: &Aabb, bin_bb: &Aabb) -> f64 {
    (bb.union(bin_bb).area() - bin_bb.area()).max(0) as f64
}

/// The raw three-regime objective. Returns the score and the bounding box
/// of the pile with the candidate included.
pub fn evaluate(view: &PileView<'_>, item: &Item, t: Point) -> (f64, Aabb) {
    let ibb = item.reference_bbox().translate(t);
    let full_bb = view.pile_bb.map_or(ibb, |p| p.union(&ibb));

    let big = view.is_big(item.area()) || view.big_index.is_empty();
    let score = if big && !view.remaining_empty {
        big_item_score(view, item, ibb, full_bb)
    } else if big {
        last_big_item_score(view, item, t, full_bb)
    } else {
        small_item_score(view, ibb, full_bb)
    };
    (score, full_bb)
}

fn big_item_score(view: &PileView<'_>, item: &Item, ibb: Aabb, full_bb: Aabb) -> f64 {
    // Distance of the nearest of five anchor points to the pile's gravity
    // center; corner seating beats centroid seating for big parts.
    let cc = full_bb.center();
    let corners = ibb.corners();
    let mut dist = cc.distance(ibb.center());
    for anchor in corners {
        dist = dist.min(cc.distance(anchor));
    }
    let mut dist = view.norm(dist);
    let bindist = view.norm(ibb.center().distance(view.bin_center));
    dist = 0.8 * dist + 0.2 * bindist;

    // Alignment with the best equally sized neighbor: the smaller the union
    // bounding box, the flusher the fit. Can go negative for overlapping
    // boxes, which acts as a reward.
    let index = if view.is_big(item.area()) {
        view.big_index
    } else {
        view.all_index
    };
    let neighbors = index.query(&ibb);
    let mut alignment: f64 = 1.0;
    for entry in &neighbors {
        let other = &view.items[entry.index];
        let other_area = other.area();
        if (1.0 - other_area / item.area()).abs() < 1e-6 {
            let bb = entry.bbox.union(&ibb);
            let ascore = 1.0 - (item.area() + other_area) / bb.area() as f64;
            if ascore < alignment {
                alignment = ascore;
            }
        }
    }

    let density =
        (view.norm(full_bb.width() as f64) * view.norm(full_bb.height() as f64)).sqrt();

    if neighbors.is_empty() {
        0.5 * dist + 0.5 * density
    } else {
        0.40 * dist + 0.40 * density + 0.20 * alignment
    }
}

fn last_big_item_score(view: &PileView<'_>, item: &Item, t: Point, full_bb: Aabb) -> f64 {
    let hull = pile_hull_with(view, item, t);
    let circ = view.norm(polygon::perimeter(&hull));
    let bcirc = 2.0 * view.norm((full_bb.width() + full_bb.height()) as f64);
    0.5 * circ + 0.5 * bcirc
}

fn small_item_score(view: &PileView<'_>, ibb: Aabb, full_bb: Aabb) -> f64 {
    let big_bb = view.big_index.bounds().unwrap_or(full_bb);
    view.norm(ibb.center().distance(big_bb.center()))
}

/// Convex hull of the merged pile with the candidate's transformed shape
/// appended.
fn pile_hull_with(view: &PileView<'_>, item: &Item, t: Point) -> Vec<Point> {
    let mut points: Vec<Point> = view
        .merged_pile
        .iter()
        .flat_map(|ring| open_ring(ring).iter().copied())
        .collect();
    points.extend(item.reference_shape().iter().map(|&p| p + t));
    polygon::convex_hull(&points)
}
