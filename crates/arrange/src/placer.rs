//! NFP-based placement search for a single part.
//!
//! The search space is the boundary of `IFP \ ⋃ NFP(Q, P)`: every
//! translation there keeps the part inside the bin while touching — but not
//! overlapping — the committed pile. Candidates are scored with the
//! objective evaluator against an immutable pile snapshot, so the sweep can
//! run data-parallel; the minimum is taken under the total order
//! `(score, x, y)` to keep results bit-identical across runs.

use rayon::prelude::*;

use platen_core::polygon;
use platen_core::{Error, Point, Result};

use crate::config::ArrangeConfig;
use crate::item::Item;
use crate::nfp;
use crate::objective::{self, PileView};

/// Candidates scored between two consecutive stop-predicate polls.
const CANDIDATE_BATCH: usize = 256;

/// Finds the best translation for `item` against the committed pile, or
/// `None` when the part does not fit anywhere in the bin.
///
/// `nfp_scratch` is the arranger-owned buffer the per-pair NFPs are
/// collected into; it is cleared on entry and reused across placements.
pub fn find_placement(
    item: &Item,
    committed: &[usize],
    view: &PileView<'_>,
    config: &ArrangeConfig,
    nfp_scratch: &mut Vec<Vec<Point>>,
    stop: &dyn Fn() -> bool,
) -> Result<Option<Point>> {
    let Some(ifp) = nfp::inner_fit(view.bin, item) else {
        return Ok(None);
    };

    if committed.is_empty() {
        // Empty layout: seat the part directly at the bin center, like the
        // CENTER starting-point rule.
        let t = view.bin_center - item.reference_bbox().center();
        if let Some(t) = clamp_into(&ifp, t) {
            return Ok(Some(t));
        }
    }

    nfp_scratch.clear();
    for &idx in committed {
        nfp::pair_nfp(&view.items[idx], item, nfp_scratch);
    }

    let feasible = nfp::feasible_region(&ifp, nfp_scratch);
    let mut candidates = nfp::sample_boundary(&feasible, config.accuracy);
    // The overlay rounds coordinates back to the integer grid; reject any
    // candidate that landed strictly inside a forbidden piece.
    candidates.retain(|&t| !nfp::collides(nfp_scratch, t));
    if candidates.is_empty() {
        return Ok(None);
    }

    let mut best: Option<(f64, Point)> = None;
    for batch in candidates.chunks(CANDIDATE_BATCH) {
        if stop() {
            return Err(Error::Cancelled);
        }
        let batch_best = if config.parallel {
            batch
                .par_iter()
                .map(|&t| (objective::score(view, item, t), t))
                .min_by(cmp_candidates)
        } else {
            batch
                .iter()
                .map(|&t| (objective::score(view, item, t), t))
                .min_by(cmp_candidates)
        };
        if let Some(candidate) = batch_best {
            best = match best {
                Some(current) => Some(std::cmp::min_by(current, candidate, cmp_candidates)),
                None => Some(candidate),
            };
        }
    }
    Ok(best.map(|(_, t)| t))
}

fn cmp_candidates(a: &(f64, Point), b: &(f64, Point)) -> std::cmp::Ordering {
    a.0.partial_cmp(&b.0)
        .unwrap_or(std::cmp::Ordering::Equal)
        .then_with(|| a.1.cmp(&b.1))
}

/// Clamps a translation into the inner-fit region: componentwise against
/// the region's bounding box, accepted only when the result is actually
/// inside one of the region rings.
fn clamp_into(ifp: &[Vec<Point>], t: Point) -> Option<Point> {
    for ring in ifp {
        if ring.len() == 1 {
            return Some(ring[0]);
        }
        let bb = polygon::bounding_box(ring)?;
        let clamped = Point::new(
            t.x.clamp(bb.min.x, bb.max.x),
            t.y.clamp(bb.min.y, bb.max.y),
        );
        if polygon::contains_point(ring, clamped) {
            return Some(clamped);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bed::Bin;
    use crate::objective::ObjectiveMode;
    use crate::spatial_index::SpatialIndex;
    use platen_core::Aabb;

    fn square_item(side: i64) -> Item {
        Item::new(
            vec![
                Point::new(0, 0),
                Point::new(side, 0),
                Point::new(side, side),
                Point::new(0, side),
            ],
            Point::zero(),
            0.0,
        )
        .unwrap()
    }

    struct Ctx {
        items: Vec<Item>,
        pile: Vec<Vec<Point>>,
        big: SpatialIndex,
        all: SpatialIndex,
        bin: Bin,
        committed: Vec<usize>,
    }

    impl Ctx {
        fn new(bin: Bin) -> Self {
            Self {
                items: Vec::new(),
                pile: Vec::new(),
                big: SpatialIndex::new(),
                all: SpatialIndex::new(),
                bin,
                committed: Vec::new(),
            }
        }

        fn commit(&mut self, mut item: Item, t: Point) {
            item.set_translation(t);
            let idx = self.items.len();
            let bb = item.bounding_box();
            self.big.insert(idx, bb);
            self.all.insert(idx, bb);
            self.pile = nfp::union_pile(&self.pile, &item.transformed_shape());
            self.items.push(item);
            self.committed.push(idx);
        }

        fn view(&self, remaining_empty: bool) -> PileView<'_> {
            let bin_area = self.bin.area();
            PileView {
                items: &self.items,
                merged_pile: &self.pile,
                pile_bb: self
                    .pile
                    .iter()
                    .filter_map(|r| polygon::bounding_box(r))
                    .reduce(|a, b| a.union(&b)),
                remaining_empty,
                big_index: &self.big,
                all_index: &self.all,
                bin: &self.bin,
                bin_area,
                norm: bin_area.sqrt(),
                bin_center: self.bin.center(),
                mode: ObjectiveMode::Standard,
            }
        }
    }

    fn never() -> bool {
        false
    }

    #[test]
    fn test_first_part_lands_at_bin_center() {
        let ctx = Ctx::new(Bin::Rect(Aabb::new(Point::zero(), Point::new(1000, 1000))));
        let item = square_item(100);
        let mut scratch = Vec::new();
        let t = find_placement(
            &item,
            &ctx.committed,
            &ctx.view(true),
            &ArrangeConfig::default(),
            &mut scratch,
            &never,
        )
        .unwrap()
        .unwrap();
        // The part's bbox center coincides with the bin center.
        let bb = item.reference_bbox().translate(t);
        assert!((bb.center().x - 500).abs() <= 1);
        assert!((bb.center().y - 500).abs() <= 1);
    }

    #[test]
    fn test_oversized_part_has_no_fit() {
        let ctx = Ctx::new(Bin::Rect(Aabb::new(Point::zero(), Point::new(100, 100))));
        let item = square_item(200);
        let mut scratch = Vec::new();
        let placed = find_placement(
            &item,
            &ctx.committed,
            &ctx.view(true),
            &ArrangeConfig::default(),
            &mut scratch,
            &never,
        )
        .unwrap();
        assert!(placed.is_none());
    }

    #[test]
    fn test_second_part_touches_without_overlap() {
        let mut ctx = Ctx::new(Bin::Rect(Aabb::new(Point::zero(), Point::new(1000, 1000))));
        ctx.commit(square_item(200), Point::new(400, 400));

        let item = square_item(200);
        let mut scratch = Vec::new();
        let t = find_placement(
            &item,
            &ctx.committed,
            &ctx.view(true),
            &ArrangeConfig::default(),
            &mut scratch,
            &never,
        )
        .unwrap()
        .unwrap();

        // Separated by exactly one side length along some axis: touching.
        let dx = (t.x - 400).abs();
        let dy = (t.y - 400).abs();
        assert_eq!(dx.max(dy), 200, "placement {:?} does not touch", t);
        // And no overlap of the two collision shapes.
        assert!(!nfp::collides(&scratch, t));
    }

    #[test]
    fn test_full_bin_reports_no_fit() {
        let mut ctx = Ctx::new(Bin::Rect(Aabb::new(Point::zero(), Point::new(100, 100))));
        ctx.commit(square_item(100), Point::new(0, 0));

        let item = square_item(80);
        let mut scratch = Vec::new();
        let placed = find_placement(
            &item,
            &ctx.committed,
            &ctx.view(true),
            &ArrangeConfig::default(),
            &mut scratch,
            &never,
        )
        .unwrap();
        assert!(placed.is_none());
    }

    #[test]
    fn test_stop_predicate_cancels_sweep() {
        let mut ctx = Ctx::new(Bin::Rect(Aabb::new(Point::zero(), Point::new(1000, 1000))));
        ctx.commit(square_item(200), Point::new(400, 400));

        let item = square_item(200);
        let mut scratch = Vec::new();
        let always = || true;
        let placed = find_placement(
            &item,
            &ctx.committed,
            &ctx.view(true),
            &ArrangeConfig::default(),
            &mut scratch,
            &always,
        );
        assert!(matches!(placed, Err(Error::Cancelled)));
    }
}
