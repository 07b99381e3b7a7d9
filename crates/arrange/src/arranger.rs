//! First-fit arrangement over one or more bins.
//!
//! The arranger owns the part storage, the merged pile and both spatial
//! indices, and walks the movable parts in input order. Each part is handed
//! to the placer with an immutable snapshot of the current bin state; a
//! successful placement is committed incrementally (one index insert, one
//! pile union). When a part finds no fit the current bin is finalized and a
//! fresh one opened; a part that fails even in a fresh bin is recorded as
//! unplaceable and keeps its initial pose while the run continues
//! best-effort.
//!
//! Fixed parts are preloaded into bin 0 before the first placement: they
//! enter the pile and the big-item index only, and while they and the warm
//! start are seated the alignment mode flips to [`Alignment::DontAlign`]
//! with the objective on its overfit-tolerant preload wrapper. The main
//! loop then runs with the standard objective again; a bin whose pile is
//! pinned by fixed parts is never realigned.

use std::collections::VecDeque;

use log::{debug, warn};

use platen_core::{Aabb, Error, Point, Result};

use crate::bed::Bin;
use crate::config::{Alignment, ArrangeConfig};
use crate::item::Item;
use crate::nfp;
use crate::objective::{ObjectiveMode, PileView, BIG_ITEM_THRESHOLD};
use crate::placer;
use crate::result::{PackGroup, Placement};
use crate::spatial_index::SpatialIndex;

/// Progress callback: receives the number of parts still waiting.
pub type ProgressFn<'a> = &'a dyn Fn(usize);

/// Cooperative stop predicate, polled between parts and candidate batches.
pub type StopFn<'a> = &'a (dyn Fn() -> bool + Sync);

/// The arrangement engine.
pub struct Arranger {
    bin: Bin,
    config: ArrangeConfig,
    items: Vec<Item>,
    movable_count: usize,

    // State of the bin currently being packed.
    committed: Vec<usize>,
    merged_pile: Vec<Vec<Point>>,
    pile_bb: Option<Aabb>,
    big_index: SpatialIndex,
    all_index: SpatialIndex,
    mode: ObjectiveMode,
    nfp_scratch: Vec<Vec<Point>>,

    // Scalars fixed for the whole run.
    bin_area: f64,
    norm: f64,
    bin_center: Point,
}

impl Arranger {
    /// Creates an arranger over validated parts. `movable` parts are packed
    /// in input order; `fixed` parts seed bin 0 and never move.
    pub fn new(bin: Bin, config: ArrangeConfig, movable: Vec<Item>, fixed: Vec<Item>) -> Self {
        let movable_count = movable.len();
        let mut items = movable;
        items.extend(fixed);
        let bin_area = bin.area().max(1.0);
        let bin_center = bin.center();
        Self {
            bin,
            config,
            items,
            movable_count,
            committed: Vec::new(),
            merged_pile: Vec::new(),
            pile_bb: None,
            big_index: SpatialIndex::new(),
            all_index: SpatialIndex::new(),
            mode: ObjectiveMode::Standard,
            nfp_scratch: Vec::new(),
            bin_area,
            norm: bin_area.sqrt(),
            bin_center,
        }
    }

    /// Read access to the part storage (poses reflect the last run).
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Runs the arrangement.
    pub fn execute(
        &mut self,
        progress: Option<ProgressFn<'_>>,
        stop: Option<StopFn<'_>>,
    ) -> Result<PackGroup> {
        let stop = move || stop.is_some_and(|s| s());

        let mut bins: Vec<Vec<usize>> = vec![Vec::new()];
        let mut queue: VecDeque<usize> = (0..self.movable_count).collect();
        let mut unplaced: Vec<usize> = Vec::new();
        let mut cancelled = false;

        self.reset_bin_state();
        self.preload(&mut queue, &mut bins);

        while let Some(idx) = queue.pop_front() {
            if stop() {
                cancelled = true;
                break;
            }
            if let Some(progress) = progress {
                progress(queue.len());
            }

            let remaining_empty = queue.is_empty();
            let mut scratch = std::mem::take(&mut self.nfp_scratch);
            let placed = {
                let view = self.pile_view(remaining_empty);
                placer::find_placement(
                    &self.items[idx],
                    &self.committed,
                    &view,
                    &self.config,
                    &mut scratch,
                    &stop,
                )
            };
            self.nfp_scratch = scratch;

            match placed {
                Ok(Some(t)) => self.commit(idx, t, &mut bins),
                Ok(None) => {
                    if self.committed.is_empty() {
                        // Even an empty bin cannot hold this part.
                        warn!(
                            "part {} does not fit an empty bin, leaving it unplaced",
                            idx
                        );
                        unplaced.push(idx);
                    } else {
                        self.finalize_bin(bins.last().expect("at least one bin"));
                        debug!("bin {} full, opening bin {}", bins.len() - 1, bins.len());
                        bins.push(Vec::new());
                        self.reset_bin_state();
                        queue.push_front(idx);
                    }
                }
                Err(Error::Cancelled) => {
                    cancelled = true;
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        if !cancelled {
            self.finalize_bin(bins.last().expect("at least one bin"));
        }

        let placements = bins
            .iter()
            .map(|members| {
                members
                    .iter()
                    .map(|&idx| Placement {
                        index: idx,
                        translation: self.items[idx].translation(),
                        rotation: self.items[idx].rotation(),
                    })
                    .collect()
            })
            .collect();

        Ok(PackGroup {
            bins: placements,
            unplaced,
            cancelled,
        })
    }

    /// Seeds bin 0 with the fixed parts and warm-starts the first movable
    /// part at the bin center.
    fn preload(&mut self, queue: &mut VecDeque<usize>, bins: &mut Vec<Vec<usize>>) {
        let preloadable: Vec<usize> = (self.movable_count..self.items.len())
            .filter(|&idx| {
                let inside = self
                    .bin
                    .contains_shape(&self.items[idx].transformed_shape());
                if !inside {
                    warn!("fixed part {} lies outside the bin, ignoring it", idx);
                }
                inside
            })
            .collect();
        if preloadable.is_empty() {
            return;
        }

        // Overfit-tolerant objective and pinned alignment while the fixed
        // parts and the warm start are seated.
        let saved_mode = self.mode;
        let saved_alignment = self.config.alignment;
        self.mode = ObjectiveMode::FixedOverfit;
        self.config.alignment = Alignment::DontAlign;

        for &idx in &preloadable {
            self.items[idx].mark_fixed();
            let bb = self.items[idx].bounding_box();
            // Fixed parts enter the big-item index only: small parts still
            // cluster around them, while alignment stays driven by the
            // movable pile.
            self.big_index.insert(idx, bb);
            let shape = self.items[idx].transformed_shape();
            self.merged_pile = nfp::union_pile(&self.merged_pile, &shape);
            self.pile_bb = Some(match self.pile_bb {
                Some(p) => p.union(&bb),
                None => bb,
            });
            self.committed.push(idx);
        }

        // Warm start: the placer never seats a part at the center of a
        // preloaded bin, so try that one spot by hand for the first part.
        if let Some(&first) = queue.front() {
            let d = self.bin.bounding_box().center() - self.items[first].bounding_box().center();
            self.items[first].translate(d);
            if !self.big_index.intersects(&self.items[first].bounding_box()) {
                self.items[first].mark_fixed();
                let t = self.items[first].translation();
                self.commit(first, t, bins);
                queue.pop_front();
                debug!("warm start placed part {} at the bin center", first);
            } else {
                self.items[first].translate(-d);
            }
        }

        // The main loop runs with the standard objective again; bins
        // holding fixed parts stay exempt from alignment through the
        // pinned-pile check in `finalize_bin`.
        self.mode = saved_mode;
        self.config.alignment = saved_alignment;
    }

    fn commit(&mut self, idx: usize, t: Point, bins: &mut [Vec<usize>]) {
        let item = &mut self.items[idx];
        item.set_translation(t);
        let bb = item.bounding_box();
        let shape = item.transformed_shape();
        let big = item.area() / self.bin_area > BIG_ITEM_THRESHOLD;

        if self.items[idx].is_fixed() {
            // Warm-started part: indexed like a preloaded fixed part.
            self.big_index.insert(idx, bb);
        } else {
            self.all_index.insert(idx, bb);
            if big {
                self.big_index.insert(idx, bb);
            }
        }
        self.merged_pile = nfp::union_pile(&self.merged_pile, &shape);
        self.pile_bb = Some(match self.pile_bb {
            Some(p) => p.union(&bb),
            None => bb,
        });
        self.committed.push(idx);
        bins.last_mut().expect("at least one bin").push(idx);
        debug!("committed part {} at ({}, {})", idx, t.x, t.y);
    }

    /// Applies the CENTER alignment to a finished bin: the pile bounding box
    /// is translated onto the bin center. Skipped in `DontAlign` mode and
    /// for bins whose pile contains fixed parts, which must not move and
    /// would no longer be clear of the realigned movable parts.
    fn finalize_bin(&mut self, members: &[usize]) {
        if self.config.alignment != Alignment::Center || members.is_empty() {
            return;
        }
        if self.committed.iter().any(|&idx| self.items[idx].is_fixed()) {
            return;
        }
        let Some(pile_bb) = self.pile_bb else {
            return;
        };
        let d = self.bin_center - pile_bb.center();
        if d == Point::zero() {
            return;
        }
        for &idx in members {
            self.items[idx].translate(d);
        }
    }

    fn reset_bin_state(&mut self) {
        self.committed.clear();
        self.merged_pile.clear();
        self.pile_bb = None;
        self.big_index.clear();
        self.all_index.clear();
    }

    fn pile_view(&self, remaining_empty: bool) -> PileView<'_> {
        PileView {
            items: &self.items,
            merged_pile: &self.merged_pile,
            pile_bb: self.pile_bb,
            remaining_empty,
            big_index: &self.big_index,
            all_index: &self.all_index,
            bin: &self.bin,
            bin_area: self.bin_area,
            norm: self.norm,
            bin_center: self.bin_center,
            mode: self.mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: i64, at: Point) -> Item {
        Item::new(
            vec![
                Point::new(0, 0),
                Point::new(side, 0),
                Point::new(side, side),
                Point::new(0, side),
            ],
            at,
            0.0,
        )
        .unwrap()
    }

    fn rect_bin(side: i64) -> Bin {
        Bin::Rect(Aabb::new(Point::zero(), Point::new(side, side)))
    }

    #[test]
    fn test_empty_input_yields_empty_pack() {
        let mut arranger = Arranger::new(
            rect_bin(1000),
            ArrangeConfig::default(),
            Vec::new(),
            Vec::new(),
        );
        let pack = arranger.execute(None, None).unwrap();
        assert_eq!(pack.placed_count(), 0);
        assert!(pack.is_complete());
    }

    #[test]
    fn test_single_part_centered() {
        let mut arranger = Arranger::new(
            rect_bin(1000),
            ArrangeConfig::default(),
            vec![square(100, Point::zero())],
            Vec::new(),
        );
        let pack = arranger.execute(None, None).unwrap();
        assert_eq!(pack.bin_count(), 1);
        let (bin, p) = pack.find(0).unwrap();
        assert_eq!(bin, 0);
        let bb = arranger.items()[0].bounding_box();
        assert!((bb.center().x - 500).abs() <= 1, "{:?}", p);
        assert!((bb.center().y - 500).abs() <= 1, "{:?}", p);
    }

    #[test]
    fn test_no_fit_opens_second_bin() {
        // Two parts, each filling most of the bin: one bin each.
        let mut arranger = Arranger::new(
            rect_bin(100),
            ArrangeConfig::default(),
            vec![square(90, Point::zero()), square(90, Point::zero())],
            Vec::new(),
        );
        let pack = arranger.execute(None, None).unwrap();
        assert_eq!(pack.bin_count(), 2);
        assert!(pack.unplaced.is_empty());
        assert_eq!(pack.find(0).unwrap().0, 0);
        assert_eq!(pack.find(1).unwrap().0, 1);
    }

    #[test]
    fn test_oversized_part_is_reported_and_run_continues() {
        let mut arranger = Arranger::new(
            rect_bin(100),
            ArrangeConfig::default(),
            vec![square(200, Point::new(7, 8)), square(50, Point::zero())],
            Vec::new(),
        );
        let pack = arranger.execute(None, None).unwrap();
        assert_eq!(pack.unplaced, vec![0]);
        // The oversized part keeps its initial pose.
        assert_eq!(arranger.items()[0].translation(), Point::new(7, 8));
        // The small part is still placed.
        assert!(pack.find(1).is_some());
    }

    #[test]
    fn test_progress_counts_down() {
        use std::cell::RefCell;
        let seen = RefCell::new(Vec::new());
        let progress = |remaining: usize| seen.borrow_mut().push(remaining);
        let mut arranger = Arranger::new(
            rect_bin(1000),
            ArrangeConfig::default(),
            vec![
                square(100, Point::zero()),
                square(100, Point::zero()),
                square(100, Point::zero()),
            ],
            Vec::new(),
        );
        arranger.execute(Some(&progress), None).unwrap();
        let seen = seen.into_inner();
        assert_eq!(seen, vec![2, 1, 0]);
    }

    #[test]
    fn test_stop_cancels_run() {
        let stop = || true;
        let mut arranger = Arranger::new(
            rect_bin(1000),
            ArrangeConfig::default(),
            vec![square(100, Point::zero())],
            Vec::new(),
        );
        let pack = arranger.execute(None, Some(&stop)).unwrap();
        assert!(pack.cancelled);
        assert_eq!(pack.placed_count(), 0);
    }

    #[test]
    fn test_preload_keeps_fixed_part_and_packs_around() {
        let bin = rect_bin(1_000);
        // Fixed part dead center.
        let fixed = square(300, Point::new(350, 350));
        let movable = square(300, Point::new(350, 350));
        let mut arranger = Arranger::new(
            bin,
            ArrangeConfig::default(),
            vec![movable],
            vec![fixed],
        );
        let pack = arranger.execute(None, None).unwrap();
        assert!(pack.is_complete());

        // Fixed part never moved.
        assert_eq!(arranger.items()[1].translation(), Point::new(350, 350));
        assert!(arranger.items()[1].is_fixed());

        // The movable sits flush against it, bbox-disjoint interiors.
        let fixed_bb = arranger.items()[1].bounding_box();
        let movable_bb = arranger.items()[0].bounding_box();
        let dx = (movable_bb.center().x - fixed_bb.center().x).abs();
        let dy = (movable_bb.center().y - fixed_bb.center().y).abs();
        assert_eq!(dx.max(dy), 300, "movable at {:?}", movable_bb);
    }

    #[test]
    fn test_preload_spillover_bin_is_center_aligned() {
        // The fixed part blankets bin 0, so every movable spills into bin 1.
        let fixed = square(600, Point::new(200, 200));
        let mut arranger = Arranger::new(
            rect_bin(1000),
            ArrangeConfig::default(),
            vec![square(300, Point::zero()), square(300, Point::zero())],
            vec![fixed],
        );
        let pack = arranger.execute(None, None).unwrap();
        assert!(pack.is_complete());

        // The fixed part stays put in bin 0.
        assert_eq!(arranger.items()[2].translation(), Point::new(200, 200));
        assert!(arranger.items()[2].is_fixed());

        // Both movables land together in the second bin.
        assert_eq!(pack.bins.len(), 2);
        assert!(pack.bins[0].is_empty());
        assert_eq!(pack.find(0).unwrap().0, 1);
        assert_eq!(pack.find(1).unwrap().0, 1);

        // After the preload, the run is back on the standard objective, so
        // the spill bin is CENTER-aligned like any fixed-free bin.
        let a = arranger.items()[0].bounding_box();
        let b = arranger.items()[1].bounding_box();
        let pile = a.union(&b);
        assert!((pile.center().x - 500).abs() <= 1, "pile {:?}", pile);
        assert!((pile.center().y - 500).abs() <= 1, "pile {:?}", pile);

        // And the two movables still only touch.
        let dx = (a.center().x - b.center().x).abs();
        let dy = (a.center().y - b.center().y).abs();
        assert_eq!(dx.max(dy), 300);
    }

    #[test]
    fn test_fixed_part_outside_bin_is_ignored() {
        let fixed = square(100, Point::new(5_000, 5_000));
        let mut arranger = Arranger::new(
            rect_bin(1000),
            ArrangeConfig::default(),
            vec![square(100, Point::zero())],
            vec![fixed],
        );
        let pack = arranger.execute(None, None).unwrap();
        assert!(pack.is_complete());
        // With no preload the single part is centered normally.
        let bb = arranger.items()[0].bounding_box();
        assert!((bb.center().x - 500).abs() <= 1);
    }

    #[test]
    fn test_determinism() {
        let parts = || {
            vec![
                square(220, Point::zero()),
                square(220, Point::new(13, 5)),
                square(140, Point::new(-4, 9)),
                square(140, Point::zero()),
                square(60, Point::new(2, 2)),
            ]
        };
        let run = || {
            let mut arranger =
                Arranger::new(rect_bin(1000), ArrangeConfig::default(), parts(), Vec::new());
            let pack = arranger.execute(None, None).unwrap();
            let poses: Vec<(usize, Point)> = (0..5)
                .map(|i| (pack.find(i).unwrap().0, arranger.items()[i].translation()))
                .collect();
            poses
        };
        assert_eq!(run(), run());
    }
}
