//! # Platen Arrange
//!
//! NFP-based 2D bin-packing of heterogeneous polygonal parts onto a print
//! bed.
//!
//! Given movable parts, optional already-fixed parts, a bed description and
//! a minimum part-to-part clearance, the arranger computes for every
//! movable part a final translation, rotation and bin index such that no
//! two parts overlap, every part stays inside its bin, and an objective
//! balancing pack density, proximity to the bed center and neighbor
//! alignment is minimized. Parts that do not fit the first bin spill into
//! further bins, laid out side by side on the host's X axis.
//!
//! All coordinates are scaled integers (1 mm = 10⁶ units, see
//! [`platen_core`]).
//!
//! ## Quick start
//!
//! ```rust
//! use platen_arrange::{arrange, Arrangeable, BedShape, Point};
//! use platen_core::{scaled, Aabb};
//!
//! struct Part {
//!     contour: Vec<Point>,
//!     result: Option<((f64, f64), f64)>,
//! }
//!
//! impl Arrangeable for Part {
//!     fn get_arrange_polygon(&self) -> (Vec<Point>, Point, f64) {
//!         (self.contour.clone(), Point::zero(), 0.0)
//!     }
//!
//!     fn apply_arrange_result(&mut self, translation: (f64, f64), rotation: f64) {
//!         self.result = Some((translation, rotation));
//!     }
//! }
//!
//! let square = vec![
//!     Point::new(0, 0),
//!     Point::new(scaled(20.0), 0),
//!     Point::new(scaled(20.0), scaled(20.0)),
//!     Point::new(0, scaled(20.0)),
//! ];
//! let mut part = Part { contour: square, result: None };
//!
//! let bed = BedShape::Box {
//!     bbox: Aabb::new(Point::zero(), Point::new(scaled(200.0), scaled(200.0))),
//! };
//!
//! let mut handles: Vec<&mut dyn Arrangeable> = vec![&mut part];
//! let ok = arrange(&mut handles, &[], scaled(6.0), &bed, None, None);
//! assert!(ok);
//! // The single part is seated at the bed center, reported in millimetres.
//! let ((x, y), _rot) = part.result.unwrap();
//! assert!((x - 90.0).abs() < 0.01 && (y - 90.0).abs() < 0.01);
//! ```

pub mod arranger;
pub mod bed;
pub mod config;
pub mod item;
pub mod nfp;
pub mod objective;
pub mod placer;
pub mod result;
pub mod spatial_index;

use log::warn;

use platen_core::{unscaled, SCALED_EPSILON};

// Re-exports
pub use arranger::Arranger;
pub use bed::{bed_shape, BedShape, Bin};
pub use config::{Alignment, ArrangeConfig};
pub use item::Item;
pub use platen_core::{Aabb, Error, Point, Result};
pub use result::{PackGroup, Placement};
pub use spatial_index::{SpatialEntry, SpatialIndex};

/// A host part taking part in an arrangement.
///
/// The host supplies the outline and initial pose, and receives the final
/// pose exactly once per arrange call. Fixed handles only supply their
/// outline; they are never moved and receive no result.
pub trait Arrangeable {
    /// Returns the part outline in scaled units together with its initial
    /// translation and rotation. Counter-clockwise outlines are accepted
    /// and reversed internally.
    fn get_arrange_polygon(&self) -> (Vec<Point>, Point, f64);

    /// Receives the final pose. The translation is in **millimetres** and
    /// includes the bin-stride X offset placing extra bins side by side.
    fn apply_arrange_result(&mut self, translation: (f64, f64), rotation: f64);
}

/// Halves the minimum object distance into the per-part inflation, rounding
/// the margin up so two inflated parts keep the full clearance.
fn half_clearance(min_obj_distance: i64) -> i64 {
    let md = min_obj_distance - SCALED_EPSILON;
    if md > 0 {
        (md + 1) / 2
    } else {
        0
    }
}

/// Arranges `movable` parts around `fixed` ones on the bed described by
/// `bed`, keeping at least `min_obj_distance` between any two parts.
///
/// Every movable handle's [`Arrangeable::apply_arrange_result`] is invoked
/// exactly once: placed parts receive their final pose (with the bin-stride
/// X offset), parts that fit nowhere keep their initial pose. Returns
/// `false` when the run was cancelled, a part was rejected as degenerate,
/// or a part could not be placed; `true` otherwise.
///
/// `progress` receives the number of parts still waiting; `stop` is polled
/// between parts and between candidate batches and cancels the run
/// cooperatively. Callbacks already applied at that point stay applied.
pub fn arrange(
    movable: &mut [&mut dyn Arrangeable],
    fixed: &[&dyn Arrangeable],
    min_obj_distance: i64,
    bed: &BedShape,
    progress: Option<&dyn Fn(usize)>,
    stop: Option<&(dyn Fn() -> bool + Sync)>,
) -> bool {
    let mut ok = true;
    let half = half_clearance(min_obj_distance);

    // Import movable handles; degenerate outlines are rejected up front.
    let mut items = Vec::with_capacity(movable.len());
    let mut slots = Vec::with_capacity(movable.len());
    let mut initial = Vec::with_capacity(movable.len());
    let mut rejected: Vec<(usize, Point, f64)> = Vec::new();
    for (slot, handle) in movable.iter().enumerate() {
        let (contour, offs, rotation) = handle.get_arrange_polygon();
        match Item::new(contour, offs, rotation) {
            Ok(mut item) => {
                item.set_inflation(half);
                slots.push(slot);
                initial.push((offs, rotation));
                items.push(item);
            }
            Err(e) => {
                warn!("rejecting movable part {}: {}", slot, e);
                rejected.push((slot, offs, rotation));
                ok = false;
            }
        }
    }

    let mut fixed_items = Vec::with_capacity(fixed.len());
    for (slot, handle) in fixed.iter().enumerate() {
        let (contour, offs, rotation) = handle.get_arrange_polygon();
        match Item::new(contour, offs, rotation) {
            Ok(mut item) => {
                item.set_inflation(half);
                fixed_items.push(item);
            }
            Err(e) => warn!("ignoring degenerate fixed part {}: {}", slot, e),
        }
    }

    let bin = Bin::from_hint(bed);
    let stride = {
        let w = bin.stride_width();
        w + w / 5
    };

    let mut arranger = Arranger::new(bin, ArrangeConfig::default(), items, fixed_items);
    let pack = match arranger.execute(progress, stop) {
        Ok(pack) => pack,
        Err(e) => {
            log::error!("arrangement failed: {}", e);
            return false;
        }
    };
    if pack.cancelled || !pack.unplaced.is_empty() {
        ok = false;
    }

    // Write results back: placed parts with their bin stride, unplaceable
    // and rejected parts with their initial pose.
    for (bin_idx, placements) in pack.bins.iter().enumerate() {
        for p in placements {
            let t = p.translation;
            movable[slots[p.index]].apply_arrange_result(
                (unscaled(t.x + bin_idx as i64 * stride), unscaled(t.y)),
                p.rotation,
            );
        }
    }
    for &idx in &pack.unplaced {
        let (offs, rotation) = initial[idx];
        movable[slots[idx]].apply_arrange_result((unscaled(offs.x), unscaled(offs.y)), rotation);
    }
    for &(slot, offs, rotation) in &rejected {
        movable[slot].apply_arrange_result((unscaled(offs.x), unscaled(offs.y)), rotation);
    }

    ok
}
