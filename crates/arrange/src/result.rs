//! Arrangement results.

use platen_core::Point;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Final pose of one movable part.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Placement {
    /// Index into the movable input list.
    pub index: usize,
    /// Final translation in scaled units, without the bin stride.
    pub translation: Point,
    /// Final rotation in radians.
    pub rotation: f64,
}

/// The output of one arrangement: one entry per logical bin, each listing
/// the placements committed there. Bin `k` maps to an X offset of
/// `k * stride` when results are written back to the host.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackGroup {
    /// Placements per bin, in commit order.
    pub bins: Vec<Vec<Placement>>,
    /// Movable parts that did not fit even in an empty bin. They keep their
    /// initial pose.
    pub unplaced: Vec<usize>,
    /// Whether the stop predicate interrupted the run.
    pub cancelled: bool,
}

impl PackGroup {
    /// Number of bins that received at least one part.
    pub fn bin_count(&self) -> usize {
        self.bins.iter().filter(|b| !b.is_empty()).count()
    }

    /// Total number of committed placements.
    pub fn placed_count(&self) -> usize {
        self.bins.iter().map(|b| b.len()).sum()
    }

    /// True when every movable part was placed and the run completed.
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.unplaced.is_empty()
    }

    /// Looks up the placement of a movable part together with its bin index.
    pub fn find(&self, index: usize) -> Option<(usize, &Placement)> {
        self.bins.iter().enumerate().find_map(|(bin, placements)| {
            placements.iter().find(|p| p.index == index).map(|p| (bin, p))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_group_accessors() {
        let mut pg = PackGroup::default();
        pg.bins.push(vec![Placement {
            index: 1,
            translation: Point::new(5, 6),
            rotation: 0.0,
        }]);
        pg.bins.push(Vec::new());
        assert_eq!(pg.bin_count(), 1);
        assert_eq!(pg.placed_count(), 1);
        assert!(pg.is_complete());
        let (bin, p) = pg.find(1).unwrap();
        assert_eq!(bin, 0);
        assert_eq!(p.translation, Point::new(5, 6));
        assert!(pg.find(7).is_none());
    }
}
