//! Axis-aligned bounding boxes in scaled integer units.

use crate::point::Point;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box with integer corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point,
    /// Maximum corner.
    pub max: Point,
}

impl Aabb {
    /// Creates a bounding box from min/max corners.
    #[inline]
    pub const fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Computes the bounding box of a set of points. `None` when empty.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = *points.first()?;
        let mut bb = Aabb::new(first, first);
        for &p in &points[1..] {
            bb.expand_to(p);
        }
        Some(bb)
    }

    /// Width along the X axis.
    #[inline]
    pub fn width(&self) -> i64 {
        self.max.x - self.min.x
    }

    /// Height along the Y axis.
    #[inline]
    pub fn height(&self) -> i64 {
        self.max.y - self.min.y
    }

    /// Area, exact in `i128`.
    #[inline]
    pub fn area(&self) -> i128 {
        self.width() as i128 * self.height() as i128
    }

    /// Center point (rounded toward negative infinity).
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(
            self.min.x + self.width() / 2,
            self.min.y + self.height() / 2,
        )
    }

    /// Grows the box to contain `p`.
    #[inline]
    pub fn expand_to(&mut self, p: Point) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Union of two boxes.
    #[inline]
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(
            Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        )
    }

    /// Expands (or shrinks, for negative `margin`) the box on all sides.
    #[inline]
    pub fn inflate(&self, margin: i64) -> Aabb {
        Aabb::new(
            Point::new(self.min.x - margin, self.min.y - margin),
            Point::new(self.max.x + margin, self.max.y + margin),
        )
    }

    /// Translates the box.
    #[inline]
    pub fn translate(&self, d: Point) -> Aabb {
        Aabb::new(self.min + d, self.max + d)
    }

    /// Tests for closed-interval intersection with another box.
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Tests whether `p` lies inside or on the boundary.
    #[inline]
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Tests whether `other` lies fully inside this box.
    #[inline]
    pub fn contains(&self, other: &Aabb) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    /// The four corners in CCW order starting at `min`.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
        ]
    }
}
