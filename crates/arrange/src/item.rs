//! Movable and fixed parts.

use platen_core::polygon::{self, open_ring};
use platen_core::{Aabb, Point, Result};

/// One part of the arrangement: an immutable source contour plus a mutable
/// pose. The contour is normalized to clockwise winding and stored closed
/// (first vertex repeated at the end). The shape used for collision work is
/// the contour inflated by half the part-to-part clearance, rotated into the
/// current orientation; it is cached and rebuilt only when rotation or
/// inflation change.
#[derive(Debug, Clone)]
pub struct Item {
    contour: Vec<Point>,
    translation: Point,
    rotation: f64,
    inflation: i64,
    fixed: bool,

    // Caches derived from (contour, inflation, rotation).
    shape0: Vec<Point>,
    bbox0: Aabb,
    area_x2: i128,
    convex: bool,
}

impl Item {
    /// Imports a part contour with its initial pose.
    ///
    /// Counter-clockwise input is reversed so the stored contour is
    /// clockwise, then explicitly closed. Returns an error for degenerate
    /// contours (fewer than three vertices, zero area, self-intersections)
    /// and for coordinates outside the supported range.
    pub fn new(contour: Vec<Point>, translation: Point, rotation: f64) -> Result<Self> {
        polygon::validate_simple(&contour)?;
        let mut contour: Vec<Point> = open_ring(&contour).to_vec();
        if polygon::is_ccw(&contour) {
            contour.reverse();
        }
        let contour = polygon::close_ring(contour);

        let mut item = Self {
            contour,
            translation,
            rotation,
            inflation: 0,
            fixed: false,
            shape0: Vec::new(),
            bbox0: Aabb::new(Point::zero(), Point::zero()),
            area_x2: 0,
            convex: false,
        };
        item.rebuild();
        Ok(item)
    }

    fn rebuild(&mut self) {
        let base = open_ring(&self.contour);
        let inflated = if self.inflation != 0 {
            polygon::offset(base, self.inflation)
        } else {
            base.to_vec()
        };
        self.shape0 = polygon::rotate(&inflated, self.rotation);
        self.bbox0 = polygon::bounding_box(&self.shape0)
            .unwrap_or_else(|| Aabb::new(Point::zero(), Point::zero()));
        self.area_x2 = polygon::area_x2(&self.shape0);
        self.convex = polygon::is_convex(&self.shape0);
    }

    /// The stored source contour (clockwise, closed).
    pub fn contour(&self) -> &[Point] {
        &self.contour
    }

    /// Current translation.
    pub fn translation(&self) -> Point {
        self.translation
    }

    /// Replaces the translation.
    pub fn set_translation(&mut self, translation: Point) {
        self.translation = translation;
    }

    /// Shifts the translation by `d`.
    pub fn translate(&mut self, d: Point) {
        self.translation += d;
    }

    /// Current rotation in radians.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Replaces the rotation and rebuilds the cached shape.
    pub fn set_rotation(&mut self, rotation: f64) {
        self.rotation = rotation;
        self.rebuild();
    }

    /// Current inflation in scaled units.
    pub fn inflation(&self) -> i64 {
        self.inflation
    }

    /// Sets the inflation (half the part-to-part clearance) and rebuilds the
    /// cached shape.
    pub fn set_inflation(&mut self, inflation: i64) {
        self.inflation = inflation;
        self.rebuild();
    }

    /// Whether the part is pinned to its current pose.
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// Pins the part to its current pose.
    pub fn mark_fixed(&mut self) {
        self.fixed = true;
    }

    /// The collision shape at the current rotation and zero translation
    /// (open ring). Placement candidates are translations of this shape.
    pub fn reference_shape(&self) -> &[Point] {
        &self.shape0
    }

    /// The collision shape at the current pose (open ring).
    pub fn transformed_shape(&self) -> Vec<Point> {
        polygon::translate(&self.shape0, self.translation)
    }

    /// Bounding box of the collision shape at zero translation.
    pub fn reference_bbox(&self) -> Aabb {
        self.bbox0
    }

    /// Bounding box at the current pose.
    pub fn bounding_box(&self) -> Aabb {
        self.bbox0.translate(self.translation)
    }

    /// Absolute area of the collision shape.
    pub fn area(&self) -> f64 {
        self.area_x2 as f64 / 2.0
    }

    /// Whether the collision shape is convex.
    pub fn is_convex(&self) -> bool {
        self.convex
    }
}
