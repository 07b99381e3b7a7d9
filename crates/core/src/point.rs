//! Integer point type in scaled units.

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 2D point (or vector) in scaled integer units (1 mm = 10⁶).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    /// X coordinate.
    pub x: i64,
    /// Y coordinate.
    pub y: i64,
}

impl Point {
    /// Creates a new point.
    #[inline]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// The origin.
    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0, y: 0 }
    }

    /// Squared Euclidean length, exact in `i128`.
    #[inline]
    pub fn length_sq(self) -> i128 {
        let x = self.x as i128;
        let y = self.y as i128;
        x * x + y * y
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        ((other - self).length_sq() as f64).sqrt()
    }

    /// Cross product of `self` and `other` as vectors, exact in `i128`.
    #[inline]
    pub fn cross(self, other: Point) -> i128 {
        self.x as i128 * other.y as i128 - self.y as i128 * other.x as i128
    }
}

/// Twice the signed area of the triangle `(a, b, c)`, exact in `i128`.
///
/// Positive when `c` lies to the left of the directed line from `a` to `b`
/// (counter-clockwise turn), negative for a right turn, zero when collinear.
#[inline]
pub fn orient2d(a: Point, b: Point, c: Point) -> i128 {
    (b - a).cross(c - a)
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    #[inline]
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Point {
    #[inline]
    fn sub_assign(&mut self, rhs: Point) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Neg for Point {
    type Output = Point;

    #[inline]
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(3, 4);
        let b = Point::new(-1, 2);
        assert_eq!(a + b, Point::new(2, 6));
        assert_eq!(a - b, Point::new(4, 2));
        assert_eq!(-a, Point::new(-3, -4));
    }

    #[test]
    fn test_distance() {
        let a = Point::new(0, 0);
        let b = Point::new(3, 4);
        assert_eq!(b.length_sq(), 25);
        assert_relative_eq!(a.distance(b), 5.0);
    }

    #[test]
    fn test_orient2d() {
        let a = Point::new(0, 0);
        let b = Point::new(10, 0);
        assert!(orient2d(a, b, Point::new(5, 1)) > 0);
        assert!(orient2d(a, b, Point::new(5, -1)) < 0);
        assert_eq!(orient2d(a, b, Point::new(20, 0)), 0);
    }

    #[test]
    fn test_orient2d_no_overflow_at_range_limit() {
        let m = crate::MAX_COORD;
        let a = Point::new(-m, -m);
        let b = Point::new(m, -m);
        let c = Point::new(m, m);
        assert!(orient2d(a, b, c) > 0);
    }
}
