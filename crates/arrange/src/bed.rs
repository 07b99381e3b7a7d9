//! Bed shapes and packing bins.
//!
//! The host describes its print bed with a [`BedShape`] hint, usually
//! produced by [`bed_shape`] from the raw bed outline. The arranger turns
//! the hint into a [`Bin`], the concrete container the placer packs into.
//! The bin kind is decided once per arrange call; per-candidate work only
//! dispatches on the already-chosen variant.

use platen_core::polygon::{self, open_ring};
use platen_core::{Aabb, Point, SCALED_EPSILON};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Half extent of the virtual box backing an infinite bed. Far larger than
/// any real bed while keeping every coordinate sum inside the supported
/// range.
pub const INFINITE_HALF_EXTENT: i64 = 1 << 30;

/// Host-facing description of the print bed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BedShape {
    /// Rectangular bed.
    Box {
        /// Bed bounding box.
        bbox: Aabb,
    },
    /// Circular bed.
    Circle {
        /// Bed center.
        center: Point,
        /// Bed radius.
        radius: i64,
    },
    /// Arbitrary polygonal bed.
    Irregular {
        /// Bed outline.
        polyline: Vec<Point>,
    },
    /// Unbounded plane around a center point.
    Infinite {
        /// Virtual bed center.
        center: Point,
    },
    /// Nothing is known about the bed; treated as an infinite bed at the
    /// origin.
    Unknown,
}

/// Classifies a raw bed outline into a [`BedShape`].
///
/// A polyline whose unsigned area matches its bounding-box area within
/// 1e-3 relative is a box; one whose vertices all sit at a common radius
/// (within `10 * SCALED_EPSILON`) from the bounding-box center is a circle;
/// anything else is irregular.
pub fn bed_shape(polyline: &[Point]) -> BedShape {
    let ring = open_ring(polyline);
    let Some(bbox) = polygon::bounding_box(ring) else {
        return BedShape::Unknown;
    };
    if ring.len() < 3 {
        return BedShape::Unknown;
    }

    let poly_area = polygon::area(ring);
    let bbox_area = bbox.area() as f64;
    if bbox_area > 0.0 && (1.0 - poly_area / bbox_area).abs() < 1e-3 {
        return BedShape::Box { bbox };
    }

    let center = bbox.center();
    let mut avg = 0.0;
    for &p in ring {
        avg += center.distance(p);
    }
    avg /= ring.len() as f64;
    let tolerance = (10 * SCALED_EPSILON) as f64;
    if ring.iter().all(|&p| (center.distance(p) - avg).abs() <= tolerance) {
        return BedShape::Circle {
            center,
            radius: avg.round() as i64,
        };
    }

    BedShape::Irregular {
        polyline: ring.to_vec(),
    }
}

/// The container parts are packed into.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Bin {
    /// Rectangular bin.
    Rect(Aabb),
    /// Disc-shaped bin.
    Disc {
        /// Center of the disc.
        center: Point,
        /// Radius of the disc.
        radius: i64,
    },
    /// Arbitrary polygonal bin (open ring).
    Polygon(Vec<Point>),
    /// Unbounded bin around a center.
    Infinite {
        /// Pile gravity center.
        center: Point,
    },
}

impl Bin {
    /// Builds the bin matching a bed hint. `Unknown` falls back to an
    /// infinite bin at the origin, preserving the historical default for
    /// beds the classifier could not identify.
    pub fn from_hint(hint: &BedShape) -> Bin {
        match hint {
            BedShape::Box { bbox } => Bin::Rect(*bbox),
            BedShape::Circle { center, radius } => Bin::Disc {
                center: *center,
                radius: *radius,
            },
            BedShape::Irregular { polyline } => Bin::Polygon(open_ring(polyline).to_vec()),
            BedShape::Infinite { center } => Bin::Infinite { center: *center },
            BedShape::Unknown => Bin::Infinite {
                center: Point::zero(),
            },
        }
    }

    /// Bounding box of the bin. Infinite bins report the virtual box.
    pub fn bounding_box(&self) -> Aabb {
        match self {
            Bin::Rect(bb) => *bb,
            Bin::Disc { center, radius } => Aabb::new(
                Point::new(center.x - radius, center.y - radius),
                Point::new(center.x + radius, center.y + radius),
            ),
            Bin::Polygon(ring) => polygon::bounding_box(ring)
                .unwrap_or_else(|| Aabb::new(Point::zero(), Point::zero())),
            Bin::Infinite { center } => Aabb::new(
                Point::new(
                    center.x - INFINITE_HALF_EXTENT,
                    center.y - INFINITE_HALF_EXTENT,
                ),
                Point::new(
                    center.x + INFINITE_HALF_EXTENT,
                    center.y + INFINITE_HALF_EXTENT,
                ),
            ),
        }
    }

    /// The point placements gravitate toward.
    pub fn center(&self) -> Point {
        match self {
            Bin::Disc { center, .. } | Bin::Infinite { center } => *center,
            _ => self.bounding_box().center(),
        }
    }

    /// Bin area, used to normalize the objective and to classify big items.
    pub fn area(&self) -> f64 {
        match self {
            Bin::Rect(bb) => bb.area() as f64,
            Bin::Disc { radius, .. } => {
                std::f64::consts::PI * (*radius as f64) * (*radius as f64)
            }
            Bin::Polygon(ring) => polygon::area(ring),
            Bin::Infinite { .. } => self.bounding_box().area() as f64,
        }
    }

    /// Width used to compute the host-side bin stride. Discs report their
    /// radius, matching the historical stride of circular beds.
    pub fn stride_width(&self) -> i64 {
        match self {
            Bin::Rect(bb) => bb.width(),
            Bin::Disc { radius, .. } => *radius,
            Bin::Polygon(ring) => polygon::bounding_box(ring).map_or(0, |bb| bb.width()),
            Bin::Infinite { .. } => 0,
        }
    }

    /// Whether every vertex of `ring` lies inside the bin.
    pub fn contains_shape(&self, ring: &[Point]) -> bool {
        match self {
            Bin::Rect(bb) => ring.iter().all(|&p| bb.contains_point(p)),
            Bin::Disc { center, radius } => {
                let r = *radius as f64;
                ring.iter().all(|&p| center.distance(p) <= r)
            }
            Bin::Polygon(bin_ring) => {
                ring.iter().all(|&p| polygon::contains_point(bin_ring, p))
            }
            Bin::Infinite { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platen_core::scaled;

    #[test]
    fn test_bed_shape_box() {
        let outline = vec![
            Point::new(0, 0),
            Point::new(scaled(200.0), 0),
            Point::new(scaled(200.0), scaled(200.0)),
            Point::new(0, scaled(200.0)),
        ];
        match bed_shape(&outline) {
            BedShape::Box { bbox } => {
                assert_eq!(bbox.width(), scaled(200.0));
                assert_eq!(bbox.height(), scaled(200.0));
            }
            other => panic!("expected box, got {:?}", other),
        }
    }

    #[test]
    fn test_bed_shape_circle() {
        let r = scaled(100.0) as f64;
        let outline: Vec<Point> = (0..64)
            .map(|i| {
                let a = i as f64 / 64.0 * std::f64::consts::TAU;
                Point::new((r * a.cos()).round() as i64, (r * a.sin()).round() as i64)
            })
            .collect();
        match bed_shape(&outline) {
            BedShape::Circle { radius, .. } => {
                assert!((radius - scaled(100.0)).abs() < scaled(0.5));
            }
            other => panic!("expected circle, got {:?}", other),
        }
    }

    #[test]
    fn test_bed_shape_irregular() {
        let outline = vec![
            Point::new(0, 0),
            Point::new(scaled(100.0), 0),
            Point::new(0, scaled(80.0)),
        ];
        assert!(matches!(bed_shape(&outline), BedShape::Irregular { .. }));
    }

    #[test]
    fn test_bed_shape_degenerate() {
        assert_eq!(bed_shape(&[]), BedShape::Unknown);
        assert_eq!(
            bed_shape(&[Point::new(0, 0), Point::new(1, 1)]),
            BedShape::Unknown
        );
    }

    #[test]
    fn test_bin_from_unknown_is_infinite_at_origin() {
        let bin = Bin::from_hint(&BedShape::Unknown);
        assert_eq!(
            bin,
            Bin::Infinite {
                center: Point::zero()
            }
        );
        assert_eq!(bin.stride_width(), 0);
    }

    #[test]
    fn test_bin_geometry() {
        let bin = Bin::Rect(Aabb::new(Point::zero(), Point::new(100, 60)));
        assert_eq!(bin.center(), Point::new(50, 30));
        assert_eq!(bin.stride_width(), 100);
        assert_eq!(bin.area(), 6000.0);

        let disc = Bin::Disc {
            center: Point::zero(),
            radius: 50,
        };
        assert!(disc.contains_shape(&[Point::new(30, 30)]));
        assert!(!disc.contains_shape(&[Point::new(40, 40)]));
    }
}
