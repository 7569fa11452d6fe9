//! Geometric primitives for canvas coordinates.
//!
//! [`Point`] doubles as the position payload exchanged with the remote
//! service (`{"x": .., "y": ..}`), so it implements serde in that shape.

use serde::{Deserialize, Serialize};

/// A 2-D point, used both for layout centres and canvas positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f64 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f64 {
        self.y
    }

    /// Adds another point to this point, returning a new point
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Calculates the hypotenuse (Euclidean distance from origin)
    pub fn hypot(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Multiplies both coordinates by the given factor
    pub fn scale(self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Returns `true` when both coordinates are finite numbers
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Width and height of a component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f64,
    height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f64 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f64 {
        self.height
    }

    /// Multiplies both dimensions by the given factor
    pub fn scale(self, factor: f64) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }

    /// Returns half of this size as an offset from a centre to a corner
    pub fn half_extent(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Returns `true` when both dimensions are finite and strictly positive
    pub fn is_positive(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(3.0, 4.0);
        let b = Point::new(1.0, -2.0);

        assert_eq!(a.add_point(b), Point::new(4.0, 2.0));
        assert_eq!(a.sub_point(b), Point::new(2.0, 6.0));
        assert_eq!(a.scale(2.0), Point::new(6.0, 8.0));
        assert_approx_eq!(f64, a.hypot(), 5.0);
    }

    #[test]
    fn test_point_is_finite() {
        assert!(Point::new(1.0, 2.0).is_finite());
        assert!(!Point::new(f64::NAN, 2.0).is_finite());
        assert!(!Point::new(1.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn test_size_helpers() {
        let size = Size::new(300.0, 200.0);

        assert_eq!(size.scale(0.5), Size::new(150.0, 100.0));
        assert_eq!(size.half_extent(), Point::new(150.0, 100.0));
        assert!(size.is_positive());
        assert!(!Size::new(0.0, 10.0).is_positive());
        assert!(!Size::new(10.0, -1.0).is_positive());
        assert!(!Size::new(f64::NAN, 1.0).is_positive());
    }

    #[test]
    fn test_point_serde_shape() {
        let json = serde_json::to_value(Point::new(12.5, -4.0)).unwrap();
        assert_eq!(json, serde_json::json!({"x": 12.5, "y": -4.0}));
    }
}
