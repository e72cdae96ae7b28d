//! Geometric primitives for system layout.
//!
//! This module provides the small set of geometric types used throughout
//! Engrave for staff boxes, bracket positions and skyline shapes.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in system space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - A rectangular box defined by minimum and maximum coordinates
//!
//! # Coordinate System
//!
//! Engrave uses the same orientation as SVG and the notation canvas:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! A staff's top line sits at `y = 0` of its own coordinate space, and a
//! larger `y` is further down the page.

/// A 2D point in system coordinate space.
///
/// # Examples
///
/// ```
/// # use engrave_core::geometry::Point;
/// let origin = Point::new(10.0, 20.0);
/// let moved = origin.add_point(Point::new(5.0, -5.0));
/// assert_eq!(moved.x(), 15.0);
/// assert_eq!(moved.y(), 15.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Creates a new point with the specified x-coordinate
    pub fn with_x(mut self, x: f32) -> Self {
        self.x = x;
        self
    }

    /// Creates a new point with the specified y-coordinate
    pub fn with_y(mut self, y: f32) -> Self {
        self.y = y;
        self
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

/// Width and height of an element
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }
}

/// A rectangular box with minimum and maximum coordinates.
///
/// The default value is the empty box at the origin, which is what hidden
/// staves are given by the vertical pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates a new bounds from a top-left point and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    /// Creates a new bounds from x, y, width and height.
    ///
    /// # Examples
    ///
    /// ```
    /// # use engrave_core::geometry::Bounds;
    /// let staff = Bounds::from_rect(12.0, 0.0, 300.0, 4.0);
    /// assert_eq!(staff.max_x(), 312.0);
    /// assert_eq!(staff.max_y(), 4.0);
    /// ```
    pub fn from_rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new_from_top_left(Point::new(x, y), Size::new(width, height))
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate (top edge) of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate (bottom edge) of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the top-left corner as a Point
    pub fn min_point(self) -> Point {
        Point {
            x: self.min_x,
            y: self.min_y,
        }
    }

    /// Returns true if the bounds have neither width nor height
    pub fn is_empty(self) -> bool {
        self.width() == 0.0 && self.height() == 0.0
    }

    /// Moves the box vertically so its top edge is at `y`, keeping its height
    pub fn with_y(self, y: f32) -> Self {
        let height = self.height();
        Self {
            min_y: y,
            max_y: y + height,
            ..self
        }
    }

    /// Keeps the top edge and sets a new height
    pub fn with_height(self, height: f32) -> Self {
        Self {
            max_y: self.min_y + height,
            ..self
        }
    }

    /// Merges two bounds into the smallest box containing both.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Moves the bounds by the specified offset.
    ///
    /// # Examples
    ///
    /// ```
    /// # use engrave_core::geometry::{Bounds, Point};
    /// let shape = Bounds::from_rect(0.0, -2.0, 10.0, 4.0);
    /// let moved = shape.translate(Point::new(5.0, 1.0));
    /// assert_eq!(moved.min_x(), 5.0);
    /// assert_eq!(moved.min_y(), -1.0);
    /// assert_eq!(moved.height(), 4.0);
    /// ```
    pub fn translate(&self, offset: Point) -> Self {
        Self {
            min_x: self.min_x + offset.x,
            min_y: self.min_y + offset.y,
            max_x: self.max_x + offset.x,
            max_y: self.max_y + offset.y,
        }
    }

    /// Returns true if the x ranges of both boxes share a non-empty interval
    pub fn overlaps_horizontally(&self, other: &Self) -> bool {
        self.min_x < other.max_x && other.min_x < self.max_x
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_bounds_default_is_empty() {
        let bounds = Bounds::default();
        assert!(bounds.is_empty());
        assert_eq!(bounds.min_y(), 0.0);
        assert_eq!(bounds.max_y(), 0.0);
    }

    #[test]
    fn test_bounds_from_rect() {
        let bounds = Bounds::from_rect(10.0, 20.0, 30.0, 40.0);

        assert_eq!(bounds.min_x(), 10.0);
        assert_eq!(bounds.min_y(), 20.0);
        assert_eq!(bounds.max_x(), 40.0);
        assert_eq!(bounds.max_y(), 60.0);
        assert_eq!(bounds.min_point(), Point::new(10.0, 20.0));
        assert!(!bounds.is_empty());
    }

    #[test]
    fn test_bounds_with_y_keeps_height() {
        let bounds = Bounds::from_rect(0.0, 5.0, 10.0, 4.0).with_y(12.5);

        assert_approx_eq!(f32, bounds.min_y(), 12.5);
        assert_approx_eq!(f32, bounds.height(), 4.0);
        assert_approx_eq!(f32, bounds.width(), 10.0);
    }

    #[test]
    fn test_bounds_with_height_keeps_top() {
        let bounds = Bounds::from_rect(0.0, -2.0, 10.0, 4.0).with_height(8.0);

        assert_approx_eq!(f32, bounds.min_y(), -2.0);
        assert_approx_eq!(f32, bounds.max_y(), 6.0);
    }

    #[test]
    fn test_bounds_merge() {
        let upper = Bounds::from_rect(1.0, 2.0, 4.0, 4.0);
        let lower = Bounds::from_rect(3.0, 0.0, 5.0, 4.0);

        let merged = upper.merge(&lower);
        assert_eq!(merged.min_x(), 1.0);
        assert_eq!(merged.min_y(), 0.0);
        assert_eq!(merged.max_x(), 8.0);
        assert_eq!(merged.max_y(), 6.0);
    }

    #[test]
    fn test_overlaps_horizontally() {
        let a = Bounds::from_rect(0.0, 0.0, 10.0, 1.0);
        let b = Bounds::from_rect(5.0, 50.0, 10.0, 1.0);
        let touching = Bounds::from_rect(10.0, 0.0, 5.0, 1.0);

        assert!(a.overlaps_horizontally(&b));
        assert!(b.overlaps_horizontally(&a));
        assert!(!a.overlaps_horizontally(&touching));
    }

    #[test]
    fn test_point_with_coordinates() {
        let point = Point::default().with_x(3.0).with_y(-4.0);
        assert_eq!(point.x(), 3.0);
        assert_eq!(point.y(), -4.0);
    }
}
