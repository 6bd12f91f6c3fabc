//! Straight line segment geometry.

use nalgebra::{Point3, Vector3};

/// A line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    points: [Point3<f64>; 2],
}

impl Segment {
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self { points: [start, end] }
    }

    #[inline]
    pub fn start(&self) -> Point3<f64> {
        self.points[0]
    }

    #[inline]
    pub fn end(&self) -> Point3<f64> {
        self.points[1]
    }

    /// Both end points, start first.
    #[inline]
    pub fn points(&self) -> &[Point3<f64>; 2] {
        &self.points
    }

    #[inline]
    pub fn direction(&self) -> Vector3<f64> {
        self.points[1] - self.points[0]
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.direction().norm()
    }

    /// Point at parameter `t` (0 = start, 1 = end).
    #[inline]
    pub fn at(&self, t: f64) -> Point3<f64> {
        self.points[0] + self.direction() * t
    }

    pub fn map_points(&self, f: impl Fn(&Point3<f64>) -> Point3<f64>) -> Self {
        Self::new(f(&self.points[0]), f(&self.points[1]))
    }
}
