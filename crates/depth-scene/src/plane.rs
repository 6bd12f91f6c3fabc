//! Plane representation and point/geometry classification.

use nalgebra::{Point3, Vector3};

/// Default epsilon for plane classification, in view-space units.
/// Points within this distance of the plane are considered "on" the plane.
pub const PLANE_EPSILON: f64 = 1e-9;

/// Which side of a plane a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Point is in front of the plane (positive side of normal)
    Front,
    /// Point is behind the plane (negative side of normal)
    Back,
    /// Point lies on the plane (within epsilon tolerance)
    OnPlane,
}

/// Classification of a set of points relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// All vertices are in front of the plane (or on it)
    Front,
    /// All vertices are behind the plane (or on it)
    Back,
    /// All vertices are on the plane (coplanar)
    Coplanar,
    /// Vertices are on both sides (spans the plane)
    Spanning,
}

/// A plane in 3D space, represented as `normal · point = offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane3D {
    normal: Vector3<f64>,
    offset: f64,
}

impl Plane3D {
    /// Creates a new plane from a normal vector and offset.
    /// The normal will be normalized automatically.
    ///
    /// Returns `None` if the normal vector has zero length.
    pub fn new(normal: Vector3<f64>, offset: f64) -> Option<Self> {
        let norm = normal.norm();
        if !(norm > f64::EPSILON) {
            return None;
        }
        Some(Self {
            normal: normal / norm,
            offset: offset / norm,
        })
    }

    /// Creates a plane from a point on the plane and a normal vector.
    ///
    /// Returns `None` if the normal vector has zero length.
    pub fn from_point_and_normal(point: Point3<f64>, normal: Vector3<f64>) -> Option<Self> {
        let norm = normal.norm();
        if !(norm > f64::EPSILON) {
            return None;
        }
        let unit_normal = normal / norm;
        let offset = unit_normal.dot(&point.coords);
        Some(Self {
            normal: unit_normal,
            offset,
        })
    }

    /// Creates a plane from three points.
    /// The normal direction follows the right-hand rule: (b - a) × (c - a).
    ///
    /// Returns `None` if the points are collinear.
    pub fn from_three_points(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Option<Self> {
        let normal = (b - a).cross(&(c - a));
        Self::from_point_and_normal(a, normal)
    }

    /// Returns the unit normal vector of the plane.
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    /// Returns the signed distance from the origin to the plane along the normal.
    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Computes the signed distance from a point to the plane.
    /// - Positive: point is in front (same side as normal)
    /// - Negative: point is behind (opposite side from normal)
    #[inline]
    pub fn signed_distance(&self, point: Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.offset
    }

    /// Classifies which side of the plane a point lies on.
    /// Uses the default `PLANE_EPSILON` tolerance.
    #[inline]
    pub fn classify_point(&self, point: Point3<f64>) -> PlaneSide {
        self.classify_point_with_epsilon(point, PLANE_EPSILON)
    }

    /// Classifies which side of the plane a point lies on, with a custom epsilon.
    pub fn classify_point_with_epsilon(&self, point: Point3<f64>, epsilon: f64) -> PlaneSide {
        let dist = self.signed_distance(point);
        if dist > epsilon {
            PlaneSide::Front
        } else if dist < -epsilon {
            PlaneSide::Back
        } else {
            PlaneSide::OnPlane
        }
    }

    /// Classifies a set of points against the plane.
    ///
    /// Points on the plane do not count towards either side, so a triangle
    /// with one vertex on the plane and the others in front is `Front`.
    pub fn classify_points(&self, points: &[Point3<f64>], epsilon: f64) -> Classification {
        let mut front = 0;
        let mut back = 0;

        for point in points {
            match self.classify_point_with_epsilon(*point, epsilon) {
                PlaneSide::Front => front += 1,
                PlaneSide::Back => back += 1,
                PlaneSide::OnPlane => {}
            }
        }

        match (front, back) {
            (0, 0) => Classification::Coplanar,
            (_, 0) => Classification::Front,
            (0, _) => Classification::Back,
            _ => Classification::Spanning,
        }
    }

    /// Returns a new plane with the normal flipped (facing the opposite direction).
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            offset: -self.offset,
        }
    }

    /// Projects a point onto the plane (finds the closest point on the plane).
    #[inline]
    pub fn project_point(&self, point: Point3<f64>) -> Point3<f64> {
        point - self.normal * self.signed_distance(point)
    }

    /// Computes the intersection of a line segment with the plane.
    ///
    /// Returns `Some((t, point))` where:
    /// - `t` is the interpolation parameter (0.0 = start, 1.0 = end)
    /// - `point` is the intersection point
    ///
    /// Returns `None` if the segment is parallel to the plane or doesn't intersect.
    pub fn intersect_segment(
        &self,
        start: Point3<f64>,
        end: Point3<f64>,
    ) -> Option<(f64, Point3<f64>)> {
        let direction = end - start;
        let denom = self.normal.dot(&direction);

        // Segment is parallel to plane
        if denom.abs() < f64::EPSILON {
            return None;
        }

        let t = (self.offset - self.normal.dot(&start.coords)) / denom;

        if !(0.0..=1.0).contains(&t) {
            return None;
        }

        Some((t, start + direction * t))
    }

    /// Direction of the line where this plane meets `other`.
    ///
    /// Returns `None` for (nearly) parallel planes.
    pub fn intersection_direction(&self, other: &Plane3D) -> Option<Vector3<f64>> {
        let dir = self.normal.cross(&other.normal);
        let len = dir.norm();
        if len > 1e-12 { Some(dir / len) } else { None }
    }
}
