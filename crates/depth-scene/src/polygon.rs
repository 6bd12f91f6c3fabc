//! Convex planar polygon geometry.

use nalgebra::{Point3, Vector3};

use crate::{Classification, Plane3D};

/// A convex polygon in 3D space, defined by an ordered list of vertices.
///
/// Vertices should be coplanar and listed in winding order. The engine does
/// not care which way the polygon faces; the winding only decides the
/// direction of [`Polygon::normal`].
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point3<f64>>,
}

impl Polygon {
    /// Creates a new polygon from a list of vertices.
    ///
    /// # Panics (debug builds only)
    /// Panics if fewer than 3 vertices are provided.
    pub fn new(vertices: Vec<Point3<f64>>) -> Self {
        debug_assert!(
            vertices.len() >= 3,
            "Polygon must have at least 3 vertices"
        );
        Self { vertices }
    }

    /// Creates a triangle.
    pub fn triangle(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self::new(vec![a, b, c])
    }

    /// Creates a quad from four corners in winding order (a -> b -> c -> d).
    pub fn quad(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>, d: Point3<f64>) -> Self {
        Self::new(vec![a, b, c, d])
    }

    /// Returns the vertices of the polygon.
    #[inline]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns true if the polygon has no vertices (always false for valid polygons).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Computes the (unnormalized) area-weighted normal using Newell's method.
    ///
    /// Unlike a cross product of the first three vertices this stays valid
    /// when some consecutive vertices are collinear, which is common for
    /// pieces produced by cutting.
    pub fn normal(&self) -> Vector3<f64> {
        let n = self.vertices.len();
        let mut normal = Vector3::zeros();
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            normal.x += (a.y - b.y) * (a.z + b.z);
            normal.y += (a.z - b.z) * (a.x + b.x);
            normal.z += (a.x - b.x) * (a.y + b.y);
        }
        normal
    }

    /// Computes the unit normal vector of the polygon.
    ///
    /// Returns `None` if the polygon has zero area.
    pub fn unit_normal(&self) -> Option<Vector3<f64>> {
        let n = self.normal();
        let len = n.norm();
        if len > f64::EPSILON { Some(n / len) } else { None }
    }

    /// Returns the plane that this polygon lies on, or `None` if degenerate.
    pub fn plane(&self) -> Option<Plane3D> {
        Plane3D::from_point_and_normal(self.centroid(), self.normal())
    }

    /// Computes the area of the polygon.
    pub fn area(&self) -> f64 {
        self.normal().norm() * 0.5
    }

    /// Computes the centroid (vertex average) of the polygon.
    pub fn centroid(&self) -> Point3<f64> {
        let sum: Vector3<f64> = self.vertices.iter().map(|p| p.coords).sum();
        Point3::from(sum / self.vertices.len() as f64)
    }

    /// Classifies this polygon relative to a plane.
    ///
    /// Returns:
    /// - `Front` if all vertices are in front of (or on) the plane
    /// - `Back` if all vertices are behind (or on) the plane
    /// - `Coplanar` if all vertices lie on the plane
    /// - `Spanning` if vertices are on both sides
    pub fn classify(&self, plane: &Plane3D, epsilon: f64) -> Classification {
        plane.classify_points(&self.vertices, epsilon)
    }

    /// Returns true if `point`, assumed to lie on the polygon plane, is inside
    /// the polygon or within `epsilon` of its boundary.
    pub fn contains_coplanar_point(&self, point: Point3<f64>, epsilon: f64) -> bool {
        let Some(normal) = self.unit_normal() else {
            return false;
        };
        let n = self.vertices.len();
        (0..n).all(|i| {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let edge = b - a;
            let len = edge.norm();
            if len <= f64::EPSILON {
                return true;
            }
            // inward edge normal, distance positive inside
            let inward = normal.cross(&edge) / len;
            inward.dot(&(point - a)) >= -epsilon
        })
    }

    /// Applies `f` to every vertex.
    pub fn map_vertices(&self, f: impl Fn(&Point3<f64>) -> Point3<f64>) -> Self {
        Self {
            vertices: self.vertices.iter().map(f).collect(),
        }
    }
}

impl From<[Point3<f64>; 3]> for Polygon {
    fn from([a, b, c]: [Point3<f64>; 3]) -> Self {
        Self::triangle(a, b, c)
    }
}

impl From<[Point3<f64>; 4]> for Polygon {
    fn from([a, b, c, d]: [Point3<f64>; 4]) -> Self {
        Self::quad(a, b, c, d)
    }
}
