//! Cutting geometry by a plane.

use crate::{Classification, Plane3D, PlaneSide, Polygon, Segment};

/// Trait for geometry that can be cut by a plane.
pub trait Cuttable: Sized {
    /// Cuts the geometry by a plane.
    ///
    /// Returns `(front, back)` where:
    /// - `front`: the part on the front side of the plane, if any
    /// - `back`: the part on the back side of the plane, if any
    ///
    /// # Return values by classification
    ///
    /// - **Front**: `(Some(self), None)` - entire geometry is in front
    /// - **Back**: `(None, Some(self))` - entire geometry is behind
    /// - **Coplanar**: `(Some(self), None)` - treated as front
    /// - **Spanning**: `(Some(front_part), Some(back_part))` - split into two pieces
    ///
    /// Pieces too small to be valid geometry are dropped, so a spanning
    /// input may still yield a single side.
    fn cut(&self, plane: &Plane3D, epsilon: f64) -> (Option<Self>, Option<Self>);
}

impl Cuttable for Polygon {
    fn cut(&self, plane: &Plane3D, epsilon: f64) -> (Option<Polygon>, Option<Polygon>) {
        match self.classify(plane, epsilon) {
            Classification::Front | Classification::Coplanar => (Some(self.clone()), None),
            Classification::Back => (None, Some(self.clone())),
            Classification::Spanning => split_polygon(self, plane, epsilon),
        }
    }
}

/// Splits a spanning polygon into front and back parts.
///
/// Uses a variant of the Sutherland-Hodgman algorithm:
/// walks the polygon edges and builds two vertex lists,
/// adding intersection points when edges cross the plane.
fn split_polygon(
    polygon: &Polygon,
    plane: &Plane3D,
    epsilon: f64,
) -> (Option<Polygon>, Option<Polygon>) {
    let vertices = polygon.vertices();
    let n = vertices.len();

    let mut front_verts = Vec::with_capacity(n + 1);
    let mut back_verts = Vec::with_capacity(n + 1);

    let sides: Vec<PlaneSide> = vertices
        .iter()
        .map(|v| plane.classify_point_with_epsilon(*v, epsilon))
        .collect();

    for i in 0..n {
        let current = vertices[i];
        let current_side = sides[i];
        let next_idx = (i + 1) % n;
        let next = vertices[next_idx];
        let next_side = sides[next_idx];

        match current_side {
            PlaneSide::Front => front_verts.push(current),
            PlaneSide::Back => back_verts.push(current),
            PlaneSide::OnPlane => {
                // On-plane vertices go to both sides
                front_verts.push(current);
                back_verts.push(current);
            }
        }

        let crosses = matches!(
            (current_side, next_side),
            (PlaneSide::Front, PlaneSide::Back) | (PlaneSide::Back, PlaneSide::Front)
        );

        if crosses {
            if let Some((_, intersection)) = plane.intersect_segment(current, next) {
                front_verts.push(intersection);
                back_verts.push(intersection);
            }
        }
    }

    let front = (front_verts.len() >= 3).then(|| Polygon::new(front_verts));
    let back = (back_verts.len() >= 3).then(|| Polygon::new(back_verts));

    (front, back)
}

impl Cuttable for Segment {
    fn cut(&self, plane: &Plane3D, epsilon: f64) -> (Option<Segment>, Option<Segment>) {
        match plane.classify_points(self.points(), epsilon) {
            Classification::Front | Classification::Coplanar => (Some(*self), None),
            Classification::Back => (None, Some(*self)),
            Classification::Spanning => {
                let Some((_, mid)) = plane.intersect_segment(self.start(), self.end()) else {
                    return (Some(*self), None);
                };
                let first = Segment::new(self.start(), mid);
                let second = Segment::new(mid, self.end());
                if plane.signed_distance(self.start()) > 0.0 {
                    (Some(first), Some(second))
                } else {
                    (Some(second), Some(first))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PLANE_EPSILON;
    use nalgebra::{Point3, Vector3};

    fn x_plane(offset: f64) -> Plane3D {
        Plane3D::new(Vector3::new(1.0, 0.0, 0.0), offset).unwrap()
    }

    fn square() -> Polygon {
        Polygon::quad(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        )
    }

    #[test]
    fn polygon_entirely_in_front() {
        let (front, back) = square().cut(&x_plane(-1.0), PLANE_EPSILON);
        assert_eq!(front, Some(square()));
        assert!(back.is_none());
    }

    #[test]
    fn polygon_entirely_behind() {
        let (front, back) = square().cut(&x_plane(3.0), PLANE_EPSILON);
        assert!(front.is_none());
        assert_eq!(back, Some(square()));
    }

    #[test]
    fn spanning_square_splits_into_two_quads() {
        let (front, back) = square().cut(&x_plane(0.5), PLANE_EPSILON);
        let front = front.unwrap();
        let back = back.unwrap();

        assert_eq!(front.len(), 4);
        assert_eq!(back.len(), 4);
        assert!((front.area() - 3.0).abs() < 1e-12);
        assert!((back.area() - 1.0).abs() < 1e-12);
        assert!(front.vertices().iter().all(|v| v.x >= 0.5 - 1e-12));
        assert!(back.vertices().iter().all(|v| v.x <= 0.5 + 1e-12));
    }

    #[test]
    fn split_through_vertex_makes_two_triangles() {
        // diagonal plane through (0,0) and (2,2)
        let plane = Plane3D::new(Vector3::new(1.0, -1.0, 0.0), 0.0).unwrap();
        let (front, back) = square().cut(&plane, PLANE_EPSILON);
        let (front, back) = (front.unwrap(), back.unwrap());
        assert_eq!(front.len(), 3);
        assert_eq!(back.len(), 3);
        assert!((front.area() + back.area() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn segment_split_keeps_orientation() {
        let seg = Segment::new(Point3::new(-1.0, 0.0, 0.0), Point3::new(3.0, 0.0, 0.0));
        let (front, back) = seg.cut(&x_plane(0.0), PLANE_EPSILON);
        let (front, back) = (front.unwrap(), back.unwrap());
        assert!(front.start().x.abs() < 1e-12 && (front.end().x - 3.0).abs() < 1e-12);
        assert!((back.start().x + 1.0).abs() < 1e-12 && back.end().x.abs() < 1e-12);
    }

    #[test]
    fn segment_touching_plane_is_not_split() {
        let seg = Segment::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0));
        let (front, back) = seg.cut(&x_plane(0.0), PLANE_EPSILON);
        assert_eq!(front, Some(seg));
        assert!(back.is_none());
    }
}
