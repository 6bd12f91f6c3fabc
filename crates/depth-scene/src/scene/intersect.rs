//! Pairwise relations between fragments and splitting of interpenetrating
//! pairs.

use std::cmp::Ordering;

use nalgebra::{Point2, Point3, Vector2, Vector3};
use tracing::trace;

use super::{Projected, Scene};
use crate::{Camera, Classification, Cuttable, Fragment, Plane3D, PlaneSide, Polygon, Segment, Shape};

/// How fragment `a` relates to fragment `b` as seen by the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// The footprints do not overlap, any order works.
    Disjoint,
    /// `a` is behind `b` where they overlap: `a` must be drawn first.
    Behind,
    /// `a` is in front of `b` where they overlap: `b` must be drawn first.
    InFront,
    /// `a` and `b` pass through each other.
    Intersecting,
}

impl Scene {
    /// Classifies the live fragments `a` and `b` of the last render against
    /// each other. Fragments that are not live are reported as disjoint.
    pub fn relation(&self, a: usize, b: usize) -> Relation {
        let (Some(pa), Some(pb)) = (self.projected(a), self.projected(b)) else {
            return Relation::Disjoint;
        };
        let eps = self.frame.eps;

        if !pa.bounds.intersects(&pb.bounds) || !footprints_overlap(&pa.footprint, &pb.footprint, eps.screen) {
            return Relation::Disjoint;
        }

        // separated in depth
        if pa.depth_min >= pb.depth_max - eps.depth {
            return Relation::Behind;
        }
        if pb.depth_min >= pa.depth_max - eps.depth {
            return Relation::InFront;
        }

        let fa = &self.fragments[a];
        let fb = &self.fragments[b];

        // a entirely on one side of b's plane
        if let Some(plane_b) = &pb.plane {
            match self.side_towards_viewer(plane_b, fa.vertices()) {
                Some(true) => return Relation::InFront,
                Some(false) => return Relation::Behind,
                None => {}
            }
        }
        // b entirely on one side of a's plane
        if let Some(plane_a) = &pa.plane {
            match self.side_towards_viewer(plane_a, fb.vertices()) {
                Some(true) => return Relation::Behind,
                Some(false) => return Relation::InFront,
                None => {}
            }
        }

        if self.interpenetrate(fa, pa, fb, pb) {
            return Relation::Intersecting;
        }

        match self.fine_z_compare(a, b) {
            Ordering::Greater => Relation::InFront,
            Ordering::Less | Ordering::Equal => Relation::Behind,
        }
    }

    /// Whether `points` lie on the viewer's side of `plane` (`Some(true)`),
    /// on the far side (`Some(false)`), or neither.
    fn side_towards_viewer(&self, plane: &Plane3D, points: &[Point3<f64>]) -> Option<bool> {
        let eps = self.frame.eps.plane;
        let facing = self.frame.viewer.side_of(plane, eps);
        let side = match plane.classify_points(points, eps) {
            Classification::Front => PlaneSide::Front,
            Classification::Back => PlaneSide::Back,
            Classification::Coplanar | Classification::Spanning => return None,
        };
        match facing {
            PlaneSide::OnPlane => None,
            facing => Some(side == facing),
        }
    }

    /// True if the two fragments pass through each other by more than the
    /// intersection tolerance.
    fn interpenetrate(&self, fa: &Fragment, pa: &Projected, fb: &Fragment, pb: &Projected) -> bool {
        let eps = self.frame.eps;
        match (fa.shape(), fb.shape(), &pa.plane, &pb.plane) {
            (Shape::Polygon { polygon: a, .. }, Shape::Polygon { polygon: b, .. }, Some(plane_a), Some(plane_b)) => {
                shared_length(a, plane_a, b, plane_b, eps.plane) > eps.intersection
            }
            (Shape::Polygon { polygon, .. }, Shape::Segment { segment, .. }, Some(plane), _)
            | (Shape::Segment { segment, .. }, Shape::Polygon { polygon, .. }, _, Some(plane)) => {
                segment_pierces(polygon, plane, segment, eps.plane, eps.intersection)
            }
            _ => false,
        }
    }

    /// True if fragment `idx` has not reached the split depth limit.
    pub(crate) fn can_cut(&self, idx: usize) -> bool {
        self.fragments[idx].split_depth() < self.config.max_split_depth
    }

    /// True if neither fragment has reached the split depth limit.
    pub(crate) fn can_split(&self, a: usize, b: usize) -> bool {
        self.can_cut(a) && self.can_cut(b)
    }

    /// Splits an intersecting pair along each other's planes.
    ///
    /// Pieces are appended to the arena, pieces of `a` first, and every
    /// fragment that was actually cut stops being live. Returns how many
    /// pieces each fragment produced; zero means it was left whole.
    pub(crate) fn split_pair(&mut self, a: usize, b: usize, camera: &dyn Camera) -> (usize, usize) {
        let eps = self.frame.eps.plane;
        let plane_a = self.projected(a).and_then(|p| p.plane.clone());
        let plane_b = self.projected(b).and_then(|p| p.plane.clone());

        // only polygons carry a plane, so a segment never cuts its partner
        let pieces_a = plane_b
            .map(|plane| cut_fragment(&self.fragments[a], &plane, eps))
            .unwrap_or_default();
        let pieces_b = plane_a
            .map(|plane| cut_fragment(&self.fragments[b], &plane, eps))
            .unwrap_or_default();

        let n1 = self.add_children(a, pieces_a, camera);
        let n2 = self.add_children(b, pieces_b, camera);
        trace!(a, b, n1, n2, "split pair");
        (n1, n2)
    }

    /// Cuts `target` by the plane of the polygon `cutter`. Used to break
    /// cyclic overlaps. Returns the number of pieces added.
    pub(crate) fn split_by_plane_of(&mut self, target: usize, cutter: usize, camera: &dyn Camera) -> usize {
        let Some(plane) = self.projected(cutter).and_then(|p| p.plane.clone()) else {
            return 0;
        };
        let pieces = cut_fragment(&self.fragments[target], &plane, self.frame.eps.plane);
        self.add_children(target, pieces, camera)
    }

    fn add_children(&mut self, parent: usize, pieces: Vec<Fragment>, camera: &dyn Camera) -> usize {
        if pieces.is_empty() {
            return 0;
        }
        let count = pieces.len();
        for piece in pieces {
            self.push_fragment(piece, camera);
        }
        self.live[parent] = false;
        count
    }
}

/// Cuts a fragment in two. Returns nothing unless both sides are non-empty.
fn cut_fragment(fragment: &Fragment, plane: &Plane3D, epsilon: f64) -> Vec<Fragment> {
    match fragment.shape() {
        Shape::Polygon { polygon, .. } => match polygon.cut(plane, epsilon) {
            (Some(front), Some(back)) => vec![fragment.child_polygon(front), fragment.child_polygon(back)],
            _ => Vec::new(),
        },
        Shape::Segment { segment, .. } => match segment.cut(plane, epsilon) {
            (Some(front), Some(back)) => vec![fragment.child_segment(front), fragment.child_segment(back)],
            _ => Vec::new(),
        },
        Shape::Marker { .. } => Vec::new(),
    }
}

/// Length along the common line of two planes over which both polygons
/// cross the other's plane. Zero or negative means they do not
/// interpenetrate.
pub(crate) fn shared_length(a: &Polygon, plane_a: &Plane3D, b: &Polygon, plane_b: &Plane3D, epsilon: f64) -> f64 {
    let Some(dir) = plane_a.intersection_direction(plane_b) else {
        return 0.0;
    };
    let (Some((a0, a1)), Some((b0, b1))) = (
        crossing_interval(a, plane_b, &dir, epsilon),
        crossing_interval(b, plane_a, &dir, epsilon),
    ) else {
        return 0.0;
    };
    a1.min(b1) - a0.max(b0)
}

/// Range of positions along `dir` where `polygon` meets `plane`.
fn crossing_interval(polygon: &Polygon, plane: &Plane3D, dir: &Vector3<f64>, epsilon: f64) -> Option<(f64, f64)> {
    let vertices = polygon.vertices();
    let sides: Vec<PlaneSide> = vertices
        .iter()
        .map(|v| plane.classify_point_with_epsilon(*v, epsilon))
        .collect();
    if !sides.contains(&PlaneSide::Front) || !sides.contains(&PlaneSide::Back) {
        return None;
    }

    let n = vertices.len();
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    let mut include = |p: Point3<f64>| {
        let t = dir.dot(&p.coords);
        lo = lo.min(t);
        hi = hi.max(t);
    };
    for i in 0..n {
        let j = (i + 1) % n;
        match (sides[i], sides[j]) {
            (PlaneSide::OnPlane, _) => include(vertices[i]),
            (PlaneSide::Front, PlaneSide::Back) | (PlaneSide::Back, PlaneSide::Front) => {
                if let Some((_, p)) = plane.intersect_segment(vertices[i], vertices[j]) {
                    include(p);
                }
            }
            _ => {}
        }
    }
    (lo <= hi).then_some((lo, hi))
}

/// True if `segment` crosses `plane` strictly inside `polygon`.
pub(crate) fn segment_pierces(
    polygon: &Polygon,
    plane: &Plane3D,
    segment: &Segment,
    plane_epsilon: f64,
    inset: f64,
) -> bool {
    if plane.classify_points(segment.points(), plane_epsilon) != Classification::Spanning {
        return false;
    }
    match plane.intersect_segment(segment.start(), segment.end()) {
        Some((_, hit)) => polygon.contains_coplanar_point(hit, -inset),
        None => false,
    }
}

/// Separating axis test for two convex screen outlines.
///
/// Outlines with one or two points (markers collapsed to a point, segments)
/// are supported. Overlaps thinner than `epsilon` do not count, except
/// along axes where one of the shapes has no width at all.
pub(crate) fn footprints_overlap(a: &[Point2<f64>], b: &[Point2<f64>], epsilon: f64) -> bool {
    let mut axes = vec![Vector2::x(), Vector2::y()];
    axes.extend(edge_axes(a));
    axes.extend(edge_axes(b));

    axes.iter().all(|axis| {
        let (a0, a1) = project_onto(a, axis);
        let (b0, b1) = project_onto(b, axis);
        let overlap = a1.min(b1) - a0.max(b0);
        let flat = (a1 - a0).min(b1 - b0) <= epsilon;
        let required = if flat { -epsilon } else { epsilon };
        overlap > required
    })
}

/// Unit normals of the outline edges, plus the direction of a two-point
/// outline.
fn edge_axes(points: &[Point2<f64>]) -> Vec<Vector2<f64>> {
    let unit = |v: Vector2<f64>| {
        let len = v.norm();
        (len > f64::EPSILON).then(|| v / len)
    };
    match points.len() {
        0 | 1 => Vec::new(),
        2 => {
            let d = points[1] - points[0];
            [unit(d), unit(Vector2::new(-d.y, d.x))].into_iter().flatten().collect()
        }
        n => (0..n)
            .filter_map(|i| {
                let d = points[(i + 1) % n] - points[i];
                unit(Vector2::new(-d.y, d.x))
            })
            .collect(),
    }
}

fn project_onto(points: &[Point2<f64>], axis: &Vector2<f64>) -> (f64, f64) {
    points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        let t = axis.dot(&p.coords);
        (lo.min(t), hi.max(t))
    })
}

/// True if `p` lies inside the convex outline or within `epsilon` of it.
pub(crate) fn point_in_footprint(p: &Point2<f64>, outline: &[Point2<f64>], epsilon: f64) -> bool {
    match outline.len() {
        0 => false,
        1 => (p - outline[0]).norm() <= epsilon,
        2 => distance_to_segment(p, &outline[0], &outline[1]) <= epsilon,
        n => {
            let orientation = super::project::polygon_area(outline).signum();
            (0..n).all(|i| {
                let a = outline[i];
                let edge = outline[(i + 1) % n] - a;
                let len = edge.norm();
                if len <= f64::EPSILON {
                    return true;
                }
                orientation * cross(&edge, &(p - a)) / len >= -epsilon
            })
        }
    }
}

fn distance_to_segment(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 <= f64::EPSILON {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Edges of an outline: closed for polygons, a single edge for segments.
pub(crate) fn outline_edges(outline: &[Point2<f64>]) -> Vec<(Point2<f64>, Point2<f64>)> {
    match outline.len() {
        0 | 1 => Vec::new(),
        2 => vec![(outline[0], outline[1])],
        n => (0..n).map(|i| (outline[i], outline[(i + 1) % n])).collect(),
    }
}

/// Crossing point of two screen segments, if they properly cross.
pub(crate) fn edge_crossing(
    (a0, a1): (Point2<f64>, Point2<f64>),
    (b0, b1): (Point2<f64>, Point2<f64>),
) -> Option<Point2<f64>> {
    let r = a1 - a0;
    let s = b1 - b0;
    let denom = cross(&r, &s);
    if denom.abs() <= f64::EPSILON * r.norm() * s.norm() {
        return None;
    }
    let qp = b0 - a0;
    let t = cross(&qp, &s) / denom;
    let u = cross(&qp, &r) / denom;
    ((0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)).then(|| a0 + r * t)
}

#[inline]
fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_square(x0: f64, y0: f64, size: f64) -> Vec<Point2<f64>> {
        vec![
            Point2::new(x0, y0),
            Point2::new(x0 + size, y0),
            Point2::new(x0 + size, y0 + size),
            Point2::new(x0, y0 + size),
        ]
    }

    fn make_polygon(points: [[f64; 3]; 4]) -> Polygon {
        Polygon::new(points.iter().map(|p| Point3::new(p[0], p[1], p[2])).collect())
    }

    #[test]
    fn overlapping_squares() {
        assert!(footprints_overlap(&make_square(0.0, 0.0, 2.0), &make_square(1.0, 1.0, 2.0), 1e-6));
        assert!(!footprints_overlap(&make_square(0.0, 0.0, 1.0), &make_square(3.0, 0.0, 1.0), 1e-6));
    }

    #[test]
    fn shared_edge_is_not_overlap() {
        assert!(!footprints_overlap(&make_square(0.0, 0.0, 1.0), &make_square(1.0, 0.0, 1.0), 1e-6));
    }

    #[test]
    fn diagonal_separation_needs_edge_axes() {
        let tri_a = vec![Point2::new(0.0, 0.0), Point2::new(2.0, 0.0), Point2::new(0.0, 2.0)];
        let tri_b = vec![Point2::new(2.0, 2.0), Point2::new(1.2, 2.0), Point2::new(2.0, 1.2)];
        // bounding boxes overlap, shapes do not
        assert!(!footprints_overlap(&tri_a, &tri_b, 1e-6));
    }

    #[test]
    fn segment_through_square() {
        let seg = vec![Point2::new(-1.0, 0.5), Point2::new(2.0, 0.5)];
        assert!(footprints_overlap(&seg, &make_square(0.0, 0.0, 1.0), 1e-6));
        let beside = vec![Point2::new(-1.0, 1.5), Point2::new(2.0, 1.5)];
        assert!(!footprints_overlap(&beside, &make_square(0.0, 0.0, 1.0), 1e-6));
    }

    #[test]
    fn point_in_outline() {
        let square = make_square(0.0, 0.0, 1.0);
        let reversed: Vec<_> = square.iter().rev().copied().collect();
        for outline in [&square, &reversed] {
            assert!(point_in_footprint(&Point2::new(0.5, 0.5), outline, 1e-9));
            assert!(point_in_footprint(&Point2::new(1.0, 0.5), outline, 1e-9));
            assert!(!point_in_footprint(&Point2::new(1.5, 0.5), outline, 1e-9));
        }
    }

    #[test]
    fn crossing_edges() {
        let hit = edge_crossing(
            (Point2::new(0.0, 0.0), Point2::new(2.0, 2.0)),
            (Point2::new(0.0, 2.0), Point2::new(2.0, 0.0)),
        )
        .unwrap();
        assert!((hit - Point2::new(1.0, 1.0)).norm() < 1e-12);
        assert!(
            edge_crossing(
                (Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)),
                (Point2::new(0.0, 1.0), Point2::new(1.0, 1.0)),
            )
            .is_none()
        );
    }

    #[test]
    fn crossing_polygons_share_length() {
        // horizontal square at y = 0 and vertical square at x = 0, crossing
        // along the z axis over [-1, 1]
        let a = make_polygon([[-1.0, 0.0, -1.0], [1.0, 0.0, -1.0], [1.0, 0.0, 1.0], [-1.0, 0.0, 1.0]]);
        let b = make_polygon([[0.0, -1.0, -1.0], [0.0, 1.0, -1.0], [0.0, 1.0, 1.0], [0.0, -1.0, 1.0]]);
        let (pa, pb) = (a.plane().unwrap(), b.plane().unwrap());
        assert!((shared_length(&a, &pa, &b, &pb, 1e-9) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn t_junction_is_not_interpenetration() {
        // b stands on a but does not pass through it
        let a = make_polygon([[-1.0, 0.0, -1.0], [1.0, 0.0, -1.0], [1.0, 0.0, 1.0], [-1.0, 0.0, 1.0]]);
        let b = make_polygon([[0.0, 0.0, -1.0], [0.0, 1.0, -1.0], [0.0, 1.0, 1.0], [0.0, 0.0, 1.0]]);
        let (pa, pb) = (a.plane().unwrap(), b.plane().unwrap());
        assert!(shared_length(&a, &pa, &b, &pb, 1e-9) <= 0.0);
    }

    #[test]
    fn planes_crossing_outside_polygons() {
        // the planes meet along x = 2.5, which misses a
        let a = make_polygon([[-1.0, 0.0, -1.0], [1.0, 0.0, -1.0], [1.0, 0.0, 1.0], [-1.0, 0.0, 1.0]]);
        let b = make_polygon([[2.0, -1.0, -1.0], [3.0, 1.0, -1.0], [3.0, 1.0, 1.0], [2.0, -1.0, 1.0]]);
        let (pa, pb) = (a.plane().unwrap(), b.plane().unwrap());
        assert!(shared_length(&a, &pa, &b, &pb, 1e-9) <= 0.0);
    }

    #[test]
    fn segment_through_polygon_interior() {
        let square = make_polygon([[-1.0, -1.0, 0.0], [1.0, -1.0, 0.0], [1.0, 1.0, 0.0], [-1.0, 1.0, 0.0]]);
        let plane = square.plane().unwrap();
        let through = Segment::new(Point3::new(0.0, 0.0, -1.0), Point3::new(0.0, 0.0, 1.0));
        assert!(segment_pierces(&square, &plane, &through, 1e-9, 1e-9));
        let outside = Segment::new(Point3::new(3.0, 0.0, -1.0), Point3::new(3.0, 0.0, 1.0));
        assert!(!segment_pierces(&square, &plane, &outside, 1e-9, 1e-9));
        let above = Segment::new(Point3::new(0.0, 0.0, 1.0), Point3::new(0.0, 0.0, 2.0));
        assert!(!segment_pierces(&square, &plane, &above, 1e-9, 1e-9));
    }
}
