//! Fragment projection: view-space clipping, screen transform and the
//! per-fragment screen cache.

use nalgebra::{Point2, Point3, Vector3};

use crate::camera::view_depth;
use crate::{Camera, Classification, Cuttable, Fragment, Plane3D, Shape, PLANE_EPSILON};

/// Smallest half-size given to a marker footprint, in screen units.
const MIN_MARKER_HALF_SIZE: f64 = 0.5;

/// The screen rectangle a scene renders into.
///
/// Screen x grows to the right and y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    min: Point2<f64>,
    max: Point2<f64>,
}

impl Viewport {
    /// Creates a viewport from two opposite corners, in any order.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            min: Point2::new(x1.min(x2), y1.min(y2)),
            max: Point2::new(x1.max(x2), y1.max(y2)),
        }
    }

    #[inline]
    pub fn min(&self) -> Point2<f64> {
        self.min
    }

    #[inline]
    pub fn max(&self) -> Point2<f64> {
        self.max
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// True when every corner is finite and the area is not empty.
    pub fn is_usable(&self) -> bool {
        self.min.iter().chain(self.max.iter()).all(|v| v.is_finite())
            && self.width() > 0.0
            && self.height() > 0.0
    }

    /// Maps normalised device coordinates to screen coordinates.
    pub fn to_screen(&self, ndc: &Point3<f64>) -> Point2<f64> {
        Point2::new(
            self.min.x + (ndc.x + 1.0) * 0.5 * self.width(),
            self.min.y + (1.0 - ndc.y) * 0.5 * self.height(),
        )
    }

    pub fn contains(&self, point: &Point2<f64>) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            min: self.min,
            max: self.max,
        }
    }
}

/// Axis-aligned screen bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl Bounds {
    pub fn from_points(points: &[Point2<f64>]) -> Self {
        let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Self { min, max }
    }

    /// True if the boxes share any point (touching counts).
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    pub fn extent(&self) -> f64 {
        (self.max.x - self.min.x).max(self.max.y - self.min.y)
    }
}

/// Screen-space representation of a live fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Projected {
    /// Screen position of every vertex.
    pub screen: Vec<Point2<f64>>,
    /// Projected depth of every vertex. Grows with distance; planar
    /// fragments stay planar in (screen x, screen y, projected depth).
    pub proj_depth: Vec<f64>,
    /// Convex outline covered on screen. Equal to `screen` except for
    /// markers, which cover a square.
    pub footprint: Vec<Point2<f64>>,
    pub bounds: Bounds,
    /// Nearest view-space distance of any vertex.
    pub depth_min: f64,
    /// Farthest view-space distance of any vertex.
    pub depth_max: f64,
    /// Mean view-space distance, the painter's sort key.
    pub depth: f64,
    /// View-space plane of polygon fragments.
    pub plane: Option<Plane3D>,
}

/// Why a fragment did not make it into the screen cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Outside the viewport or the camera depth range.
    Clipped,
    /// No visible extent, or non-finite coordinates.
    Degenerate,
}

/// Restricts a view-space fragment to the camera depth range.
///
/// Fragments completely in front of the near plane or behind the far plane
/// are rejected. Fragments crossing the near plane are cut there; crossing
/// the far plane is allowed.
pub(crate) fn clip_depth(fragment: Fragment, near: f64, far: f64) -> Result<Fragment, Rejection> {
    let vertices = fragment.vertices();
    if vertices.iter().any(|p| !p.coords.iter().all(|c| c.is_finite())) {
        return Err(Rejection::Degenerate);
    }
    if vertices.iter().all(|p| view_depth(p) > far) {
        return Err(Rejection::Clipped);
    }

    // signed distance = view depth - near; positive side is visible
    let Some(near_plane) = Plane3D::new(Vector3::new(0.0, 0.0, -1.0), near) else {
        return Ok(fragment);
    };
    match near_plane.classify_points(vertices, PLANE_EPSILON) {
        Classification::Front | Classification::Coplanar => Ok(fragment),
        Classification::Back => Err(Rejection::Clipped),
        Classification::Spanning => match fragment.shape() {
            Shape::Polygon { polygon, surface } => {
                let (visible, _) = polygon.cut(&near_plane, PLANE_EPSILON);
                let polygon = visible.ok_or(Rejection::Clipped)?;
                Ok(Fragment::polygon(polygon, *surface).inherit(&fragment))
            }
            Shape::Segment { segment, line } => {
                let (visible, _) = segment.cut(&near_plane, PLANE_EPSILON);
                let segment = visible.ok_or(Rejection::Clipped)?;
                Ok(Fragment::segment(segment, *line).inherit(&fragment))
            }
            // a single point cannot span a plane
            Shape::Marker { .. } => Ok(fragment),
        },
    }
}

/// Projects a view-space fragment onto the viewport.
pub(crate) fn project_fragment(
    fragment: &Fragment,
    camera: &dyn Camera,
    viewport: &Viewport,
    line_scale: f64,
    screen_epsilon: f64,
) -> Result<Projected, Rejection> {
    let vertices = fragment.vertices();
    let mut screen = Vec::with_capacity(vertices.len());
    let mut proj_depth = Vec::with_capacity(vertices.len());

    for vertex in vertices {
        let ndc = camera.project(vertex);
        let point = viewport.to_screen(&ndc);
        if !(point.x.is_finite() && point.y.is_finite() && ndc.z.is_finite()) {
            return Err(Rejection::Degenerate);
        }
        screen.push(point);
        proj_depth.push(ndc.z);
    }

    let mut plane = None;
    let footprint = match fragment.shape() {
        Shape::Polygon { polygon, .. } => {
            let bounds = Bounds::from_points(&screen);
            if polygon_area(&screen).abs() <= screen_epsilon * bounds.extent().max(1.0) {
                return Err(Rejection::Degenerate);
            }
            plane = Some(polygon.plane().ok_or(Rejection::Degenerate)?);
            screen.clone()
        }
        Shape::Segment { .. } => {
            if (screen[1] - screen[0]).norm() <= screen_epsilon {
                return Err(Rejection::Degenerate);
            }
            screen.clone()
        }
        Shape::Marker { marker, .. } => {
            let half = (marker.size * line_scale * 0.5).max(MIN_MARKER_HALF_SIZE);
            let c = screen[0];
            vec![
                Point2::new(c.x - half, c.y - half),
                Point2::new(c.x + half, c.y - half),
                Point2::new(c.x + half, c.y + half),
                Point2::new(c.x - half, c.y + half),
            ]
        }
    };

    let bounds = Bounds::from_points(&footprint);
    if !bounds.intersects(&viewport.bounds()) {
        return Err(Rejection::Clipped);
    }

    let depths = vertices.iter().map(view_depth);
    let depth_min = depths.clone().fold(f64::INFINITY, f64::min);
    let depth_max = depths.clone().fold(f64::NEG_INFINITY, f64::max);
    let depth = depths.sum::<f64>() / vertices.len() as f64;

    Ok(Projected {
        screen,
        proj_depth,
        footprint,
        bounds,
        depth_min,
        depth_max,
        depth,
        plane,
    })
}

/// Signed area of a 2D polygon (shoelace formula).
pub(crate) fn polygon_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    let mut twice = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        twice += a.x * b.y - b.x * a.y;
    }
    twice * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, LineStyle, MarkerShape, MarkerStyle, OrthographicCamera, Polygon, Segment, SurfaceStyle};

    // Orthographic camera at the origin looking down -Z, showing [-10, 10]²
    // on a 200 x 200 viewport: one world unit is ten pixels.
    fn camera() -> OrthographicCamera {
        OrthographicCamera::look_at(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, -1.0),
            Vector3::y(),
            10.0,
            1.0,
            1.0,
            100.0,
        )
    }

    fn viewport() -> Viewport {
        Viewport::new(0.0, 0.0, 200.0, 200.0)
    }

    fn make_quad(x0: f64, y0: f64, size: f64, depth: f64) -> Fragment {
        Fragment::polygon(
            Polygon::quad(
                Point3::new(x0, y0, -depth),
                Point3::new(x0 + size, y0, -depth),
                Point3::new(x0 + size, y0 + size, -depth),
                Point3::new(x0, y0 + size, -depth),
            ),
            SurfaceStyle::filled(Color::WHITE),
        )
    }

    #[test]
    fn viewport_normalizes_corners() {
        let vp = Viewport::new(100.0, 50.0, 0.0, 0.0);
        assert_eq!(vp.min(), Point2::new(0.0, 0.0));
        assert_eq!(vp.max(), Point2::new(100.0, 50.0));
        assert!(vp.is_usable());
        assert!(!Viewport::new(0.0, 0.0, 0.0, 10.0).is_usable());
        assert!(!Viewport::new(0.0, 0.0, f64::NAN, 10.0).is_usable());
    }

    #[test]
    fn to_screen_flips_y() {
        let vp = viewport();
        let top_left = vp.to_screen(&Point3::new(-1.0, 1.0, 0.0));
        assert_eq!(top_left, Point2::new(0.0, 0.0));
        let center = vp.to_screen(&Point3::new(0.0, 0.0, 0.0));
        assert_eq!(center, Point2::new(100.0, 100.0));
    }

    #[test]
    fn projects_quad_to_screen() {
        let projected =
            project_fragment(&make_quad(0.0, 0.0, 1.0, 5.0), &camera(), &viewport(), 1.0, 1e-6)
                .unwrap();
        assert_eq!(projected.screen.len(), 4);
        assert!((projected.screen[0].x - 100.0).abs() < 1e-9);
        assert!((projected.screen[2].y - 90.0).abs() < 1e-9);
        assert!((projected.depth - 5.0).abs() < 1e-12);
        assert_eq!(projected.depth_min, projected.depth_max);
        assert!(projected.plane.is_some());
    }

    #[test]
    fn quad_outside_viewport_is_clipped() {
        let far_right = make_quad(50.0, 0.0, 1.0, 5.0);
        assert_eq!(
            project_fragment(&far_right, &camera(), &viewport(), 1.0, 1e-6),
            Err(Rejection::Clipped)
        );
    }

    #[test]
    fn edge_on_polygon_is_degenerate() {
        let edge_on = Fragment::polygon(
            Polygon::quad(
                Point3::new(0.0, 0.0, -2.0),
                Point3::new(1.0, 0.0, -2.0),
                Point3::new(1.0, 0.0, -4.0),
                Point3::new(0.0, 0.0, -4.0),
            ),
            SurfaceStyle::filled(Color::WHITE),
        );
        assert_eq!(
            project_fragment(&edge_on, &camera(), &viewport(), 1.0, 1e-6),
            Err(Rejection::Degenerate)
        );
    }

    #[test]
    fn marker_footprint_uses_scaled_size() {
        let marker = Fragment::marker(
            Point3::new(0.0, 0.0, -3.0),
            MarkerStyle::new(MarkerShape::Square, 4.0, Color::BLACK),
        );
        let projected = project_fragment(&marker, &camera(), &viewport(), 2.0, 1e-6).unwrap();
        assert_eq!(projected.footprint.len(), 4);
        assert!((projected.bounds.extent() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn near_plane_cuts_crossing_segment() {
        let seg = Fragment::segment(
            Segment::new(Point3::new(0.0, 0.0, 1.0), Point3::new(0.0, 0.0, -9.0)),
            LineStyle::new(Color::BLACK, 1.0),
        );
        let clipped = clip_depth(seg, 1.0, 100.0).unwrap();
        let s = clipped.as_segment().unwrap();
        assert!((view_depth(&s.start()) - 1.0).abs() < 1e-9 || (view_depth(&s.end()) - 1.0).abs() < 1e-9);
        assert!(s.points().iter().all(|p| view_depth(p) >= 1.0 - 1e-9));
    }

    #[test]
    fn depth_clipping_rejects_out_of_range() {
        assert_eq!(
            clip_depth(make_quad(0.0, 0.0, 1.0, 0.5), 1.0, 100.0),
            Err(Rejection::Clipped)
        );
        assert_eq!(
            clip_depth(make_quad(0.0, 0.0, 1.0, 500.0), 1.0, 100.0),
            Err(Rejection::Clipped)
        );
        assert!(clip_depth(make_quad(0.0, 0.0, 1.0, 50.0), 1.0, 100.0).is_ok());
    }

    #[test]
    fn shoelace_area() {
        let square = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        assert_eq!(polygon_area(&square), 4.0);
    }
}
