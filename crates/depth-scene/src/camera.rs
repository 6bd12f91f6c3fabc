//! Camera abstraction: view transform, projection and viewer position.
//!
//! The scene works in *view space*: the viewer looks down the negative Z
//! axis, so the distance of a point along the view direction is `-z`. A
//! camera maps view space to normalised device coordinates where the visible
//! window is `[-1, 1]` in x and y and the projected z grows with distance.
//! Projections must map planes to planes (perspective and orthographic
//! projections both do), which lets the scene compare depths of flat
//! fragments directly in projected space.

use nalgebra::{Isometry3, Orthographic3, Perspective3, Point3, Vector3};

use crate::{Plane3D, PlaneSide};

/// Where the viewer sits, in view space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Viewer {
    /// Perspective viewing from a point.
    Eye(Point3<f64>),
    /// Parallel viewing along a direction (pointing away from the viewer).
    Direction(Vector3<f64>),
}

impl Viewer {
    /// Returns which side of `plane` faces the viewer.
    ///
    /// `OnPlane` means the plane is seen edge-on.
    pub fn side_of(&self, plane: &Plane3D, epsilon: f64) -> PlaneSide {
        match self {
            Viewer::Eye(eye) => plane.classify_point_with_epsilon(*eye, epsilon),
            Viewer::Direction(dir) => {
                // the viewer sits at -infinity along dir
                let facing = -plane.normal().dot(&dir.normalize());
                if facing > 1e-9 {
                    PlaneSide::Front
                } else if facing < -1e-9 {
                    PlaneSide::Back
                } else {
                    PlaneSide::OnPlane
                }
            }
        }
    }
}

/// Distance of a view-space point along the view direction.
#[inline]
pub fn view_depth(point: &Point3<f64>) -> f64 {
    -point.z
}

/// The camera collaborator used by [`Scene::render`](crate::Scene::render).
pub trait Camera {
    /// World to view space transform.
    fn view_transform(&self) -> Isometry3<f64>;

    /// Projects a view-space point to normalised device coordinates.
    ///
    /// Only called for points between the near and far distances.
    fn project(&self, point: &Point3<f64>) -> Point3<f64>;

    /// The viewer in view space.
    fn viewer(&self) -> Viewer;

    /// `(near, far)` distances along the view direction bounding the clip volume.
    fn depth_range(&self) -> (f64, f64);
}

/// A pinhole camera with a symmetric perspective frustum.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    view: Isometry3<f64>,
    projection: Perspective3<f64>,
}

impl PerspectiveCamera {
    /// Creates a camera at `eye` looking at `target`.
    ///
    /// `fovy` is the vertical field of view in radians and `aspect` the
    /// width / height ratio of the target viewport.
    pub fn look_at(
        eye: Point3<f64>,
        target: Point3<f64>,
        up: Vector3<f64>,
        fovy: f64,
        aspect: f64,
        znear: f64,
        zfar: f64,
    ) -> Self {
        Self {
            view: Isometry3::look_at_rh(&eye, &target, &up),
            projection: Perspective3::new(aspect, fovy, znear, zfar),
        }
    }
}

impl Camera for PerspectiveCamera {
    fn view_transform(&self) -> Isometry3<f64> {
        self.view
    }

    fn project(&self, point: &Point3<f64>) -> Point3<f64> {
        self.projection.project_point(point)
    }

    fn viewer(&self) -> Viewer {
        Viewer::Eye(Point3::origin())
    }

    fn depth_range(&self) -> (f64, f64) {
        (self.projection.znear(), self.projection.zfar())
    }
}

/// A camera with parallel projection.
#[derive(Debug, Clone)]
pub struct OrthographicCamera {
    view: Isometry3<f64>,
    projection: Orthographic3<f64>,
}

impl OrthographicCamera {
    /// Creates a camera at `eye` looking at `target` showing a window of
    /// `2 * half_height` world units vertically.
    pub fn look_at(
        eye: Point3<f64>,
        target: Point3<f64>,
        up: Vector3<f64>,
        half_height: f64,
        aspect: f64,
        znear: f64,
        zfar: f64,
    ) -> Self {
        let half_width = half_height * aspect;
        Self {
            view: Isometry3::look_at_rh(&eye, &target, &up),
            projection: Orthographic3::new(
                -half_width,
                half_width,
                -half_height,
                half_height,
                znear,
                zfar,
            ),
        }
    }
}

impl Camera for OrthographicCamera {
    fn view_transform(&self) -> Isometry3<f64> {
        self.view
    }

    fn project(&self, point: &Point3<f64>) -> Point3<f64> {
        self.projection.project_point(point)
    }

    fn viewer(&self) -> Viewer {
        Viewer::Direction(Vector3::new(0.0, 0.0, -1.0))
    }

    fn depth_range(&self) -> (f64, f64) {
        (self.projection.znear(), self.projection.zfar())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perspective() -> PerspectiveCamera {
        PerspectiveCamera::look_at(
            Point3::new(0.0, 0.0, 10.0),
            Point3::origin(),
            Vector3::y(),
            std::f64::consts::FRAC_PI_3,
            1.0,
            0.1,
            100.0,
        )
    }

    #[test]
    fn target_projects_to_center() {
        let cam = perspective();
        let view = cam.view_transform() * Point3::origin();
        assert!((view_depth(&view) - 10.0).abs() < 1e-9);
        let ndc = cam.project(&view);
        assert!(ndc.x.abs() < 1e-9 && ndc.y.abs() < 1e-9);
    }

    #[test]
    fn projected_depth_grows_with_distance() {
        let cam = perspective();
        let near = cam.project(&Point3::new(0.0, 0.0, -2.0));
        let far = cam.project(&Point3::new(0.0, 0.0, -20.0));
        assert!(far.z > near.z);

        let ortho = OrthographicCamera::look_at(
            Point3::new(0.0, 0.0, 10.0),
            Point3::origin(),
            Vector3::y(),
            5.0,
            1.0,
            0.1,
            100.0,
        );
        let near = ortho.project(&Point3::new(0.0, 0.0, -2.0));
        let far = ortho.project(&Point3::new(0.0, 0.0, -20.0));
        assert!(far.z > near.z);
    }

    #[test]
    fn viewer_sides() {
        // plane z = -5 facing the viewer
        let plane = Plane3D::new(Vector3::new(0.0, 0.0, 1.0), -5.0).unwrap();
        let eye = Viewer::Eye(Point3::origin());
        let dir = Viewer::Direction(Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(eye.side_of(&plane, 1e-9), PlaneSide::Front);
        assert_eq!(dir.side_of(&plane, 1e-9), PlaneSide::Front);
        assert_eq!(eye.side_of(&plane.flipped(), 1e-9), PlaneSide::Back);
        assert_eq!(dir.side_of(&plane.flipped(), 1e-9), PlaneSide::Back);

        let edge_on = Plane3D::new(Vector3::new(1.0, 0.0, 0.0), 0.0).unwrap();
        assert_eq!(dir.side_of(&edge_on, 1e-9), PlaneSide::OnPlane);
    }
}
