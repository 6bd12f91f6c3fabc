//! Shared visualization utilities for the depth-scene demos.

use std::hash::{Hash, Hasher};

use depth_scene::{
    Color as SceneColor, DrawSurface, Fragment, LineStyle, MarkerShape, MarkerStyle, PerspectiveCamera,
    Plane3D, Polygon, SurfaceStyle,
};
use macroquad::prelude::*;
use nalgebra::{Point2, Point3, Rotation3, Vector3};
use tracing_subscriber::EnvFilter;

pub mod controls;
pub use controls::SceneControls;

/// Installs a stderr log subscriber filtered by `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();
}

/// Generates a deterministic color from a polygon's vertices using hashing.
pub fn polygon_color(polygon: &Polygon) -> SceneColor {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    for v in polygon.vertices() {
        v.x.to_bits().hash(&mut hasher);
        v.y.to_bits().hash(&mut hasher);
        v.z.to_bits().hash(&mut hasher);
    }
    let hash = hasher.finish();

    let r = ((hash >> 16) & 0xFF) as u8;
    let g = ((hash >> 8) & 0xFF) as u8;
    let b = (hash & 0xFF) as u8;

    // keep colors away from the dark background
    SceneColor::rgb(r.max(40), g.max(40), b.max(40))
}

fn to_color(color: SceneColor) -> Color {
    Color::from_rgba(color.r, color.g, color.b, color.a)
}

fn to_vec2(p: &Point2<f64>) -> Vec2 {
    vec2(p.x as f32, p.y as f32)
}

/// Draws scene commands with macroquad's 2D primitives.
#[derive(Debug, Default)]
pub struct MacroquadSurface;

impl DrawSurface for MacroquadSurface {
    fn fill_path(&mut self, points: &[Point2<f64>], fill: Option<SceneColor>, edge: Option<LineStyle>) {
        let pts: Vec<Vec2> = points.iter().map(to_vec2).collect();
        if pts.len() < 3 {
            return;
        }
        // fan triangulation, the paths are convex
        if let Some(fill) = fill {
            let color = to_color(fill);
            for i in 1..pts.len() - 1 {
                draw_triangle(pts[0], pts[i], pts[i + 1], color);
            }
        }
        if let Some(edge) = edge {
            let color = to_color(edge.color);
            for (i, a) in pts.iter().enumerate() {
                let b = pts[(i + 1) % pts.len()];
                draw_line(a.x, a.y, b.x, b.y, edge.width as f32, color);
            }
        }
    }

    fn stroke_line(&mut self, from: Point2<f64>, to: Point2<f64>, line: LineStyle) {
        let (a, b) = (to_vec2(&from), to_vec2(&to));
        draw_line(a.x, a.y, b.x, b.y, line.width as f32, to_color(line.color));
    }

    fn draw_marker(&mut self, at: Point2<f64>, marker: MarkerStyle) {
        let c = to_vec2(&at);
        let half = (marker.size * 0.5) as f32;
        if let Some(fill) = marker.fill.map(to_color) {
            match marker.shape {
                MarkerShape::Circle => draw_circle(c.x, c.y, half, fill),
                MarkerShape::Square => draw_rectangle(c.x - half, c.y - half, 2.0 * half, 2.0 * half, fill),
                MarkerShape::Diamond => draw_poly(c.x, c.y, 4, half, 0.0, fill),
                MarkerShape::Cross => {
                    draw_line(c.x - half, c.y - half, c.x + half, c.y + half, 2.0, fill);
                    draw_line(c.x - half, c.y + half, c.x + half, c.y - half, 2.0, fill);
                }
            }
        }
        if let Some(edge) = marker.edge {
            let (color, width) = (to_color(edge.color), edge.width as f32);
            match marker.shape {
                MarkerShape::Circle => draw_circle_lines(c.x, c.y, half, width, color),
                MarkerShape::Square => {
                    draw_rectangle_lines(c.x - half, c.y - half, 2.0 * half, 2.0 * half, width, color)
                }
                MarkerShape::Diamond => draw_poly_lines(c.x, c.y, 4, half, 0.0, width, color),
                MarkerShape::Cross => {}
            }
        }
    }
}

/// Fill and outline for a demo polygon.
pub fn face_style(polygon: &Polygon) -> SurfaceStyle {
    SurfaceStyle::filled(polygon_color(polygon)).with_edge(LineStyle::new(SceneColor::rgb(20, 20, 30), 1.0))
}

/// Creates a coplanar quad by projecting the 4th vertex onto the plane.
/// This fixes floating-point precision issues that occur after rotation.
fn make_coplanar_quad(p0: Point3<f64>, p1: Point3<f64>, p2: Point3<f64>, p3: Point3<f64>) -> Polygon {
    let p3 = Plane3D::from_three_points(p0, p1, p2).map_or(p3, |plane| plane.project_point(p3));
    Polygon::quad(p0, p1, p2, p3)
}

/// Generates the 6 face fragments of a rotated cube.
pub fn generate_rotated_cube(center: Point3<f64>, size: f64, rotation: &Rotation3<f64>) -> Vec<Fragment> {
    let half = size / 2.0;

    let unit_corners = [
        Vector3::new(-half, -half, -half),
        Vector3::new(half, -half, -half),
        Vector3::new(half, half, -half),
        Vector3::new(-half, half, -half),
        Vector3::new(-half, -half, half),
        Vector3::new(half, -half, half),
        Vector3::new(half, half, half),
        Vector3::new(-half, half, half),
    ];

    let corners: Vec<Point3<f64>> = unit_corners.iter().map(|v| center + rotation * v).collect();

    let faces: [[usize; 4]; 6] = [
        [4, 5, 6, 7], // front (+Z)
        [1, 0, 3, 2], // back (-Z)
        [0, 4, 7, 3], // left (-X)
        [5, 1, 2, 6], // right (+X)
        [7, 6, 2, 3], // top (+Y)
        [0, 1, 5, 4], // bottom (-Y)
    ];

    faces
        .iter()
        .map(|indices| {
            let polygon = make_coplanar_quad(
                corners[indices[0]],
                corners[indices[1]],
                corners[indices[2]],
                corners[indices[3]],
            );
            let style = face_style(&polygon);
            Fragment::polygon(polygon, style)
        })
        .collect()
}

/// Generates the 6 face fragments of an axis-aligned cube.
pub fn generate_cube(center: Point3<f64>, size: f64) -> Vec<Fragment> {
    generate_rotated_cube(center, size, &Rotation3::identity())
}

/// Line fragments along the positive coordinate axes with a marker at the
/// origin.
pub fn generate_axes(length: f64) -> Vec<Fragment> {
    let origin = Point3::origin();
    let axes = [
        (Vector3::x(), SceneColor::rgb(230, 40, 40)),
        (Vector3::y(), SceneColor::rgb(40, 200, 40)),
        (Vector3::z(), SceneColor::rgb(60, 90, 240)),
    ];
    let mut fragments: Vec<Fragment> = axes
        .iter()
        .map(|(dir, color)| {
            Fragment::segment(
                depth_scene::Segment::new(origin, origin + dir * length),
                LineStyle::new(*color, 2.0),
            )
        })
        .collect();
    fragments.push(Fragment::marker(
        origin,
        MarkerStyle::new(MarkerShape::Circle, 6.0, SceneColor::WHITE),
    ));
    fragments
}

/// Simple orbit camera for 3D scene navigation.
pub struct OrbitCamera {
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub target: Vec3,
    /// Multiplier for scroll wheel zoom
    pub zoom_speed: f32,
    /// Minimum distance from target
    pub min_distance: f32,
    /// Maximum distance from target
    pub max_distance: f32,
    /// Vertical field of view in radians
    pub fovy: f32,
}

impl OrbitCamera {
    /// Creates a new orbit camera with the given configuration.
    pub fn new(distance: f32, yaw: f32, pitch: f32) -> Self {
        Self {
            distance,
            yaw,
            pitch,
            target: vec3(0.0, 0.0, 0.0),
            zoom_speed: 5.0,
            min_distance: 10.0,
            max_distance: 200.0,
            fovy: std::f32::consts::FRAC_PI_4,
        }
    }

    /// Sets the zoom configuration (speed and distance limits).
    pub fn with_zoom(mut self, speed: f32, min: f32, max: f32) -> Self {
        self.zoom_speed = speed;
        self.min_distance = min;
        self.max_distance = max;
        self
    }

    /// Sets the camera target point.
    pub fn with_target(mut self, target: Vec3) -> Self {
        self.target = target;
        self
    }

    /// Updates camera state from user input (mouse drag, scroll, arrow keys).
    pub fn update(&mut self) {
        if is_mouse_button_down(MouseButton::Left) {
            let delta = mouse_delta_position();
            self.yaw -= delta.x * 2.0;
            self.pitch -= delta.y * 2.0;
        }

        // Clamp pitch to avoid gimbal lock
        self.pitch = self.pitch.clamp(-1.5, 1.5);

        let scroll = mouse_wheel().1;
        self.distance -= scroll * self.zoom_speed;
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);

        if is_key_down(KeyCode::Left) {
            self.yaw += 0.02;
        }
        if is_key_down(KeyCode::Right) {
            self.yaw -= 0.02;
        }
        if is_key_down(KeyCode::Up) {
            self.pitch += 0.02;
        }
        if is_key_down(KeyCode::Down) {
            self.pitch -= 0.02;
        }
    }

    /// Returns the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + vec3(x, y, z)
    }

    /// Returns the eye point as a nalgebra Point3.
    pub fn eye_point(&self) -> Point3<f64> {
        let pos = self.position();
        Point3::new(pos.x as f64, pos.y as f64, pos.z as f64)
    }

    /// Builds the scene camera for a viewport with the given aspect ratio.
    /// The clip range follows the orbit distance so the whole scene stays
    /// inside it.
    pub fn to_scene_camera(&self, aspect: f64) -> PerspectiveCamera {
        let target = Point3::new(self.target.x as f64, self.target.y as f64, self.target.z as f64);
        let distance = self.distance as f64;
        PerspectiveCamera::look_at(
            self.eye_point(),
            target,
            Vector3::y(),
            self.fovy as f64,
            aspect,
            (distance * 0.01).max(1e-3),
            distance * 4.0 + self.max_distance as f64,
        )
    }
}
