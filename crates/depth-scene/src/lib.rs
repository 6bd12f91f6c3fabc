//! Depth-correct rendering of 3D fragment scenes onto 2D drawing surfaces.
//!
//! Scene objects tessellate themselves into flat [`Fragment`]s (polygons,
//! line segments and point markers). A [`Scene`] projects them through a
//! [`Camera`], orders them back-to-front and replays them on a
//! [`DrawSurface`]. Two orderings are available:
//!
//! - [`RenderMode::Painters`] sorts by mean depth
//! - [`RenderMode::Bsp`] compares overlapping pairs and splits fragments
//!   that pass through each other, so interpenetrating surfaces are drawn
//!   correctly
//!
//! # Example
//!
//! ```ignore
//! use depth_scene::{CommandRecorder, FragmentList, ObjectId, PerspectiveCamera, RenderMode, Scene};
//!
//! let root = FragmentList::new("surface", ObjectId(1), fragments);
//! let camera = PerspectiveCamera::look_at(eye, target, up, fovy, 1.0, 0.1, 100.0);
//! let mut surface = CommandRecorder::new();
//!
//! let mut scene = Scene::new(RenderMode::Bsp);
//! let stats = scene.render(&root, &mut surface, &camera, 0.0, 0.0, 640.0, 480.0);
//! ```

mod camera;
mod config;
mod cuttable;
mod error;
mod fragment;
mod objects;
mod plane;
mod polygon;
pub mod scene;
mod segment;
mod surface;

pub use camera::{view_depth, Camera, OrthographicCamera, PerspectiveCamera, Viewer};
pub use config::{SceneConfig, Tolerances};
pub use cuttable::Cuttable;
pub use error::{ConfigError, ParseModeError};
pub use fragment::{
    Color, Fragment, FragmentKind, LineStyle, MarkerShape, MarkerStyle, ObjectId, Shape,
    SurfaceStyle,
};
pub use objects::{collect_all, FragmentList, ObjectGroup, SceneObject};
pub use plane::{Classification, Plane3D, PlaneSide, PLANE_EPSILON};
pub use polygon::Polygon;
pub use scene::{Bounds, Projected, Relation, RenderMode, RenderStats, Scene, Viewport};
pub use segment::Segment;
pub use surface::{CommandRecorder, DrawCommand, DrawSurface};
