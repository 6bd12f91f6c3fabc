//! Depth-ordered rendering of fragment scenes.
//!
//! A [`Scene`] turns the fragments of an object graph into an ordered list of
//! drawing commands. Each [`Scene::render`] call runs the same pipeline:
//!
//! 1. collect fragments from the object graph and move them to view space
//! 2. clip them to the camera depth range and project them onto the
//!    viewport, dropping anything invisible or degenerate
//! 3. order them back-to-front with the [`RenderMode`] chosen at construction
//! 4. emit drawing commands in that order
//!
//! # Architecture
//!
//! - `project`: clipping, projection and the per-fragment screen cache
//! - `intersect`: pairwise relations and splitting of interpenetrating pairs
//! - `order`: painter's sort, the BSP sweep and local re-sorting after splits
//! - `emit`: viewport clipping and translation to [`DrawSurface`] calls
//! - `dump`: diagnostic listings
//!
//! Fragments live in one arena and are referred to by index everywhere. A
//! split appends the pieces to the arena and marks the parent as no longer
//! live, so indices handed out earlier never dangle.

mod dump;
mod emit;
mod intersect;
mod order;
mod project;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::objects::{collect_all, collect_names};
use crate::{
    Camera, ConfigError, DrawSurface, Fragment, ObjectId, ParseModeError, SceneConfig, SceneObject,
    Viewer,
};

pub use intersect::Relation;
pub use project::{Bounds, Projected, Rejection, Viewport};

/// How a scene orders fragments before drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Sort by mean depth, farthest first. Fast; wrong for fragments that
    /// overlap in depth and on screen.
    #[default]
    Painters,
    /// Resolve overlapping pairs individually, splitting fragments that
    /// pass through each other.
    Bsp,
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Painters => f.write_str("painters"),
            RenderMode::Bsp => f.write_str("bsp"),
        }
    }
}

impl FromStr for RenderMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "painters" | "painter" => Ok(RenderMode::Painters),
            "bsp" => Ok(RenderMode::Bsp),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

/// Counters describing the last render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Fragments produced by the object graph.
    pub input: usize,
    /// Fragments outside the viewport or camera depth range.
    pub clipped: usize,
    /// Fragments with no visible extent or non-finite coordinates.
    pub degenerate: usize,
    /// Split operations performed.
    pub splits: usize,
    /// Pairs ordered by the fallback comparison because they could not be
    /// split any further.
    pub unresolved: usize,
    /// Fragments in the final draw order.
    pub drawn: usize,
    /// Commands sent to the drawing surface.
    pub commands: usize,
}

/// Tolerances resolved against the size of the current scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Epsilons {
    /// View-space distance to a plane counted as "on" it.
    pub plane: f64,
    /// View-space length two polygons must share to interpenetrate.
    pub intersection: f64,
    /// View-space depth difference counted as equal.
    pub depth: f64,
    /// Projected depth difference counted as equal.
    pub proj_depth: f64,
    /// Screen overlap below which footprints do not interact.
    pub screen: f64,
}

impl Default for Epsilons {
    fn default() -> Self {
        Self {
            plane: crate::PLANE_EPSILON,
            intersection: crate::PLANE_EPSILON,
            depth: crate::PLANE_EPSILON,
            proj_depth: crate::PLANE_EPSILON,
            screen: crate::PLANE_EPSILON,
        }
    }
}

/// Per-render state shared by the pipeline stages.
#[derive(Debug, Clone, Copy)]
struct Frame {
    viewport: Viewport,
    viewer: Viewer,
    eps: Epsilons,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            viewport: Viewport::new(0.0, 0.0, 1.0, 1.0),
            viewer: Viewer::Direction(nalgebra::Vector3::new(0.0, 0.0, -1.0)),
            eps: Epsilons::default(),
        }
    }
}

/// Owns the fragment arena and draw order for one render call at a time.
///
/// The buffers are rebuilt from scratch by every call to [`Scene::render`];
/// between calls they still hold the last render for inspection.
#[derive(Debug)]
pub struct Scene {
    mode: RenderMode,
    config: SceneConfig,
    /// View-space fragments. Index = identity.
    fragments: Vec<Fragment>,
    /// Screen cache, `None` for fragments that were never visible.
    projected: Vec<Option<Projected>>,
    /// Validity flags: false for dropped or superseded fragments.
    live: Vec<bool>,
    /// Back-to-front permutation of the live fragment indices.
    draw_order: Vec<usize>,
    /// Names of the objects walked by the last render.
    names: BTreeMap<ObjectId, String>,
    frame: Frame,
    stats: RenderStats,
}

impl Scene {
    /// Creates a scene with the default configuration.
    pub fn new(mode: RenderMode) -> Self {
        Self {
            mode,
            config: SceneConfig::default(),
            fragments: Vec::new(),
            projected: Vec::new(),
            live: Vec::new(),
            draw_order: Vec::new(),
            names: BTreeMap::new(),
            frame: Frame::default(),
            stats: RenderStats::default(),
        }
    }

    /// Creates a scene with a custom configuration.
    pub fn with_config(mode: RenderMode, config: SceneConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut scene = Self::new(mode);
        scene.config = config;
        Ok(scene)
    }

    #[inline]
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    #[inline]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Renders the object graph below `root` onto `surface`.
    ///
    /// `(x1, y1)` and `(x2, y2)` are opposite corners of the target
    /// rectangle in surface coordinates.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        root: &dyn SceneObject,
        surface: &mut dyn DrawSurface,
        camera: &dyn Camera,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    ) -> RenderStats {
        let mut fragments = Vec::new();
        collect_all(root, &mut fragments);
        let mut names = BTreeMap::new();
        collect_names(root, &mut names);
        let stats = self.render_fragments(fragments, surface, camera, Viewport::new(x1, y1, x2, y2));
        self.names = names;
        stats
    }

    /// Renders an already collected list of world-space fragments.
    pub fn render_fragments(
        &mut self,
        fragments: Vec<Fragment>,
        surface: &mut dyn DrawSurface,
        camera: &dyn Camera,
        viewport: Viewport,
    ) -> RenderStats {
        self.reset();
        self.stats.input = fragments.len();

        if !viewport.is_usable() {
            warn!(?viewport, "viewport is empty or not finite, nothing drawn");
            return self.stats;
        }

        self.frame = Frame {
            viewport,
            viewer: camera.viewer(),
            eps: Epsilons::default(),
        };
        self.project_fragments(fragments, camera);

        match self.mode {
            RenderMode::Painters => self.render_painters(),
            RenderMode::Bsp => self.render_bsp(camera),
        }

        self.stats.drawn = self.draw_order.len();
        self.stats.commands = self.do_drawing(surface);

        debug!(
            mode = %self.mode,
            input = self.stats.input,
            clipped = self.stats.clipped,
            degenerate = self.stats.degenerate,
            splits = self.stats.splits,
            unresolved = self.stats.unresolved,
            commands = self.stats.commands,
            "scene rendered"
        );
        self.stats
    }

    /// All fragments of the last render in view space, including dropped
    /// and superseded ones.
    #[inline]
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// True if fragment `idx` takes part in the draw order.
    #[inline]
    pub fn is_live(&self, idx: usize) -> bool {
        self.live.get(idx).copied().unwrap_or(false)
    }

    /// Screen cache of fragment `idx`, if it was ever visible.
    #[inline]
    pub fn projected(&self, idx: usize) -> Option<&Projected> {
        self.projected.get(idx).and_then(Option::as_ref)
    }

    /// Fragment indices in paint order, farthest first.
    #[inline]
    pub fn draw_order(&self) -> &[usize] {
        &self.draw_order
    }

    /// Counters of the last render.
    #[inline]
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    fn reset(&mut self) {
        self.fragments.clear();
        self.projected.clear();
        self.live.clear();
        self.draw_order.clear();
        self.names.clear();
        self.frame = Frame::default();
        self.stats = RenderStats::default();
    }

    /// Moves fragments into view space, clips and projects them, and sizes
    /// the tolerances to the visible scene.
    fn project_fragments(&mut self, fragments: Vec<Fragment>, camera: &dyn Camera) {
        let view = camera.view_transform();
        let (near, far) = camera.depth_range();

        for (index, mut fragment) in fragments.into_iter().enumerate() {
            fragment.set_origin(index);
            let fragment = fragment.map_vertices(|p| view * p);
            let outcome = project::clip_depth(fragment.clone(), near, far).and_then(|clipped| {
                let projected = self.project_one(&clipped, camera)?;
                Ok((clipped, projected))
            });

            match outcome {
                Ok((clipped, projected)) => {
                    self.fragments.push(clipped);
                    self.projected.push(Some(projected));
                    self.live.push(true);
                }
                Err(rejection) => {
                    match rejection {
                        Rejection::Clipped => self.stats.clipped += 1,
                        Rejection::Degenerate => self.stats.degenerate += 1,
                    }
                    self.fragments.push(fragment);
                    self.projected.push(None);
                    self.live.push(false);
                }
            }
        }

        self.frame.eps = self.resolve_tolerances();
    }

    fn project_one(&self, fragment: &Fragment, camera: &dyn Camera) -> Result<Projected, Rejection> {
        project::project_fragment(
            fragment,
            camera,
            &self.frame.viewport,
            self.config.line_scale,
            self.config.tolerances.screen_epsilon,
        )
    }

    /// Scales the relative tolerances by the extent of the live fragments.
    fn resolve_tolerances(&self) -> Epsilons {
        let mut lo = nalgebra::Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut hi = nalgebra::Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        let mut proj_lo = f64::INFINITY;
        let mut proj_hi = f64::NEG_INFINITY;

        for (fragment, projected) in self.fragments.iter().zip(&self.projected) {
            let Some(projected) = projected else { continue };
            for v in fragment.vertices() {
                lo = lo.inf(v);
                hi = hi.sup(v);
            }
            for z in &projected.proj_depth {
                proj_lo = proj_lo.min(*z);
                proj_hi = proj_hi.max(*z);
            }
        }

        let size = hi - lo;
        let extent = size.x.max(size.y).max(size.z);
        // a single point or an empty scene still needs non-zero tolerances
        let extent = if extent.is_finite() && extent > 0.0 { extent } else { 1.0 };
        let depth_span = if size.z.is_finite() && size.z > 0.0 { size.z } else { extent };
        let proj_span = proj_hi - proj_lo;
        let proj_span = if proj_span.is_finite() && proj_span > 0.0 { proj_span } else { 1.0 };

        let tol = &self.config.tolerances;
        Epsilons {
            plane: tol.plane_epsilon * extent,
            intersection: tol.intersection_epsilon * extent,
            depth: tol.depth_epsilon * depth_span,
            proj_depth: tol.depth_epsilon * proj_span,
            screen: tol.screen_epsilon,
        }
    }

    /// Appends a split piece to the arena. Returns whether it is visible.
    fn push_fragment(&mut self, fragment: Fragment, camera: &dyn Camera) -> bool {
        let projected = self.project_one(&fragment, camera).ok();
        let live = projected.is_some();
        self.fragments.push(fragment);
        self.projected.push(projected);
        self.live.push(live);
        live
    }

    fn render_painters(&mut self) {
        self.sort_painters();
    }

    fn render_bsp(&mut self, camera: &dyn Camera) {
        self.order_bsp(camera);
    }
}
