//! Interactive rendering controls: mode switching, diagnostics and the HUD.

use depth_scene::{RenderMode, RenderStats, Scene, SceneObject};
use macroquad::prelude::*;
use tracing::info;

use crate::{MacroquadSurface, OrbitCamera};

/// Owns the depth-sorting scene used by a demo and maps keys to it.
pub struct SceneControls {
    scene: Scene,
    last: RenderStats,
}

impl Default for SceneControls {
    fn default() -> Self {
        Self::new(RenderMode::Bsp)
    }
}

impl SceneControls {
    /// Creates controls starting in `mode`.
    pub fn new(mode: RenderMode) -> Self {
        Self {
            scene: Scene::new(mode),
            last: RenderStats::default(),
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.scene.mode()
    }

    /// Statistics of the most recent frame.
    pub fn stats(&self) -> RenderStats {
        self.last
    }

    /// Handles keyboard input.
    /// Returns true if the render mode changed.
    pub fn update(&mut self) -> bool {
        let mut changed = false;

        if is_key_pressed(KeyCode::M) {
            let next = match self.scene.mode() {
                RenderMode::Painters => RenderMode::Bsp,
                RenderMode::Bsp => RenderMode::Painters,
            };
            info!(mode = %next, "render mode switched");
            self.scene = Scene::new(next);
            changed = true;
        }
        if is_key_pressed(KeyCode::D) {
            info!("fragments of the last frame:\n{}", self.scene.dump_fragments());
            info!("objects of the last frame:\n{}", self.scene.dump_objects());
        }

        changed
    }

    /// Renders `root` over the whole window as seen from `camera`.
    pub fn render(&mut self, root: &dyn SceneObject, camera: &OrbitCamera) -> RenderStats {
        let (width, height) = (screen_width() as f64, screen_height() as f64);
        let scene_camera = camera.to_scene_camera(width / height.max(1.0));
        let mut surface = MacroquadSurface;
        self.last = self
            .scene
            .render(root, &mut surface, &scene_camera, 0.0, 0.0, width, height);
        self.last
    }

    /// Draws the statistics overlay.
    pub fn draw_ui(&self, y_offset: f32) {
        let stats = &self.last;
        draw_text(
            &format!("Mode: {} | [M] to switch", self.scene.mode()),
            10.0,
            y_offset,
            18.0,
            YELLOW,
        );
        draw_text(
            &format!(
                "Fragments: {} in, {} drawn, {} clipped, {} degenerate",
                stats.input, stats.drawn, stats.clipped, stats.degenerate
            ),
            10.0,
            y_offset + 20.0,
            18.0,
            WHITE,
        );
        draw_text(
            &format!("Splits: {} | Unresolved: {}", stats.splits, stats.unresolved),
            10.0,
            y_offset + 40.0,
            18.0,
            if stats.unresolved > 0 { ORANGE } else { GREEN },
        );
        draw_text("[D]ump fragments to the log", 10.0, y_offset + 60.0, 16.0, DARKGRAY);
    }
}
