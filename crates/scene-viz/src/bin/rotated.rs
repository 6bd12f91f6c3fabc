use depth_scene::{Fragment, FragmentList, ObjectGroup, ObjectId, RenderMode};
use macroquad::prelude::*;
use nalgebra::{Point3, Rotation3, Unit, Vector3};
use scene_viz::{generate_rotated_cube, init_tracing, OrbitCamera, SceneControls};
use tracing::info;

const NUM_CUBES: usize = 10;
const WORLD_SIZE: f64 = 30.0;
const MIN_CUBE_SIZE: f64 = 3.0;
const MAX_CUBE_SIZE: f64 = 8.0;

/// Simple seeded random number generator (LCG).
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((self.state >> 33) as f64) / (u32::MAX as f64 / 2.0)
    }

    fn range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }
}

/// Generates random rotated cubes, one object per cube.
fn generate_random_rotated_cubes(seed: u64) -> ObjectGroup {
    let mut rng = Rng::new(seed);
    let mut root = ObjectGroup::new("cubes", ObjectId(0));

    for i in 0..NUM_CUBES {
        let x = (rng.next_f64() - 0.5) * WORLD_SIZE;
        let y = (rng.next_f64() - 0.5) * WORLD_SIZE;
        let z = (rng.next_f64() - 0.5) * WORLD_SIZE;
        let center = Point3::new(x, y, z);

        let size = rng.range(MIN_CUBE_SIZE, MAX_CUBE_SIZE);

        let axis = Vector3::new(rng.next_f64() - 0.5, rng.next_f64() - 0.5, rng.next_f64() - 0.5);
        let axis = if axis.norm() > 0.01 {
            Unit::new_normalize(axis)
        } else {
            Unit::new_normalize(Vector3::new(1.0, 0.0, 0.0))
        };

        let angle = rng.next_f64() * std::f64::consts::TAU;
        let rotation = Rotation3::from_axis_angle(&axis, angle);

        let faces: Vec<Fragment> = generate_rotated_cube(center, size, &rotation);
        root.push(FragmentList::new(format!("cube {i}"), ObjectId(i as u32 + 1), faces));
    }

    root
}

#[macroquad::main("Depth Scene Rotated Cubes")]
async fn main() {
    init_tracing();

    let root = generate_random_rotated_cubes(42);
    info!(cubes = NUM_CUBES, polygons = NUM_CUBES * 6, "generated random rotated cubes");

    let mut camera = OrbitCamera::new(50.0, 0.0, 0.3).with_zoom(3.0, 10.0, 150.0);
    let mut controls = SceneControls::new(RenderMode::Bsp);

    loop {
        camera.update();
        controls.update();

        clear_background(Color::from_rgba(15, 15, 25, 255));
        let stats = controls.render(&root, &camera);

        draw_text(
            &format!("Depth Scene Rotated Cubes - {} fragments drawn", stats.drawn),
            10.0,
            25.0,
            20.0,
            WHITE,
        );
        controls.draw_ui(50.0);

        draw_text("Drag mouse to rotate, scroll to zoom", 10.0, 135.0, 16.0, DARKGRAY);
        draw_text(&format!("FPS: {}", get_fps()), 10.0, 155.0, 16.0, DARKGRAY);

        next_frame().await
    }
}
