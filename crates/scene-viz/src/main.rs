use depth_scene::{Fragment, FragmentList, ObjectGroup, ObjectId, Polygon};
use macroquad::prelude::*;
use nalgebra::Point3;
use scene_viz::{face_style, generate_axes, init_tracing, OrbitCamera, SceneControls};

/// Two squares crossing at 45 degrees plus the coordinate axes.
fn generate_crossing_scene() -> ObjectGroup {
    let upright = Polygon::quad(
        Point3::new(-2.0, -2.0, 0.0),
        Point3::new(2.0, -2.0, 0.0),
        Point3::new(2.0, 2.0, 0.0),
        Point3::new(-2.0, 2.0, 0.0),
    );
    let tilted = Polygon::quad(
        Point3::new(-1.5, -1.5, -1.5),
        Point3::new(1.5, -1.5, 1.5),
        Point3::new(1.5, 1.5, 1.5),
        Point3::new(-1.5, 1.5, -1.5),
    );

    let squares = [upright, tilted]
        .into_iter()
        .map(|polygon| {
            let style = face_style(&polygon);
            Fragment::polygon(polygon, style)
        })
        .collect();

    ObjectGroup::new("scene", ObjectId(0))
        .with_child(FragmentList::new("squares", ObjectId(1), squares))
        .with_child(FragmentList::new("axes", ObjectId(2), generate_axes(3.0)))
}

#[macroquad::main("Depth Scene")]
async fn main() {
    init_tracing();

    let root = generate_crossing_scene();
    let mut camera = OrbitCamera::new(9.0, 0.6, 0.35).with_zoom(0.5, 3.0, 40.0);
    let mut controls = SceneControls::default();

    loop {
        camera.update();
        controls.update();

        clear_background(Color::from_rgba(20, 20, 30, 255));
        controls.render(&root, &camera);

        draw_text("Depth Scene - crossing squares", 10.0, 25.0, 20.0, WHITE);
        controls.draw_ui(50.0);

        draw_text("Drag mouse to rotate, scroll to zoom", 10.0, 135.0, 16.0, DARKGRAY);
        draw_text(&format!("FPS: {}", get_fps()), 10.0, 155.0, 16.0, DARKGRAY);

        next_frame().await
    }
}
