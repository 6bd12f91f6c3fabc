use depth_scene::{Fragment, FragmentList, ObjectGroup, ObjectId, Polygon, RenderMode};
use macroquad::prelude::*;
use nalgebra::{Point3, Rotation3, Unit, Vector3};
use scene_viz::{face_style, generate_axes, generate_cube, generate_rotated_cube, init_tracing, OrbitCamera, SceneControls};
use tracing::info;

/// Generates the complex scene with two cubes, a floor polygon and axes.
fn generate_complex_scene() -> ObjectGroup {
    // First cube: rotated around all three axes
    let rot_x = Rotation3::from_axis_angle(&Unit::new_normalize(Vector3::x()), 0.3);
    let rot_y = Rotation3::from_axis_angle(&Unit::new_normalize(Vector3::y()), 0.4);
    let rot_z = Rotation3::from_axis_angle(&Unit::new_normalize(Vector3::z()), 0.25);
    let rotation = rot_z * rot_y * rot_x;
    let rotated = generate_rotated_cube(Point3::new(-0.6, 0.0, 0.0), 0.8, &rotation);

    // Second cube: axis-aligned, close enough to the first to interpenetrate
    let aligned = generate_cube(Point3::new(0.0, 0.0, 0.0), 0.8);

    // Floor polygon at y = -0.5, cut by both cubes
    let floor = Polygon::quad(
        Point3::new(-1.5, -0.5, -1.5),
        Point3::new(1.5, -0.5, -1.5),
        Point3::new(1.5, -0.5, 1.5),
        Point3::new(-1.5, -0.5, 1.5),
    );
    let floor_style = face_style(&floor);

    ObjectGroup::new("scene", ObjectId(0))
        .with_child(FragmentList::new("rotated cube", ObjectId(1), rotated))
        .with_child(FragmentList::new("aligned cube", ObjectId(2), aligned))
        .with_child(FragmentList::new(
            "floor",
            ObjectId(3),
            vec![Fragment::polygon(floor, floor_style)],
        ))
        .with_child(FragmentList::new("axes", ObjectId(4), generate_axes(1.0)))
}

#[macroquad::main("Depth Scene Complex")]
async fn main() {
    init_tracing();

    let root = generate_complex_scene();
    info!("created complex scene (2 cubes + floor + axes)");

    let mut camera = OrbitCamera::new(5.0, 0.4, 0.4).with_zoom(0.5, 2.0, 20.0);
    let mut controls = SceneControls::new(RenderMode::Bsp);

    loop {
        camera.update();
        controls.update();

        clear_background(Color::from_rgba(20, 20, 30, 255));
        let stats = controls.render(&root, &camera);

        draw_text(
            &format!("Depth Scene Complex - {} commands", stats.commands),
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
