use alpaca_viewer::camera::{Camera, DragMode, OrbitController, Projection};
use cgmath::{Deg, EuclideanSpace, InnerSpace, Point3};
use winit::event::MouseScrollDelta;

const EPS: f32 = 1e-4;

#[test]
fn should_set_aspect_to_exactly_width_over_height() {
    let mut projection = Projection::new(800, 600, Deg(45.0), 0.1, 1000.0);
    assert_eq!(projection.aspect(), 800.0 / 600.0);

    for (width, height) in [(1920, 1080), (333, 777), (1, 1), (4096, 17)] {
        projection.resize(width, height);
        assert_eq!(projection.aspect(), width as f32 / height as f32);
    }
}

#[test]
fn should_ignore_zero_sized_resizes() {
    let mut projection = Projection::new(1024, 512, Deg(45.0), 0.1, 1000.0);
    projection.resize(0, 0);
    projection.resize(0, 300);
    assert_eq!(projection.aspect(), 2.0);
}

#[test]
fn should_start_where_it_was_placed() {
    let camera = Camera::looking_at([10.0, 10.0, 10.0], [0.0, 0.0, 0.0]);
    let position = camera.position();
    assert!((position - Point3::new(10.0, 10.0, 10.0)).magnitude() < EPS);
    assert!((camera.distance - 300.0_f32.sqrt()).abs() < EPS);
    assert_eq!(camera.target, Point3::origin());
}

#[test]
fn should_orbit_only_while_dragging() {
    let mut camera = Camera::looking_at([10.0, 10.0, 10.0], [0.0, 0.0, 0.0]);
    let start = camera;
    let mut controller = OrbitController::new(0.005, 0.1);

    controller.handle_mouse(100.0, 0.0);
    controller.update(&mut camera);
    assert_eq!(camera, start);

    controller.begin_drag(DragMode::Orbit);
    controller.handle_mouse(100.0, 0.0);
    controller.update(&mut camera);
    assert_ne!(camera.yaw, start.yaw);
    assert!((camera.distance - start.distance).abs() < EPS);
    assert_eq!(camera.target, start.target);

    controller.end_drag();
    assert_eq!(controller.dragging(), None);
}

#[test]
fn should_clamp_pitch_short_of_the_poles() {
    let mut camera = Camera::looking_at([10.0, 10.0, 10.0], [0.0, 0.0, 0.0]);
    let mut controller = OrbitController::new(0.005, 0.1);
    controller.begin_drag(DragMode::Orbit);
    controller.handle_mouse(0.0, 100_000.0);
    controller.update(&mut camera);
    assert!(camera.pitch.0 < std::f32::consts::FRAC_PI_2);
    assert!(camera.pitch.0 > 1.5);
}

#[test]
fn should_zoom_within_limits() {
    let mut camera = Camera::looking_at([10.0, 10.0, 10.0], [0.0, 0.0, 0.0]);
    let mut controller = OrbitController::new(0.005, 0.1);

    controller.handle_scroll(&MouseScrollDelta::LineDelta(0.0, 1.0));
    controller.update(&mut camera);
    assert!(camera.distance < 300.0_f32.sqrt());

    controller.handle_scroll(&MouseScrollDelta::LineDelta(0.0, 1000.0));
    controller.update(&mut camera);
    assert_eq!(camera.distance, 1.0);

    controller.handle_scroll(&MouseScrollDelta::LineDelta(0.0, -1000.0));
    controller.update(&mut camera);
    assert_eq!(camera.distance, 500.0);
}

#[test]
fn should_pan_the_target() {
    let mut camera = Camera::looking_at([10.0, 10.0, 10.0], [0.0, 0.0, 0.0]);
    let mut controller = OrbitController::new(0.005, 0.1);
    controller.begin_drag(DragMode::Pan);
    controller.handle_mouse(50.0, 0.0);
    controller.update(&mut camera);
    assert!(camera.target.to_vec().magnitude() > 0.0);
    assert!((camera.target.y).abs() < EPS);
}
