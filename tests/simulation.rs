//! Physics determinism, frame gating and camera placement.

use std::time::{Duration, Instant};

use fitch::core::TickGate;
use fitch::glam::Vec2;
use fitch::physics::{CoordinateMapper, PhysicsWorld, ShapeDescriptor};
use fitch::renderer::Camera2D;

fn run_world(steps: usize) -> Vec<Vec2> {
    let mapper = CoordinateMapper::new(100.0, Vec2::new(800.0, 600.0));
    let mut world = PhysicsWorld::new(Vec2::new(0.0, 0.8));

    world.create_static_body(
        mapper.to_sim_space(Vec2::new(0.0, 325.0)),
        ShapeDescriptor::cuboid(mapper.extent_to_sim(Vec2::new(400.0, 25.0))),
    );
    let bodies: Vec<_> = (0..3)
        .map(|i| {
            world.create_dynamic_body(
                mapper.to_sim_space(Vec2::new(-100.0 + 100.0 * i as f32, 0.0)),
                ShapeDescriptor::cuboid(mapper.extent_to_sim(Vec2::new(25.0, 50.0))),
            )
        })
        .collect();

    world.apply_force(bodies[0], Vec2::new(2.0, 0.0));
    world.apply_force(bodies[2], Vec2::new(0.0, -10.0));
    for _ in 0..steps {
        world.step(0.1, 30, 30);
    }

    bodies.iter().map(|b| world.position(*b).unwrap()).collect()
}

#[test]
fn test_physics_is_deterministic() {
    assert_eq!(run_world(2), run_world(2));
    assert_eq!(run_world(120), run_world(120));
}

#[test]
fn test_gate_fires_on_elapsed_period() {
    let start = Instant::now();
    let mut gate = TickGate::new(Duration::from_millis(16));

    // Redraws every 4 ms tick at 0, 16, 32, 48, 64, 80 and 96.
    let ticks: Vec<u64> = (0..100)
        .step_by(4)
        .filter(|&ms| gate.try_tick(start + Duration::from_millis(ms)))
        .collect();
    assert_eq!(ticks, [0, 16, 32, 48, 64, 80, 96]);
}

#[test]
fn test_camera_centers_player() {
    let translation = Camera2D::centering_translation(
        Vec2::new(100.0, 200.0),
        Vec2::new(25.0, 50.0),
        Vec2::new(800.0, 600.0),
    );
    assert_eq!(translation, Vec2::new(275.0, 50.0));
}

#[test]
fn test_coordinate_round_trip() {
    let mapper = CoordinateMapper::new(100.0, Vec2::new(800.0, 600.0));
    for point in [Vec2::ZERO, Vec2::new(-400.0, 300.0), Vec2::new(123.25, -987.5)] {
        let back = mapper.to_pixel_space(mapper.to_sim_space(point));
        assert!((back - point).length() < 1e-3);
    }
}
