//! Physics simulation using rapier2d

use std::num::NonZeroUsize;

use glam::Vec2;
use rapier2d::prelude::*;

/// Handle to a rigid body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub RigidBodyHandle);

/// Collision shape attached to a body, in physics units
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeDescriptor {
    /// Axis-aligned box given by its half extents
    Box {
        /// Half width and half height
        half_extents: Vec2,
    },
}

impl ShapeDescriptor {
    /// Box shape from half extents
    pub fn cuboid(half_extents: Vec2) -> Self {
        Self::Box { half_extents }
    }

    fn is_valid(&self) -> bool {
        match self {
            Self::Box { half_extents } => {
                half_extents.is_finite() && half_extents.x > 0.0 && half_extents.y > 0.0
            }
        }
    }

    fn collider(&self, density: f32) -> Collider {
        match self {
            Self::Box { half_extents } => ColliderBuilder::cuboid(half_extents.x, half_extents.y)
                .density(density)
                .build(),
        }
    }
}

/// Rigid-body world with a gravity vector fixed at construction
pub struct PhysicsWorld {
    /// Gravity vector
    gravity: Vector<Real>,
    /// Physics pipeline
    pipeline: PhysicsPipeline,
    /// Island manager
    island_manager: IslandManager,
    /// Broad phase
    broad_phase: DefaultBroadPhase,
    /// Narrow phase
    narrow_phase: NarrowPhase,
    /// Rigid body set
    rigid_body_set: RigidBodySet,
    /// Collider set
    collider_set: ColliderSet,
    /// Impulse joint set
    impulse_joint_set: ImpulseJointSet,
    /// Multibody joint set
    multibody_joint_set: MultibodyJointSet,
    /// CCD solver
    ccd_solver: CCDSolver,
    /// Query pipeline, kept in sync by the step
    query_pipeline: QueryPipeline,
    /// Integration parameters
    integration_parameters: IntegrationParameters,
    /// Number of steps taken so far
    steps: u64,
}

impl PhysicsWorld {
    /// Density used for every collider
    pub const DENSITY: f32 = 1.0;

    /// Create an empty world with the given gravity
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity: vector![gravity.x, gravity.y],
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            integration_parameters: IntegrationParameters::default(),
            steps: 0,
        }
    }

    /// Gravity this world was built with
    pub fn gravity(&self) -> Vec2 {
        Vec2::new(self.gravity.x, self.gravity.y)
    }

    /// Advance the simulation by `dt`.
    ///
    /// Forces applied since the previous step act for this step only and are
    /// cleared afterwards.
    pub fn step(&mut self, dt: f32, velocity_iterations: usize, position_iterations: usize) {
        debug_assert!(dt > 0.0, "physics step must advance time");

        self.integration_parameters.dt = dt;
        self.integration_parameters.num_solver_iterations =
            NonZeroUsize::new(velocity_iterations).unwrap_or(NonZeroUsize::MIN);
        self.integration_parameters.num_internal_pgs_iterations = position_iterations.max(1);

        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );

        for (_, body) in self.rigid_body_set.iter_mut() {
            body.reset_forces(false);
        }

        self.steps += 1;
    }

    /// Number of steps taken since construction
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// Create a static body centered at `position` (physics units)
    pub fn create_static_body(&mut self, position: Vec2, shape: ShapeDescriptor) -> BodyHandle {
        debug_assert!(shape.is_valid(), "invalid shape descriptor: {shape:?}");

        let body = RigidBodyBuilder::fixed()
            .translation(vector![position.x, position.y])
            .build();
        self.insert(body, shape)
    }

    /// Create a dynamic body centered at `position` (physics units).
    ///
    /// The body never rotates.
    pub fn create_dynamic_body(&mut self, position: Vec2, shape: ShapeDescriptor) -> BodyHandle {
        debug_assert!(shape.is_valid(), "invalid shape descriptor: {shape:?}");

        let body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y])
            .lock_rotations()
            .build();
        self.insert(body, shape)
    }

    fn insert(&mut self, body: RigidBody, shape: ShapeDescriptor) -> BodyHandle {
        let handle = self.rigid_body_set.insert(body);
        self.collider_set.insert_with_parent(
            shape.collider(Self::DENSITY),
            handle,
            &mut self.rigid_body_set,
        );
        BodyHandle(handle)
    }

    /// Apply a force through the center of mass for the next step
    pub fn apply_force(&mut self, body: BodyHandle, force: Vec2) {
        if let Some(rb) = self.rigid_body_set.get_mut(body.0) {
            rb.add_force(vector![force.x, force.y], true);
        }
    }

    /// Position of a body's center (physics units)
    pub fn position(&self, body: BodyHandle) -> Option<Vec2> {
        self.rigid_body_set.get(body.0).map(|rb| {
            let pos = rb.translation();
            Vec2::new(pos.x, pos.y)
        })
    }

    /// Linear velocity of a body (physics units per second)
    pub fn linear_velocity(&self, body: BodyHandle) -> Option<Vec2> {
        self.rigid_body_set.get(body.0).map(|rb| {
            let vel = rb.linvel();
            Vec2::new(vel.x, vel.y)
        })
    }

    /// Number of bodies in the world
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(Vec2::new(0.0, 0.8))
    }

    #[test]
    fn test_dynamic_body_falls_down_screen() {
        let mut world = world();
        let body =
            world.create_dynamic_body(Vec2::new(1.0, 1.0), ShapeDescriptor::cuboid(Vec2::splat(0.25)));

        for _ in 0..10 {
            world.step(0.1, 30, 30);
        }

        let pos = world.position(body).unwrap();
        assert!(pos.y > 1.0);
        assert!((pos.x - 1.0).abs() < 1e-5);
        assert_eq!(world.step_count(), 10);
    }

    #[test]
    fn test_static_body_stays_put() {
        let mut world = world();
        let block =
            world.create_static_body(Vec2::new(2.0, 3.0), ShapeDescriptor::cuboid(Vec2::splat(0.25)));

        for _ in 0..20 {
            world.step(0.1, 30, 30);
        }

        assert_eq!(world.position(block), Some(Vec2::new(2.0, 3.0)));
    }

    #[test]
    fn test_force_lasts_one_step() {
        let mut weightless = PhysicsWorld::new(Vec2::ZERO);
        let body = weightless
            .create_dynamic_body(Vec2::ZERO, ShapeDescriptor::cuboid(Vec2::new(0.25, 0.5)));

        weightless.apply_force(body, Vec2::new(2.0, 0.0));
        weightless.step(0.1, 30, 30);
        let after_push = weightless.linear_velocity(body).unwrap();
        assert!(after_push.x > 0.0);

        weightless.step(0.1, 30, 30);
        let coasting = weightless.linear_velocity(body).unwrap();
        assert!((coasting.x - after_push.x).abs() < 1e-5);
    }

    #[test]
    fn test_unknown_handle_has_no_position() {
        let mut world = world();
        let body =
            world.create_dynamic_body(Vec2::ZERO, ShapeDescriptor::cuboid(Vec2::splat(0.5)));
        let other = PhysicsWorld::new(Vec2::ZERO);
        assert!(other.position(body).is_none());
        assert_eq!(world.body_count(), 1);
        world.step(0.1, 30, 30);
    }
}
