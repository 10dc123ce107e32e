//! Physics simulation module
//!
//! Built on top of rapier2d, plus the mapping between pixel space and
//! physics space.

mod coords;
mod world;

pub use coords::CoordinateMapper;
pub use world::{BodyHandle, PhysicsWorld, ShapeDescriptor};
