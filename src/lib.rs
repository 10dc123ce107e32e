//! A small 2D platformer
//!
//! This crate provides:
//! - Sprite rendering with wgpu behind a narrow [`renderer::SpriteBackend`] seam
//! - Rigid-body physics with rapier2d and pixel/physics coordinate mapping
//! - A camera that keeps the player centered
//! - A frame loop that renders every frame and caps logical updates
//! - A line-based level format

pub mod cli;
pub mod config;
pub mod core;
pub mod game;
pub mod input;
pub mod logging;
pub mod physics;
pub mod renderer;

// Re-exports for convenience
pub use glam;
pub use rapier2d;
pub use wgpu;
pub use winit;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::config::GameConfig;
    pub use crate::core::{Engine, EngineConfig, EngineContext, Game, TickGate};
    pub use crate::game::{FitchGame, Level, Session};
    pub use crate::input::{InputAction, InputMapper};
    pub use crate::physics::{CoordinateMapper, PhysicsWorld};
    pub use crate::renderer::{Camera2D, DrawQueue, SpriteBackend, TransformStack};
    pub use glam::{Mat4, Vec2, Vec3};
    pub use winit::keyboard::KeyCode;
}
