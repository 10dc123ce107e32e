//! Core engine module
//!
//! Contains the main Engine struct, its configuration and the frame timing gate

mod engine;
mod time;

pub use engine::{Engine, EngineConfig, EngineContext, EngineError, Game};
pub use time::{FrameCounters, TickGate};
