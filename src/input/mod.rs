//! Input handling module
//!
//! Key-to-action bindings and the queue that hands actions to the next tick.

mod command;
mod queue;

pub use command::{InputAction, InputMapper};
pub use queue::ActionQueue;
