//! The platformer itself
//!
//! Level data, the drawable entities and their draw list, and the session
//! tying them to the physics world.

mod entities;
mod fitch;
mod level;
mod rect;
mod scene;
mod session;

pub use entities::{Background, Block, Drawable, Player, Sprite};
pub use fitch::FitchGame;
pub use level::{BlockDef, Level, LevelParseError};
pub use rect::Rect;
pub use scene::DrawList;
pub use session::{Session, SessionError, texture_specs};
