//! Key bindings for game actions
//!
//! Physical keys map to logical actions so that the game never matches on
//! key codes directly.
//!
//! # Example
//!
//! ```ignore
//! let mapper = InputMapper::with_defaults();
//!
//! if let Some(action) = mapper.get_action(KeyCode::Space) {
//!     queue.push(action);
//! }
//! ```

use rustc_hash::FxHashMap;
use winit::keyboard::KeyCode;

/// Logical input actions that map to game behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    /// Close the window and end the session
    Quit,
    /// Push the player up
    Jump,
    /// Push the player left
    MoveLeft,
    /// Push the player right
    MoveRight,
}

impl InputAction {
    /// Whether the action acts on the player body
    #[must_use]
    pub const fn is_movement(&self) -> bool {
        matches!(self, Self::Jump | Self::MoveLeft | Self::MoveRight)
    }
}

/// Maps physical keys to logical actions.
#[derive(Debug, Clone)]
pub struct InputMapper {
    key_bindings: FxHashMap<KeyCode, InputAction>,
}

impl InputMapper {
    /// Create an input mapper with the default bindings.
    ///
    /// Escape quits, Space jumps, A and D push left and right.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut mapper = Self {
            key_bindings: FxHashMap::default(),
        };

        mapper.bind(KeyCode::Escape, InputAction::Quit);
        mapper.bind(KeyCode::Space, InputAction::Jump);
        mapper.bind(KeyCode::KeyA, InputAction::MoveLeft);
        mapper.bind(KeyCode::KeyD, InputAction::MoveRight);

        mapper
    }

    /// Bind a key to an action, replacing any earlier binding of that key.
    pub fn bind(&mut self, key: KeyCode, action: InputAction) {
        self.key_bindings.insert(key, action);
    }

    /// Get the action for a key.
    #[must_use]
    pub fn get_action(&self, key: KeyCode) -> Option<InputAction> {
        self.key_bindings.get(&key).copied()
    }
}
