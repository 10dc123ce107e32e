//! Action queue between input callbacks and the simulation tick
//!
//! Key events may arrive at any point between ticks. They are only recorded
//! here and applied to the physics world at the start of the next tick, so
//! input never interleaves with a running update or step.

use std::collections::VecDeque;

use super::InputAction;

/// FIFO of movement actions waiting for the next tick
#[derive(Debug)]
pub struct ActionQueue {
    pending: VecDeque<InputAction>,
}

impl ActionQueue {
    /// Default initial capacity.
    const DEFAULT_CAPACITY: usize = 16;

    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: VecDeque::with_capacity(Self::DEFAULT_CAPACITY),
        }
    }

    /// Record an action for the next tick.
    #[inline]
    pub fn push(&mut self, action: InputAction) {
        self.pending.push_back(action);
    }

    /// Take every recorded action in arrival order.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = InputAction> + '_ {
        self.pending.drain(..)
    }

    /// Number of actions waiting.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is waiting.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Default for ActionQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_keeps_arrival_order() {
        let mut queue = ActionQueue::new();
        queue.push(InputAction::MoveLeft);
        queue.push(InputAction::Jump);
        queue.push(InputAction::MoveLeft);
        assert_eq!(queue.len(), 3);

        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(
            drained,
            vec![InputAction::MoveLeft, InputAction::Jump, InputAction::MoveLeft]
        );
        assert!(queue.is_empty());
    }
}
