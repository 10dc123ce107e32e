//! Insertion-ordered draw list

use crate::physics::{CoordinateMapper, PhysicsWorld};
use crate::renderer::{DrawQueue, SpriteBackend, TextureRegistry, TransformStack};

use super::entities::{Background, Drawable, Player};

/// Drawables in the order they were added.
///
/// Draw order is insertion order; depth testing resolves occlusion.
#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<Drawable>,
    background: Option<usize>,
    player: Option<usize>,
}

impl DrawList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a drawable, returning its index
    pub fn push(&mut self, drawable: Drawable) -> usize {
        let index = self.items.len();
        match &drawable {
            Drawable::Background(_) => {
                debug_assert!(self.background.is_none(), "second background");
                self.background = Some(index);
            }
            Drawable::Player(_) => {
                debug_assert!(self.player.is_none(), "second player");
                self.player = Some(index);
            }
            Drawable::Block(_) => {}
        }
        self.items.push(drawable);
        index
    }

    /// Initialize every drawable
    pub fn init(&mut self, backend: &mut dyn SpriteBackend, textures: &TextureRegistry) {
        for drawable in &mut self.items {
            drawable.init(backend, textures);
        }
    }

    /// Update every drawable for one tick
    pub fn update(&mut self, world: &PhysicsWorld, mapper: &CoordinateMapper) {
        for drawable in &mut self.items {
            drawable.update(world, mapper);
        }
    }

    /// Give every drawable its own copy of `stack`
    pub fn load_transform(&mut self, stack: &TransformStack) {
        for drawable in &mut self.items {
            drawable.load_transform(stack.clone());
        }
    }

    /// Queue every drawable in list order
    pub fn draw(&self, queue: &mut DrawQueue) {
        for drawable in &self.items {
            drawable.draw(queue);
        }
    }

    /// The background, if one was added
    pub fn background_mut(&mut self) -> Option<&mut Background> {
        match self.background.and_then(|i| self.items.get_mut(i)) {
            Some(Drawable::Background(background)) => Some(background),
            _ => None,
        }
    }

    /// The player, if one was added
    pub fn player(&self) -> Option<&Player> {
        match self.player.and_then(|i| self.items.get(i)) {
            Some(Drawable::Player(player)) => Some(player),
            _ => None,
        }
    }

    /// Drawables in list order
    pub fn iter(&self) -> impl Iterator<Item = &Drawable> {
        self.items.iter()
    }

    /// Number of drawables
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::Block;
    use crate::game::rect::Rect;
    use crate::physics::ShapeDescriptor;
    use glam::Vec2;

    #[test]
    fn test_tracks_background_and_player() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let shape = ShapeDescriptor::cuboid(Vec2::splat(0.25));
        let block_body = world.create_static_body(Vec2::ONE, shape);
        let player_body = world.create_dynamic_body(Vec2::ZERO, shape);

        let mut list = DrawList::new();
        assert!(list.player().is_none());

        list.push(Drawable::Background(Background::new(Vec2::splat(10.0), 0.9)));
        list.push(Drawable::Block(Block::new(Rect::new(0.0, 0.0, 50.0, 50.0), 0.2, block_body)));
        let index = list.push(Drawable::Player(Player::new(
            Rect::new(0.0, 0.0, 50.0, 100.0),
            0.0,
            player_body,
        )));

        assert_eq!(index, 2);
        assert_eq!(list.len(), 3);
        assert_eq!(list.player().map(Player::body), Some(player_body));
        assert!(list.background_mut().is_some());
        assert!(matches!(list.iter().next(), Some(Drawable::Background(_))));
    }
}
