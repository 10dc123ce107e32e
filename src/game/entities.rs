//! Drawable scene entities
//!
//! The set of drawables is closed: a background, one block per level tile,
//! and the player. Each owns one GPU quad created during [`Drawable::init`]
//! and reused every frame.

use glam::Vec2;

use super::rect::Rect;
use crate::physics::{BodyHandle, CoordinateMapper, PhysicsWorld};
use crate::renderer::{
    DrawQueue, SpriteBackend, SpriteDraw, SpriteId, TextureBinding, TextureRegistry,
    TransformStack,
};

/// State shared by every drawable: its rectangle, quad and texture
#[derive(Debug, Clone)]
pub struct Sprite {
    rect: Rect,
    depth: f32,
    texture_name: &'static str,
    fallback_color: [f32; 4],
    texture: Option<TextureBinding>,
    quad: Option<SpriteId>,
    transform: TransformStack,
}

impl Sprite {
    /// Describe a sprite; nothing is allocated until [`Sprite::init`]
    pub fn new(rect: Rect, depth: f32, texture_name: &'static str, fallback_color: [f32; 4]) -> Self {
        Self {
            rect,
            depth,
            texture_name,
            fallback_color,
            texture: None,
            quad: None,
            transform: TransformStack::new(),
        }
    }

    fn init(&mut self, backend: &mut dyn SpriteBackend, textures: &TextureRegistry) {
        debug_assert!(self.quad.is_none(), "sprite initialized twice");

        self.quad = Some(backend.create_sprite(self.rect.size, self.depth));
        self.texture = textures.get(self.texture_name);
        if self.texture.is_none() {
            log::debug!("'{}' drawn untextured", self.texture_name);
        }
    }

    fn draw(&self, queue: &mut DrawQueue) {
        let Some(quad) = self.quad else {
            return;
        };

        let mut draw = SpriteDraw::at(quad, self.rect.position, self.transform.compose());
        match self.texture {
            Some(binding) => {
                draw.texture = Some(binding.texture);
                draw.uv_scale = binding.uv_scale(self.rect.size);
            }
            None => draw.color = self.fallback_color,
        }
        queue.push(draw);
    }

    /// Move the rectangle so it mirrors a body centered at `center`
    fn follow_body(&mut self, world: &PhysicsWorld, mapper: &CoordinateMapper, body: BodyHandle) {
        if let Some(center) = world.position(body) {
            self.rect.set_center(mapper.to_pixel_space(center));
        }
    }

    /// Current rectangle in pixels
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Draw depth
    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Texture bound during init, if it was available
    pub fn texture(&self) -> Option<TextureBinding> {
        self.texture
    }

    /// Quad allocated during init
    pub fn quad(&self) -> Option<SpriteId> {
        self.quad
    }
}

/// Static backdrop; stays put relative to the world, not the camera
#[derive(Debug, Clone)]
pub struct Background {
    sprite: Sprite,
}

impl Background {
    /// Registry name of the background texture
    pub const TEXTURE: &'static str = "background";

    /// Backdrop covering `size` pixels
    pub fn new(size: Vec2, depth: f32) -> Self {
        Self {
            sprite: Sprite::new(
                Rect::new(0.0, 0.0, size.x, size.y),
                depth,
                Self::TEXTURE,
                [0.35, 0.55, 0.85, 1.0],
            ),
        }
    }

    /// Place the top-left corner at `position`
    pub fn set_position(&mut self, position: Vec2) {
        self.sprite.rect.position = position;
    }
}

/// One level tile backed by a static body
#[derive(Debug, Clone)]
pub struct Block {
    sprite: Sprite,
    body: BodyHandle,
}

impl Block {
    /// Registry name of the block texture
    pub const TEXTURE: &'static str = "solid";

    pub fn new(rect: Rect, depth: f32, body: BodyHandle) -> Self {
        Self {
            sprite: Sprite::new(rect, depth, Self::TEXTURE, [0.45, 0.3, 0.2, 1.0]),
            body,
        }
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }
}

/// The player, backed by the only dynamic body
#[derive(Debug, Clone)]
pub struct Player {
    sprite: Sprite,
    body: BodyHandle,
}

impl Player {
    /// Registry name of the player texture
    pub const TEXTURE: &'static str = "player";

    pub fn new(rect: Rect, depth: f32, body: BodyHandle) -> Self {
        Self {
            sprite: Sprite::new(rect, depth, Self::TEXTURE, [0.85, 0.2, 0.2, 1.0]),
            body,
        }
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    /// Rectangle as last synced from the body
    pub fn rect(&self) -> Rect {
        self.sprite.rect
    }
}

/// Anything in the draw list
#[derive(Debug, Clone)]
pub enum Drawable {
    Background(Background),
    Block(Block),
    Player(Player),
}

impl Drawable {
    /// Allocate GPU resources; called exactly once before the first frame
    pub fn init(&mut self, backend: &mut dyn SpriteBackend, textures: &TextureRegistry) {
        self.sprite_mut().init(backend, textures);
    }

    /// Advance entity state on an accepted tick
    pub fn update(&mut self, world: &PhysicsWorld, mapper: &CoordinateMapper) {
        match self {
            Self::Background(_) => {}
            Self::Block(block) => block.sprite.follow_body(world, mapper, block.body),
            Self::Player(player) => player.sprite.follow_body(world, mapper, player.body),
        }
    }

    /// Replace the transform stack used by the next draw
    pub fn load_transform(&mut self, stack: TransformStack) {
        self.sprite_mut().transform = stack;
    }

    /// Queue this frame's quad
    pub fn draw(&self, queue: &mut DrawQueue) {
        self.sprite().draw(queue);
    }

    /// Shared sprite state
    pub fn sprite(&self) -> &Sprite {
        match self {
            Self::Background(background) => &background.sprite,
            Self::Block(block) => &block.sprite,
            Self::Player(player) => &player.sprite,
        }
    }

    fn sprite_mut(&mut self) -> &mut Sprite {
        match self {
            Self::Background(background) => &mut background.sprite,
            Self::Block(block) => &mut block.sprite,
            Self::Player(player) => &mut player.sprite,
        }
    }

    /// Current rectangle in pixels
    pub fn rect(&self) -> Rect {
        self.sprite().rect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::ShapeDescriptor;
    use crate::renderer::{TextureFill, TextureId};
    use glam::{Mat4, Vec4};
    use image::RgbaImage;

    #[derive(Default)]
    struct QuadCounter {
        quads: Vec<(Vec2, f32)>,
    }

    impl SpriteBackend for QuadCounter {
        fn create_sprite(&mut self, size: Vec2, depth: f32) -> SpriteId {
            self.quads.push((size, depth));
            SpriteId(self.quads.len() - 1)
        }

        fn upload_texture(&mut self, _label: &str, _image: &RgbaImage) -> TextureId {
            TextureId(0)
        }
    }

    #[test]
    fn test_init_allocates_one_quad() {
        let mut backend = QuadCounter::default();
        let mut textures = TextureRegistry::new();
        textures.insert(
            Background::TEXTURE,
            TextureBinding {
                texture: TextureId(7),
                size: Vec2::new(100.0, 100.0),
                fill: TextureFill::Tile,
            },
        );

        let mut drawable = Drawable::Background(Background::new(Vec2::new(1000.0, 800.0), 0.9));
        drawable.init(&mut backend, &textures);

        assert_eq!(backend.quads, vec![(Vec2::new(1000.0, 800.0), 0.9)]);
        assert_eq!(drawable.sprite().quad(), Some(SpriteId(0)));

        let mut queue = DrawQueue::new();
        drawable.draw(&mut queue);
        let draw = &queue.draws()[0];
        assert_eq!(draw.texture, Some(TextureId(7)));
        assert_eq!(draw.uv_scale, Vec2::new(10.0, 8.0));
    }

    #[test]
    fn test_untextured_draw_uses_fallback_color() {
        let mut backend = QuadCounter::default();
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let body = world.create_static_body(Vec2::ONE, ShapeDescriptor::cuboid(Vec2::splat(0.25)));

        let mut drawable = Drawable::Block(Block::new(Rect::new(0.0, 0.0, 50.0, 50.0), 0.2, body));
        drawable.init(&mut backend, &TextureRegistry::new());

        let mut queue = DrawQueue::new();
        drawable.draw(&mut queue);
        assert_eq!(queue.draws()[0].texture, None);
        assert_eq!(queue.draws()[0].color, [0.45, 0.3, 0.2, 1.0]);
    }

    #[test]
    fn test_update_mirrors_body() {
        let mapper = CoordinateMapper::new(100.0, Vec2::new(800.0, 600.0));
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let rect = Rect::new(100.0, 200.0, 50.0, 50.0);
        let body = world.create_static_body(
            mapper.to_sim_space(rect.center()),
            ShapeDescriptor::cuboid(mapper.extent_to_sim(rect.half_extents())),
        );

        let mut drawable = Drawable::Block(Block::new(Rect::new(0.0, 0.0, 50.0, 50.0), 0.2, body));
        drawable.update(&world, &mapper);

        let synced = drawable.rect();
        assert!((synced.position - rect.position).length() < 1e-3);
    }

    #[test]
    fn test_loaded_transform_reaches_draw() {
        let mut backend = QuadCounter::default();
        let mut drawable = Drawable::Background(Background::new(Vec2::splat(10.0), 0.9));
        drawable.init(&mut backend, &TextureRegistry::new());

        let shift = Mat4::from_translation(glam::Vec3::new(5.0, -5.0, 0.0));
        drawable.load_transform(TransformStack::new().pushed(shift));
        if let Drawable::Background(background) = &mut drawable {
            background.set_position(Vec2::new(1.0, 2.0));
        }

        let mut queue = DrawQueue::new();
        drawable.draw(&mut queue);
        let corner = queue.draws()[0].transform * Vec4::new(0.0, 0.0, 0.9, 1.0);
        assert_eq!(corner, Vec4::new(6.0, -3.0, 0.9, 1.0));
    }
}
