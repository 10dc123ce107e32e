//! Sprite resources and the per-frame draw queue
//!
//! Drawables talk to the GPU only through [`SpriteBackend`], and describe what
//! to draw each frame by pushing [`SpriteDraw`]s into a [`DrawQueue`]. The
//! wgpu renderer implements the backend and consumes the queue.

use glam::{Mat4, Vec2, Vec3};
use image::RgbaImage;

/// GPU quad owned by a single drawable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteId(pub usize);

/// Uploaded texture, shareable between drawables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

/// How a texture covers a quad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureFill {
    /// Stretch the image over the whole quad
    #[default]
    Stretch,
    /// Repeat the image at its native pixel size
    Tile,
}

/// A texture bound to a drawable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureBinding {
    /// Texture to sample
    pub texture: TextureId,
    /// Texture size in pixels
    pub size: Vec2,
    /// Coverage mode
    pub fill: TextureFill,
}

impl TextureBinding {
    /// UV scale for a quad of `quad_size`
    pub fn uv_scale(&self, quad_size: Vec2) -> Vec2 {
        match self.fill {
            TextureFill::Stretch => Vec2::ONE,
            TextureFill::Tile => quad_size / self.size.max(Vec2::ONE),
        }
    }
}

/// GPU resource allocation used by drawables during initialization
pub trait SpriteBackend {
    /// Allocate a quad of `size` pixels at draw depth `depth`
    fn create_sprite(&mut self, size: Vec2, depth: f32) -> SpriteId;

    /// Upload decoded RGBA pixels as a texture
    fn upload_texture(&mut self, label: &str, image: &RgbaImage) -> TextureId;
}

/// One quad to draw this frame
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteDraw {
    /// Quad to draw
    pub sprite: SpriteId,
    /// Full transform from quad space to clip space
    pub transform: Mat4,
    /// Texture, or `None` to fill with `color`
    pub texture: Option<TextureId>,
    /// UV multiplier
    pub uv_scale: Vec2,
    /// Fill color used when there is no texture (RGBA)
    pub color: [f32; 4],
}

impl SpriteDraw {
    /// Build a draw for a quad whose top-left corner sits at `position`
    pub fn at(sprite: SpriteId, position: Vec2, view_projection: Mat4) -> Self {
        Self {
            sprite,
            transform: view_projection * Mat4::from_translation(Vec3::new(position.x, position.y, 0.0)),
            texture: None,
            uv_scale: Vec2::ONE,
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

/// Ordered list of quads submitted for one frame
#[derive(Debug, Default)]
pub struct DrawQueue {
    draws: Vec<SpriteDraw>,
}

impl DrawQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a draw
    pub fn push(&mut self, draw: SpriteDraw) {
        self.draws.push(draw);
    }

    /// Draws in submission order
    pub fn draws(&self) -> &[SpriteDraw] {
        &self.draws
    }

    /// Number of draws
    pub fn len(&self) -> usize {
        self.draws.len()
    }

    /// Whether nothing was submitted
    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    /// Forget all draws, keeping the allocation
    pub fn clear(&mut self) {
        self.draws.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_tiled_uv_scale() {
        let binding = TextureBinding {
            texture: TextureId(0),
            size: Vec2::new(50.0, 25.0),
            fill: TextureFill::Tile,
        };
        assert_eq!(binding.uv_scale(Vec2::new(100.0, 100.0)), Vec2::new(2.0, 4.0));

        let stretched = TextureBinding {
            fill: TextureFill::Stretch,
            ..binding
        };
        assert_eq!(stretched.uv_scale(Vec2::new(100.0, 100.0)), Vec2::ONE);
    }

    #[test]
    fn test_draw_at_offsets_quad() {
        let draw = SpriteDraw::at(SpriteId(3), Vec2::new(10.0, 20.0), Mat4::IDENTITY);
        let corner = draw.transform * Vec4::new(0.0, 0.0, 0.5, 1.0);
        assert_eq!(corner, Vec4::new(10.0, 20.0, 0.5, 1.0));
    }
}
