//! Sprite back-end for tests which never touches a GPU.

use std::path::Path;

use fitch::glam::Vec2;
use fitch::renderer::{SpriteBackend, SpriteId, TextureId};
use image::RgbaImage;

/// Records every allocation instead of making it.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    /// Size and depth of every quad, by sprite id
    pub sprites: Vec<(Vec2, f32)>,
    /// Label and dimensions of every texture, by texture id
    pub textures: Vec<(String, (u32, u32))>,
}

impl SpriteBackend for RecordingBackend {
    fn create_sprite(&mut self, size: Vec2, depth: f32) -> SpriteId {
        self.sprites.push((size, depth));
        SpriteId(self.sprites.len() - 1)
    }

    fn upload_texture(&mut self, label: &str, image: &RgbaImage) -> TextureId {
        self.textures.push((label.to_string(), image.dimensions()));
        TextureId(self.textures.len() - 1)
    }
}

/// Write a solid-colour PNG.
pub fn write_png(dir: &Path, file: &str, width: u32, height: u32) {
    RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 255]))
        .save(dir.join(file))
        .unwrap();
}
