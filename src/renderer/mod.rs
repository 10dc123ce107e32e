//! Rendering module
//!
//! 2D sprite rendering with wgpu: an orthographic camera, textured quads with
//! per-sprite draw depth, and a backend trait that keeps drawables off the GPU
//! types.

mod camera;
mod context;
mod mesh;
mod shader;
mod sprite;
mod texture;

pub use camera::{Camera2D, TransformStack};
pub use context::{Renderer, RendererError};
pub use mesh::{Mesh, Vertex};
pub use shader::{ShaderError, ShaderProgram, ShaderSources, ShaderStage, load_file};
pub use sprite::{
    DrawQueue, SpriteBackend, SpriteDraw, SpriteId, TextureBinding, TextureFill, TextureId,
};
pub use texture::{Texture, TextureError, TextureRegistry, TextureSpec, decode_file};
