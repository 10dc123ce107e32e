//! Texture loading and GPU management
//!
//! Image files are decoded on the CPU, uploaded through a [`SpriteBackend`],
//! and looked up by name from a [`TextureRegistry`].

use std::path::{Path, PathBuf};

use glam::Vec2;
use image::RgbaImage;
use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;

use super::sprite::{SpriteBackend, TextureBinding, TextureFill, TextureId};

/// A GPU texture with its view and sampler
#[derive(Debug)]
pub struct Texture {
    /// The GPU texture
    pub texture: wgpu::Texture,
    /// Texture view for binding
    pub view: wgpu::TextureView,
    /// Sampler for texture filtering
    pub sampler: wgpu::Sampler,
    /// Texture dimensions
    pub size: wgpu::Extent3d,
}

impl Texture {
    /// Create a texture from raw RGBA data
    pub fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: &[u8],
        dimensions: (u32, u32),
        label: Option<&str>,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: dimensions.0,
            height: dimensions.1,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label,
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            rgba,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Repeat addressing lets tiled quads use UVs above 1.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("texture_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            size,
        }
    }

    /// Create a 1x1 white texture, bound when a sprite has no texture
    #[must_use]
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_rgba(
            device,
            queue,
            &[255, 255, 255, 255],
            (1, 1),
            Some("white_texture"),
        )
    }

    /// Get texture width
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.size.width
    }

    /// Get texture height
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.size.height
    }
}

/// Read and decode an image file into RGBA pixels
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded
pub fn decode_file(path: impl AsRef<Path>) -> Result<RgbaImage, TextureError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| TextureError::IoError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let img = image::load_from_memory(&bytes).map_err(|e| TextureError::DecodeError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(img.to_rgba8())
}

/// A texture the game wants loaded at startup
#[derive(Debug, Clone, PartialEq)]
pub struct TextureSpec {
    /// Registry name
    pub name: String,
    /// File name relative to the asset directory
    pub file: String,
    /// How the texture covers the quads it is bound to
    pub fill: TextureFill,
    /// Whether the session cannot start without it
    pub critical: bool,
}

impl TextureSpec {
    /// Describe a texture
    pub fn new(name: &str, file: &str, fill: TextureFill, critical: bool) -> Self {
        Self {
            name: name.to_string(),
            file: file.to_string(),
            fill,
            critical,
        }
    }
}

/// Uploaded textures by name
#[derive(Debug, Default)]
pub struct TextureRegistry {
    entries: FxHashMap<String, TextureBinding>,
}

impl TextureRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every texture in `specs` from `dir`.
    ///
    /// A missing or broken non-critical texture is logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns the load error of the first critical texture that fails
    pub fn load_all(
        backend: &mut dyn SpriteBackend,
        dir: impl AsRef<Path>,
        specs: &[TextureSpec],
    ) -> Result<Self, TextureError> {
        let dir = dir.as_ref();
        let mut registry = Self::new();

        for spec in specs {
            match decode_file(dir.join(&spec.file)) {
                Ok(image) => {
                    let size = Vec2::new(image.width() as f32, image.height() as f32);
                    let texture = backend.upload_texture(&spec.name, &image);
                    registry.insert(
                        &spec.name,
                        TextureBinding {
                            texture,
                            size,
                            fill: spec.fill,
                        },
                    );
                    log::debug!("Loaded texture '{}' ({}x{})", spec.name, size.x, size.y);
                }
                Err(e) if spec.critical => return Err(e),
                Err(e) => log::warn!("Texture '{}' unavailable: {}", spec.name, e),
            }
        }

        Ok(registry)
    }

    /// Register a texture under `name`, replacing any previous entry
    pub fn insert(&mut self, name: &str, binding: TextureBinding) {
        self.entries.insert(name.to_string(), binding);
    }

    /// Look up a texture by name
    pub fn get(&self, name: &str) -> Option<TextureBinding> {
        self.entries.get(name).copied()
    }

    /// Number of loaded textures
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no texture loaded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Errors that can occur during texture loading
#[derive(Debug, Clone)]
pub enum TextureError {
    /// IO error reading file
    IoError { path: PathBuf, message: String },
    /// Error decoding image data
    DecodeError { path: PathBuf, message: String },
}

impl std::fmt::Display for TextureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError { path, message } => {
                write!(f, "IO error reading {}: {message}", path.display())
            }
            Self::DecodeError { path, message } => {
                write!(f, "Decode error in {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for TextureError {}
