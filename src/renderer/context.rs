//! Main renderer implementation

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};
use image::RgbaImage;
use wgpu::util::DeviceExt;
use winit::window::Window;

use super::mesh::{Mesh, Vertex};
use super::shader::{ShaderError, ShaderProgram};
use super::sprite::{DrawQueue, SpriteBackend, SpriteDraw, SpriteId, TextureId};
use super::texture::Texture;

/// Uniform buffer for one sprite
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct SpriteUniform {
    transform: [[f32; 4]; 4],
    color: [f32; 4],
    uv_scale: [f32; 2],
    use_texture: f32,
    _padding: f32,
}

impl SpriteUniform {
    fn new() -> Self {
        Self {
            transform: Mat4::IDENTITY.to_cols_array_2d(),
            color: [1.0; 4],
            uv_scale: [1.0; 2],
            use_texture: 0.0,
            _padding: 0.0,
        }
    }

    fn from_draw(draw: &SpriteDraw, textured: bool) -> Self {
        Self {
            transform: draw.transform.to_cols_array_2d(),
            color: draw.color,
            uv_scale: draw.uv_scale.into(),
            use_texture: if textured { 1.0 } else { 0.0 },
            _padding: 0.0,
        }
    }
}

/// Quad mesh plus its uniform, owned by one drawable
struct GpuSprite {
    mesh: Mesh,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Texture plus its bind group
struct GpuTexture {
    texture: Texture,
    bind_group: wgpu::BindGroup,
}

/// Sprite renderer
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    sprite_pipeline: wgpu::RenderPipeline,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    sprite_bind_group_layout: wgpu::BindGroupLayout,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    fallback_texture: GpuTexture,
    sprites: Vec<GpuSprite>,
    textures: Vec<GpuTexture>,
    adapter_name: String,
    /// Clear color
    pub clear_color: wgpu::Color,
}

impl Renderer {
    /// Depth buffer format
    const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Create a new renderer
    ///
    /// # Errors
    ///
    /// Fails if no surface, adapter or device is available, or if the sprite
    /// shaders cannot be loaded and compiled
    pub async fn new(
        window: Arc<Window>,
        vsync: bool,
        shaders: &ShaderProgram,
    ) -> Result<Self, RendererError> {
        let size = window.inner_size();
        let size = (size.width.max(1), size.height.max(1));

        // Create instance
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Create surface
        let surface = instance
            .create_surface(window)
            .map_err(|e| RendererError::Surface(e.to_string()))?;

        // Request adapter
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RendererError::NoAdapter)?;

        let adapter_name = adapter.get_info().name;
        log::info!("Using GPU: {:?}", adapter_name);

        // Request device
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Fitch Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| RendererError::Device(e.to_string()))?;

        // Configure surface
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| RendererError::Surface("no supported surface format".into()))?;

        let present_mode = if vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.0,
            height: size.1,
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // Create depth texture
        let (depth_texture, depth_view) = Self::create_depth_texture(&device, size.0, size.1);

        // Load shaders
        let modules = shaders.compile(&device)?;

        let sprite_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Sprite Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Texture Bind Group Layout"),
                entries: &[
                    // Texture
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    // Sampler
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let fallback_texture = Self::bind_texture(
            &device,
            &texture_bind_group_layout,
            Texture::white(&device, &queue),
        );

        // Create render pipeline
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sprite Pipeline Layout"),
            bind_group_layouts: &[&sprite_bind_group_layout, &texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        let sprite_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sprite Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &modules.vertex,
                entry_point: Some(ShaderProgram::VERTEX_ENTRY),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &modules.fragment,
                entry_point: Some(ShaderProgram::FRAGMENT_ENTRY),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // The Y-down projection flips winding; quads are never culled.
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: Self::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            sprite_pipeline,
            depth_texture,
            depth_view,
            sprite_bind_group_layout,
            texture_bind_group_layout,
            fallback_texture,
            sprites: Vec::new(),
            textures: Vec::new(),
            adapter_name,
            // Cornflower blue
            clear_color: wgpu::Color {
                r: 0.127,
                g: 0.301,
                b: 0.847,
                a: 1.0,
            },
        })
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        (texture, view)
    }

    fn bind_texture(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        texture: Texture,
    ) -> GpuTexture {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Texture Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });

        GpuTexture {
            texture,
            bind_group,
        }
    }

    /// Resize the renderer
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);

            // Recreate depth texture
            let (depth_texture, depth_view) =
                Self::create_depth_texture(&self.device, width, height);
            self.depth_texture = depth_texture;
            self.depth_view = depth_view;

            log::debug!("Resized to {}x{}", width, height);
        }
    }

    /// Name of the GPU in use
    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }

    /// Clear the frame and draw every queued sprite in order
    pub fn render(&self, draws: &DrawQueue) {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                log::error!("Surface error: {:?}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Uniform writes land before the submit below.
        for draw in draws.draws() {
            let Some(sprite) = self.sprites.get(draw.sprite.0) else {
                continue;
            };
            let textured = draw.texture.is_some_and(|t| t.0 < self.textures.len());
            self.queue.write_buffer(
                &sprite.uniform_buffer,
                0,
                bytemuck::cast_slice(&[SpriteUniform::from_draw(draw, textured)]),
            );
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Sprite Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.sprite_pipeline);

            for draw in draws.draws() {
                let Some(sprite) = self.sprites.get(draw.sprite.0) else {
                    continue;
                };
                let (Some(vertex_buffer), Some(index_buffer)) =
                    (&sprite.mesh.vertex_buffer, &sprite.mesh.index_buffer)
                else {
                    continue;
                };
                let texture = draw
                    .texture
                    .and_then(|t| self.textures.get(t.0))
                    .unwrap_or(&self.fallback_texture);

                render_pass.set_bind_group(0, &sprite.bind_group, &[]);
                render_pass.set_bind_group(1, &texture.bind_group, &[]);
                render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
                render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..sprite.mesh.index_count(), 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    fn upload_mesh(&self, mesh: &mut Mesh) {
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        mesh.vertex_buffer = Some(vertex_buffer);
        mesh.index_buffer = Some(index_buffer);
    }
}

impl SpriteBackend for Renderer {
    fn create_sprite(&mut self, size: Vec2, depth: f32) -> SpriteId {
        let mut mesh = Mesh::quad(size, depth);
        self.upload_mesh(&mut mesh);

        let uniform_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Sprite Buffer"),
                contents: bytemuck::cast_slice(&[SpriteUniform::new()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sprite Bind Group"),
            layout: &self.sprite_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        self.sprites.push(GpuSprite {
            mesh,
            uniform_buffer,
            bind_group,
        });
        SpriteId(self.sprites.len() - 1)
    }

    fn upload_texture(&mut self, label: &str, image: &RgbaImage) -> TextureId {
        let texture = Texture::from_rgba(
            &self.device,
            &self.queue,
            image.as_raw(),
            image.dimensions(),
            Some(label),
        );
        let gpu = Self::bind_texture(&self.device, &self.texture_bind_group_layout, texture);
        log::debug!(
            "Uploaded texture '{}' ({}x{})",
            label,
            gpu.texture.width(),
            gpu.texture.height()
        );

        self.textures.push(gpu);
        TextureId(self.textures.len() - 1)
    }
}

/// Errors raised while creating the renderer
#[derive(Debug, Clone)]
pub enum RendererError {
    /// The window surface could not be created or configured
    Surface(String),
    /// No GPU adapter is compatible with the surface
    NoAdapter,
    /// The GPU device could not be opened
    Device(String),
    /// Sprite shaders failed to load or compile
    Shader(ShaderError),
}

impl std::fmt::Display for RendererError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Surface(e) => write!(f, "Surface error: {e}"),
            Self::NoAdapter => write!(f, "No compatible GPU adapter found"),
            Self::Device(e) => write!(f, "Device error: {e}"),
            Self::Shader(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for RendererError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Shader(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ShaderError> for RendererError {
    fn from(e: ShaderError) -> Self {
        Self::Shader(e)
    }
}
