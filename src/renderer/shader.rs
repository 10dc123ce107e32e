//! Shader source loading and compilation
//!
//! The sprite pipeline uses one WGSL file per stage. Sources are read from
//! disk at startup; any missing file or compiler diagnostic is fatal.

use std::fmt;
use std::path::{Path, PathBuf};

/// Pipeline stage a shader file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::Fragment => write!(f, "fragment"),
        }
    }
}

/// Source text of both stages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

/// Compiled modules for both stages
#[derive(Debug)]
pub struct CompiledShaders {
    pub vertex: wgpu::ShaderModule,
    pub fragment: wgpu::ShaderModule,
}

/// A vertex + fragment shader pair loaded from files
#[derive(Debug, Clone, Default)]
pub struct ShaderProgram {
    vertex_path: Option<PathBuf>,
    fragment_path: Option<PathBuf>,
}

impl ShaderProgram {
    /// Entry point expected in the vertex file
    pub const VERTEX_ENTRY: &'static str = "vs_main";
    /// Entry point expected in the fragment file
    pub const FRAGMENT_ENTRY: &'static str = "fs_main";

    /// Create a program with no stages attached
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the vertex stage source file
    #[must_use]
    pub fn with_vertex_shader(mut self, path: impl Into<PathBuf>) -> Self {
        self.vertex_path = Some(path.into());
        self
    }

    /// Attach the fragment stage source file
    #[must_use]
    pub fn with_fragment_shader(mut self, path: impl Into<PathBuf>) -> Self {
        self.fragment_path = Some(path.into());
        self
    }

    /// Read both source files
    ///
    /// # Errors
    ///
    /// Fails if a stage was never attached or its file cannot be read
    pub fn load_sources(&self) -> Result<ShaderSources, ShaderError> {
        let (Some(vertex_path), Some(fragment_path)) = (&self.vertex_path, &self.fragment_path)
        else {
            return Err(ShaderError::MissingStage);
        };

        Ok(ShaderSources {
            vertex: load_file(vertex_path)?,
            fragment: load_file(fragment_path)?,
        })
    }

    /// Load and compile both stages on `device`
    ///
    /// # Errors
    ///
    /// Fails on any load error, or with the compiler log if a stage does
    /// not validate
    pub fn compile(&self, device: &wgpu::Device) -> Result<CompiledShaders, ShaderError> {
        let sources = self.load_sources()?;

        let vertex = compile_module(device, ShaderStage::Vertex, &sources.vertex)?;
        let fragment = compile_module(device, ShaderStage::Fragment, &sources.fragment)?;

        Ok(CompiledShaders { vertex, fragment })
    }
}

/// Read a text file
///
/// # Errors
///
/// Returns [`ShaderError::Io`] naming the path
pub fn load_file(path: impl AsRef<Path>) -> Result<String, ShaderError> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|e| ShaderError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn compile_module(
    device: &wgpu::Device,
    stage: ShaderStage,
    source: &str,
) -> Result<wgpu::ShaderModule, ShaderError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(match stage {
            ShaderStage::Vertex => "Sprite Vertex Shader",
            ShaderStage::Fragment => "Sprite Fragment Shader",
        }),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    match pollster::block_on(device.pop_error_scope()) {
        Some(error) => Err(ShaderError::Compilation {
            stage,
            log: error.to_string(),
        }),
        None => Ok(module),
    }
}

/// Errors raised while building the shader program
#[derive(Debug, Clone)]
pub enum ShaderError {
    /// A stage file was never attached
    MissingStage,
    /// A source file could not be read
    Io { path: PathBuf, message: String },
    /// The compiler rejected a stage
    Compilation { stage: ShaderStage, log: String },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingStage => write!(f, "Missing one or more shaders"),
            Self::Io { path, message } => {
                write!(f, "Cannot read shader {}: {message}", path.display())
            }
            Self::Compilation { stage, log } => {
                write!(f, "Failed to compile {stage} shader:\n{log}")
            }
        }
    }
}

impl std::error::Error for ShaderError {}
