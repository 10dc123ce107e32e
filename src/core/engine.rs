//! Core Engine struct and main game loop

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::core::time::{FrameCounters, TickGate};
use crate::renderer::{Renderer, RendererError, ShaderProgram};

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Window title
    pub title: String,
    /// Initial window width
    pub width: u32,
    /// Initial window height
    pub height: u32,
    /// Minimum wall-clock time between logical updates
    pub min_update_period: Duration,
    /// Enable VSync
    pub vsync: bool,
    /// Sprite vertex shader source
    pub vertex_shader: PathBuf,
    /// Sprite fragment shader source
    pub fragment_shader: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: String::from("Fitch"),
            width: 800,
            height: 600,
            min_update_period: Duration::from_nanos(1_000_000_000 / 60),
            vsync: true,
            vertex_shader: PathBuf::from("shaders/sprite.vert.wgsl"),
            fragment_shader: PathBuf::from("shaders/sprite.frag.wgsl"),
        }
    }
}

impl EngineConfig {
    /// Create a new config with a title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set window dimensions
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the minimum time between logical updates
    pub fn with_min_update_period(mut self, period: Duration) -> Self {
        self.min_update_period = period;
        self
    }

    /// Enable or disable VSync
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// Set the sprite shader sources
    pub fn with_shaders(mut self, vertex: impl Into<PathBuf>, fragment: impl Into<PathBuf>) -> Self {
        self.vertex_shader = vertex.into();
        self.fragment_shader = fragment.into();
        self
    }

    fn shader_program(&self) -> ShaderProgram {
        ShaderProgram::new()
            .with_vertex_shader(&self.vertex_shader)
            .with_fragment_shader(&self.fragment_shader)
    }
}

/// Game trait that users implement
pub trait Game: 'static {
    /// Called once after the renderer exists, before the first frame.
    ///
    /// An error ends the session before any frame is drawn.
    fn init(&mut self, engine: &mut EngineContext) -> Result<(), Box<dyn std::error::Error>>;

    /// Called on every accepted logical tick
    fn update(&mut self, engine: &mut EngineContext);

    /// Called on every displayed frame
    fn render(&mut self, engine: &mut EngineContext);

    /// Called for every key press and release
    fn on_key(&mut self, _engine: &mut EngineContext, _key: KeyCode, _state: ElementState) {}

    /// Called when the window is resized
    fn on_resize(&mut self, _engine: &mut EngineContext, _width: u32, _height: u32) {}

    /// Called when the game is shutting down
    fn shutdown(&mut self, _engine: &mut EngineContext) {}
}

/// Context passed to game callbacks
pub struct EngineContext {
    /// Frame and tick counts so far
    pub counters: FrameCounters,
    /// Update gate
    gate: TickGate,
    /// Renderer (available after initialization)
    renderer: Option<Renderer>,
    /// Window size
    window_size: PhysicalSize<u32>,
    /// Should the engine quit
    should_quit: bool,
}

impl EngineContext {
    fn new(config: &EngineConfig) -> Self {
        Self {
            counters: FrameCounters::default(),
            gate: TickGate::new(config.min_update_period),
            renderer: None,
            window_size: PhysicalSize::new(config.width, config.height),
            should_quit: false,
        }
    }

    /// Get the renderer
    ///
    /// # Errors
    ///
    /// Fails before the window and renderer have been created
    pub fn renderer(&self) -> Result<&Renderer, EngineError> {
        self.renderer.as_ref().ok_or(EngineError::NotInitialized)
    }

    /// Get the renderer mutably
    ///
    /// # Errors
    ///
    /// Fails before the window and renderer have been created
    pub fn renderer_mut(&mut self) -> Result<&mut Renderer, EngineError> {
        self.renderer.as_mut().ok_or(EngineError::NotInitialized)
    }

    /// Check if renderer is available
    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }

    /// Get window width
    pub fn width(&self) -> u32 {
        self.window_size.width
    }

    /// Get window height
    pub fn height(&self) -> u32 {
        self.window_size.height
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Check if engine should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Run one displayed frame at `now`.
    ///
    /// The game updates only when the gate lets a tick through, then renders
    /// unless the update asked to quit. Returns whether the loop goes on.
    fn frame<G: Game>(&mut self, game: &mut G, now: Instant) -> bool {
        if self.gate.try_tick(now) {
            game.update(self);
            self.counters.ticks += 1;
        }

        if self.should_quit {
            return false;
        }

        game.render(self);
        self.counters.frames += 1;
        true
    }
}

/// Main engine struct
pub struct Engine<G: Game> {
    config: EngineConfig,
    game: G,
    context: EngineContext,
    window: Option<Arc<Window>>,
    initialized: bool,
    fatal: Option<EngineError>,
}

impl<G: Game> Engine<G> {
    /// Create a new engine with the given game
    pub fn new(config: EngineConfig, game: G) -> Self {
        let context = EngineContext::new(&config);
        Self {
            config,
            game,
            context,
            window: None,
            initialized: false,
            fatal: None,
        }
    }

    /// Run the engine until the window closes.
    ///
    /// # Errors
    ///
    /// Returns the event loop failure, or the startup error that closed the
    /// window before the game could run
    pub fn run(mut self) -> Result<(), EngineError> {
        log::info!("Starting engine: {}", self.config.title);

        let event_loop = EventLoop::new().map_err(|e| EngineError::EventLoop(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop
            .run_app(&mut self)
            .map_err(|e| EngineError::EventLoop(e.to_string()))?;

        let counters = self.context.counters;
        log::info!(
            "Engine stopped after {} frames and {} ticks",
            counters.frames,
            counters.ticks
        );

        match self.fatal.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Record a startup failure and close as if the user had asked to
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: EngineError) {
        log::error!("{error}");
        self.fatal = Some(error);
        event_loop.exit();
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if self.initialized {
            self.game.shutdown(&mut self.context);
            self.initialized = false;
        }
        event_loop.exit();
    }
}

impl<G: Game> ApplicationHandler for Engine<G> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.fatal.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, EngineError::Window(e.to_string()));
                return;
            }
        };

        // Initialize renderer
        let shaders = self.config.shader_program();
        let renderer = match pollster::block_on(Renderer::new(
            Arc::clone(&window),
            self.config.vsync,
            &shaders,
        )) {
            Ok(renderer) => renderer,
            Err(e) => {
                self.fail(event_loop, EngineError::Renderer(e));
                return;
            }
        };
        log::info!("GPU adapter: {}", renderer.adapter_name());

        self.context.renderer = Some(renderer);
        self.window = Some(window);

        // Initialize game
        if !self.initialized {
            if let Err(e) = self.game.init(&mut self.context) {
                self.fail(event_loop, EngineError::Startup(e.to_string()));
                return;
            }
            self.initialized = true;
            log::info!("Engine initialized successfully");
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, shutting down");
                self.shutdown(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                if new_size.width > 0 && new_size.height > 0 {
                    self.context.window_size = new_size;
                    if let Some(renderer) = &mut self.context.renderer {
                        renderer.resize(new_size.width, new_size.height);
                    }
                    if self.initialized {
                        self.game
                            .on_resize(&mut self.context, new_size.width, new_size.height);
                    }
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if !self.initialized {
                    return;
                }
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    self.game.on_key(&mut self.context, key_code, event.state);
                }
                if self.context.should_quit() {
                    self.shutdown(event_loop);
                }
            }

            WindowEvent::RedrawRequested => {
                if !self.initialized {
                    return;
                }

                if !self.context.frame(&mut self.game, Instant::now()) {
                    self.shutdown(event_loop);
                    return;
                }

                // Request next frame
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Errors that end the engine
#[derive(Debug, Clone)]
pub enum EngineError {
    /// The event loop could not start or failed while running
    EventLoop(String),
    /// The window could not be created
    Window(String),
    /// The renderer could not be created
    Renderer(RendererError),
    /// The game failed to initialize
    Startup(String),
    /// The renderer was requested before it existed
    NotInitialized,
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EventLoop(e) => write!(f, "Event loop error: {e}"),
            Self::Window(e) => write!(f, "Window error: {e}"),
            Self::Renderer(e) => write!(f, "Renderer error: {e}"),
            Self::Startup(e) => write!(f, "Startup failed: {e}"),
            Self::NotInitialized => write!(f, "Renderer not initialized"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Renderer(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RendererError> for EngineError {
    fn from(e: RendererError) -> Self {
        Self::Renderer(e)
    }
}
