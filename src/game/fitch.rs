//! The platformer as an engine [`Game`]

use winit::event::ElementState;
use winit::keyboard::KeyCode;

use super::session::Session;
use crate::config::GameConfig;
use crate::core::{EngineConfig, EngineContext, Game};
use crate::input::{InputAction, InputMapper};
use crate::renderer::DrawQueue;

/// Wires a [`Session`] to the engine's window, renderer and keyboard
pub struct FitchGame {
    config: GameConfig,
    input: InputMapper,
    session: Option<Session>,
    draws: DrawQueue,
}

impl FitchGame {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            input: InputMapper::with_defaults(),
            session: None,
            draws: DrawQueue::new(),
        }
    }

    /// Engine settings matching this game's config
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_title("Fitch")
            .with_size(self.config.width, self.config.height)
            .with_min_update_period(self.config.min_update_period())
            .with_shaders(&self.config.vertex_shader, &self.config.fragment_shader)
    }
}

impl Game for FitchGame {
    fn init(&mut self, ctx: &mut EngineContext) -> Result<(), Box<dyn std::error::Error>> {
        let renderer = ctx.renderer_mut()?;
        let session = Session::build(self.config.clone(), renderer)?;
        self.session = Some(session);
        Ok(())
    }

    fn update(&mut self, _ctx: &mut EngineContext) {
        if let Some(session) = &mut self.session {
            session.tick();
        }
    }

    fn render(&mut self, ctx: &mut EngineContext) {
        let Some(session) = &mut self.session else {
            return;
        };

        self.draws.clear();
        session.render(&mut self.draws);
        if let Ok(renderer) = ctx.renderer() {
            renderer.render(&self.draws);
        }
    }

    fn on_key(&mut self, ctx: &mut EngineContext, key: KeyCode, state: ElementState) {
        if state != ElementState::Pressed {
            return;
        }

        match self.input.get_action(key) {
            Some(InputAction::Quit) => {
                log::info!("Quit requested");
                ctx.quit();
            }
            Some(action) => {
                if let Some(session) = &mut self.session {
                    session.push_action(action);
                }
            }
            None => {}
        }
    }

    fn on_resize(&mut self, _ctx: &mut EngineContext, width: u32, height: u32) {
        log::debug!(
            "Window is {}x{}, viewport stays {}x{}",
            width,
            height,
            self.config.width,
            self.config.height
        );
    }

    fn shutdown(&mut self, _ctx: &mut EngineContext) {
        if let Some(session) = &self.session {
            log::info!("Session ended after {} ticks", session.tick_count());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_follows_game_config() {
        let config = GameConfig {
            width: 1024,
            height: 768,
            update_rate: 30.0,
            ..GameConfig::default()
        };
        let engine = FitchGame::new(config).engine_config();

        assert_eq!(engine.title, "Fitch");
        assert_eq!((engine.width, engine.height), (1024, 768));
        assert_eq!(engine.min_update_period.as_millis(), 33);
    }
}
