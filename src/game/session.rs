//! Game session
//!
//! A [`Session`] owns everything one play-through needs: the physics world,
//! the level, the textures, the draw list and the camera. There is no global
//! state; the engine shell drives a session through [`Session::tick`] and
//! [`Session::render`].

use std::fmt;

use glam::Vec2;

use super::entities::{Background, Block, Drawable, Player};
use super::level::{Level, LevelParseError};
use super::rect::Rect;
use super::scene::DrawList;
use crate::config::{ConfigError, GameConfig, PlayerConfig};
use crate::input::{ActionQueue, InputAction};
use crate::physics::{BodyHandle, CoordinateMapper, PhysicsWorld, ShapeDescriptor};
use crate::renderer::{
    Camera2D, DrawQueue, SpriteBackend, TextureError, TextureFill, TextureRegistry, TextureSpec,
};

/// Textures loaded at startup
pub fn texture_specs() -> Vec<TextureSpec> {
    vec![
        TextureSpec::new(Player::TEXTURE, "player.png", TextureFill::Stretch, true),
        TextureSpec::new(Background::TEXTURE, "background.png", TextureFill::Tile, false),
        TextureSpec::new(Block::TEXTURE, "solid.png", TextureFill::Tile, false),
    ]
}

/// One running game
pub struct Session {
    config: GameConfig,
    mapper: CoordinateMapper,
    world: PhysicsWorld,
    level: Level,
    textures: TextureRegistry,
    draw_list: DrawList,
    camera: Camera2D,
    actions: ActionQueue,
    player_body: BodyHandle,
    player_size: Vec2,
}

impl Session {
    /// Load textures and the configured level, then build the session
    ///
    /// # Errors
    ///
    /// Fails if the config holds an unusable value, a critical texture is
    /// missing or the level does not parse
    pub fn build(config: GameConfig, backend: &mut dyn SpriteBackend) -> Result<Self, SessionError> {
        config.validate()?;
        let textures = TextureRegistry::load_all(backend, &config.asset_dir, &texture_specs())?;
        let level = Level::load(&config.level_path, config.tile_size)?;
        Ok(Self::with_level(config, level, textures, backend))
    }

    /// Build a session from an already parsed level.
    ///
    /// Creates one static body per block and the player's dynamic body,
    /// initializes every drawable, then runs one tick so drawables start in
    /// sync with their bodies.
    pub fn with_level(
        config: GameConfig,
        level: Level,
        textures: TextureRegistry,
        backend: &mut dyn SpriteBackend,
    ) -> Self {
        let viewport = config.viewport();
        let mapper = CoordinateMapper::new(config.unit_scale, viewport);
        let mut world = PhysicsWorld::new(config.gravity);
        let mut draw_list = DrawList::new();

        let margin = Vec2::splat(config.background_margin);
        draw_list.push(Drawable::Background(Background::new(
            viewport + margin,
            config.depth.background,
        )));

        for block in level.blocks() {
            let body = world.create_static_body(
                mapper.to_sim_space(block.rect.center()),
                ShapeDescriptor::cuboid(mapper.extent_to_sim(block.rect.half_extents())),
            );
            draw_list.push(Drawable::Block(Block::new(block.rect, config.depth.blocks, body)));
        }

        let player_size = config.player.size;
        let spawn = level.start() - Vec2::new(0.0, config.player.spawn_lift * player_size.y);
        let player_rect = Rect::new(spawn.x, spawn.y, player_size.x, player_size.y);
        let player_body = world.create_dynamic_body(
            mapper.to_sim_space(player_rect.center()),
            ShapeDescriptor::cuboid(mapper.extent_to_sim(player_rect.half_extents())),
        );
        draw_list.push(Drawable::Player(Player::new(
            player_rect,
            config.depth.player,
            player_body,
        )));

        draw_list.init(backend, &textures);
        log::info!(
            "Session ready: {} blocks, {} textures, player at ({}, {})",
            level.blocks().len(),
            textures.len(),
            spawn.x,
            spawn.y
        );

        let mut session = Self {
            camera: Camera2D::new(viewport),
            config,
            mapper,
            world,
            level,
            textures,
            draw_list,
            actions: ActionQueue::new(),
            player_body,
            player_size,
        };
        session.tick();
        session
    }

    /// Queue a player action for the next tick
    pub fn push_action(&mut self, action: InputAction) {
        if action.is_movement() {
            self.actions.push(action);
        }
    }

    /// Run one logical tick: apply queued input, update drawables, step
    pub fn tick(&mut self) {
        let player = self.config.player;
        for action in self.actions.drain() {
            if let Some(force) = action_force(&player, action) {
                self.world.apply_force(self.player_body, force);
            }
        }

        self.draw_list.update(&self.world, &self.mapper);

        let step = self.config.step;
        self.world.step(step.dt, step.velocity_iterations, step.position_iterations);
    }

    /// Center the camera on the player and queue every drawable
    pub fn render(&mut self, queue: &mut DrawQueue) {
        if let Some(player) = self.draw_list.player() {
            let rect = player.rect();
            self.camera.follow(rect.position, rect.half_extents());
        }

        let translation = self.camera.translation();
        if let Some(background) = self.draw_list.background_mut() {
            background.set_position(-translation);
        }

        let stack = self.camera.transform_stack();
        self.draw_list.load_transform(&stack);
        self.draw_list.draw(queue);
    }

    /// Player rectangle as last synced from its body
    pub fn player_rect(&self) -> Rect {
        self.draw_list
            .player()
            .map_or(Rect::new(0.0, 0.0, self.player_size.x, self.player_size.y), Player::rect)
    }

    pub fn player_body(&self) -> BodyHandle {
        self.player_body
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    pub fn draw_list(&self) -> &DrawList {
        &self.draw_list
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Number of ticks run, including the initial one
    pub fn tick_count(&self) -> u64 {
        self.world.step_count()
    }
}

fn action_force(player: &PlayerConfig, action: InputAction) -> Option<Vec2> {
    match action {
        InputAction::Jump => Some(Vec2::new(0.0, -player.jump_force)),
        InputAction::MoveLeft => Some(Vec2::new(-player.move_force, 0.0)),
        InputAction::MoveRight => Some(Vec2::new(player.move_force, 0.0)),
        InputAction::Quit => None,
    }
}

/// Fatal startup errors
#[derive(Debug, Clone)]
pub enum SessionError {
    /// The config holds a value the world cannot be built from
    Config(ConfigError),
    /// A critical texture could not be loaded
    Texture(TextureError),
    /// The level could not be loaded
    Level(LevelParseError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Config error: {e}"),
            Self::Texture(e) => write!(f, "Texture error: {e}"),
            Self::Level(e) => write!(f, "Level error: {e}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Texture(e) => Some(e),
            Self::Level(e) => Some(e),
        }
    }
}

impl From<ConfigError> for SessionError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<TextureError> for SessionError {
    fn from(e: TextureError) -> Self {
        Self::Texture(e)
    }
}

impl From<LevelParseError> for SessionError {
    fn from(e: LevelParseError) -> Self {
        Self::Level(e)
    }
}
