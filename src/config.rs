//! Game configuration
//!
//! Every tunable constant of a session, with defaults matching the shipped
//! game. A RON file may override any subset of fields.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Fixed parameters of every physics step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepConfig {
    /// Simulated seconds per step, independent of wall-clock time
    pub dt: f32,
    /// Velocity solver iterations
    pub velocity_iterations: usize,
    /// Position solver iterations
    pub position_iterations: usize,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            dt: 1.0 / 10.0,
            velocity_iterations: 30,
            position_iterations: 30,
        }
    }
}

/// Player size and controls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Width and height in pixels
    pub size: Vec2,
    /// Spawn height above the level start, in player heights
    pub spawn_lift: f32,
    /// Upward force applied by a jump (physics units)
    pub jump_force: f32,
    /// Sideways force applied by a move (physics units)
    pub move_force: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            size: Vec2::new(50.0, 100.0),
            spawn_lift: 2.0,
            jump_force: 10.0,
            move_force: 2.0,
        }
    }
}

/// Draw depth per drawable kind; lower is nearer the camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthConfig {
    pub background: f32,
    pub blocks: f32,
    pub player: f32,
}

impl Default for DepthConfig {
    fn default() -> Self {
        Self {
            background: 0.9,
            blocks: 0.2,
            player: 0.0,
        }
    }
}

/// Complete session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Logical viewport width in pixels
    pub width: u32,
    /// Logical viewport height in pixels
    pub height: u32,
    /// Pixels per physics unit
    pub unit_scale: f32,
    /// Gravity in physics units; positive Y points down the screen
    pub gravity: Vec2,
    /// Physics step parameters
    pub step: StepConfig,
    /// Maximum logical updates per second
    pub update_rate: f64,
    /// Player parameters
    pub player: PlayerConfig,
    /// Default block edge length in pixels
    pub tile_size: f32,
    /// Extra size of the background beyond the viewport, in pixels
    pub background_margin: f32,
    /// Draw depths
    pub depth: DepthConfig,
    /// Level file
    pub level_path: PathBuf,
    /// Directory holding texture images
    pub asset_dir: PathBuf,
    /// Vertex shader source
    pub vertex_shader: PathBuf,
    /// Fragment shader source
    pub fragment_shader: PathBuf,
    /// Where the session log is written on exit
    pub log_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            unit_scale: 100.0,
            gravity: Vec2::new(0.0, 0.8),
            step: StepConfig::default(),
            update_rate: 60.0,
            player: PlayerConfig::default(),
            tile_size: 50.0,
            background_margin: 200.0,
            depth: DepthConfig::default(),
            level_path: PathBuf::from("content/level1.fl"),
            asset_dir: PathBuf::from("content/textures"),
            vertex_shader: PathBuf::from("shaders/sprite.vert.wgsl"),
            fragment_shader: PathBuf::from("shaders/sprite.frag.wgsl"),
            log_path: PathBuf::from("fitch.log"),
        }
    }
}

impl GameConfig {
    /// Default config file name
    pub const DEFAULT_PATH: &'static str = "fitch.ron";

    /// Viewport size in pixels
    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Minimum wall-clock time between logical updates.
    ///
    /// Zero, so every frame updates, when the rate is not a positive number.
    pub fn min_update_period(&self) -> Duration {
        Duration::try_from_secs_f64(self.update_rate.recip()).unwrap_or(Duration::ZERO)
    }

    /// Check the values the engine divides by or builds shapes from
    ///
    /// # Errors
    ///
    /// Returns the first field that is zero, negative or not finite
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::invalid("width", "must be at least 1"));
        }
        if self.height == 0 {
            return Err(ConfigError::invalid("height", "must be at least 1"));
        }
        if !(self.update_rate.is_finite() && self.update_rate > 0.0) {
            return Err(ConfigError::invalid("update_rate", "must be a positive number"));
        }

        let positive = [
            ("unit_scale", self.unit_scale),
            ("tile_size", self.tile_size),
            ("step.dt", self.step.dt),
            ("player.size.x", self.player.size.x),
            ("player.size.y", self.player.size.y),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::invalid(field, "must be a positive number"));
            }
        }

        if !self.gravity.is_finite() {
            return Err(ConfigError::invalid("gravity", "must be finite"));
        }
        if self.step.velocity_iterations == 0 || self.step.position_iterations == 0 {
            return Err(ConfigError::invalid("step", "iterations must be at least 1"));
        }
        Ok(())
    }

    /// Parse and validate a RON document; missing fields keep their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid RON for this type, or
    /// if a value fails [`GameConfig::validate`]
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a RON config file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Load `path` if it exists, falling back to defaults.
    ///
    /// A file that exists but does not parse or validate is reported and
    /// ignored.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Errors that can occur while loading the config
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error
    Io(String),
    /// Malformed RON
    Parse(String),
    /// Well-formed RON holding an unusable value
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::Invalid { field, reason }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Parse(e) => write!(f, "Parse error: {e}"),
            Self::Invalid { field, reason } => write!(f, "Invalid `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_shipped_game() {
        let config = GameConfig::default();
        assert_eq!(config.viewport(), Vec2::new(800.0, 600.0));
        assert_eq!(config.unit_scale, 100.0);
        assert_eq!(config.gravity, Vec2::new(0.0, 0.8));
        assert_eq!(config.step.velocity_iterations, 30);
        assert_eq!(config.step.position_iterations, 30);
        assert!((config.step.dt - 0.1).abs() < f32::EPSILON);

        let period = config.min_update_period().as_micros();
        assert!((16_666..=16_667).contains(&period));
    }

    #[test]
    fn test_partial_override() {
        let config = GameConfig::from_ron_str(
            r#"(
                unit_scale: 50.0,
                step: (dt: 0.05),
                level_path: "levels/test.fl",
            )"#,
        )
        .unwrap();

        assert_eq!(config.unit_scale, 50.0);
        assert!((config.step.dt - 0.05).abs() < f32::EPSILON);
        assert_eq!(config.step.velocity_iterations, 30);
        assert_eq!(config.level_path, PathBuf::from("levels/test.fl"));
        assert_eq!(config.width, 800);
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fitch.ron");
        fs::write(&path, "(unit_scale: \"lots\")").unwrap();

        assert!(matches!(GameConfig::load(&path), Err(ConfigError::Parse(_))));
        assert_eq!(GameConfig::load_or_default(&path), GameConfig::default());
    }

    #[test]
    fn test_unusable_values_are_rejected() {
        let cases = [
            ("(update_rate: 0.0)", "update_rate"),
            ("(update_rate: -5.0)", "update_rate"),
            ("(unit_scale: 0.0)", "unit_scale"),
            ("(tile_size: 0.0)", "tile_size"),
            ("(tile_size: -50.0)", "tile_size"),
            ("(step: (dt: 0.0))", "step.dt"),
            ("(step: (velocity_iterations: 0))", "step"),
            ("(player: (size: (0.0, 100.0)))", "player.size.x"),
            ("(player: (size: (50.0, 0.0)))", "player.size.y"),
            ("(width: 0)", "width"),
            ("(height: 0)", "height"),
        ];

        for (text, expected) in cases {
            match GameConfig::from_ron_str(text) {
                Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected, "{text}"),
                other => panic!("{text} gave {other:?}"),
            }
        }
    }

    #[test]
    fn test_zero_update_rate_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fitch.ron");
        fs::write(&path, "(update_rate: 0.0, tile_size: 0.0)").unwrap();

        assert!(matches!(GameConfig::load(&path), Err(ConfigError::Invalid { .. })));

        let config = GameConfig::load_or_default(&path);
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.min_update_period(), GameConfig::default().min_update_period());
    }

    #[test]
    fn test_min_update_period_never_panics() {
        for rate in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = GameConfig {
                update_rate: rate,
                ..GameConfig::default()
            };
            assert_eq!(config.min_update_period(), Duration::ZERO);
        }

        let slow = GameConfig {
            update_rate: 0.5,
            ..GameConfig::default()
        };
        assert_eq!(slow.min_update_period(), Duration::from_secs(2));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = GameConfig::load_or_default(dir.path().join("absent.ron"));
        assert_eq!(config, GameConfig::default());
    }
}
