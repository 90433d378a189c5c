//! Game configuration

use serde::{Deserialize, Serialize};
use sprite_engine::config::Config;
use sprite_engine::EngineConfig;

/// Game configuration, loaded from `asteroids.toml` or `asteroids.ron`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Engine settings (window, timing, assets, logging)
    pub engine: EngineConfig,

    /// Gameplay settings
    pub gameplay: GameplayConfig,
}

impl Config for GameConfig {}

impl Default for GameConfig {
    fn default() -> Self {
        let mut engine = EngineConfig::default();
        engine.window.title = "Rusteroids".to_string();
        engine.window.width = 1024;
        engine.window.height = 768;
        Self {
            engine,
            gameplay: GameplayConfig::default(),
        }
    }
}

/// Gameplay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// Starting lives
    pub starting_lives: u32,

    /// Asteroids in the first wave; each later wave adds one
    pub asteroid_count: u32,

    /// Asteroid speed multiplier
    pub difficulty: f32,

    /// Ship acceleration
    pub ship_acceleration: f32,

    /// Ship max speed
    pub ship_max_speed: f32,

    /// Ship rotation speed in radians per second
    pub ship_rotation_speed: f32,

    /// Bullet speed
    pub bullet_speed: f32,

    /// Bullet lifetime (seconds)
    pub bullet_lifetime: f32,

    /// Seconds between shots
    pub fire_cooldown: f32,

    /// Bullets allowed in flight at once
    pub max_bullets: usize,

    /// Seconds of invulnerability after (re)spawning
    pub respawn_invulnerability: f32,

    /// Length of the "get ready" countdown
    pub get_ready_seconds: f32,

    /// RNG seed; a random seed is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            starting_lives: 3,
            asteroid_count: 5,
            difficulty: 1.0,
            ship_acceleration: 500.0,
            ship_max_speed: 300.0,
            ship_rotation_speed: 3.0,
            bullet_speed: 600.0,
            bullet_lifetime: 1.0,
            fire_cooldown: 0.25,
            max_bullets: 4,
            respawn_invulnerability: 2.0,
            get_ready_seconds: 2.0,
            seed: None,
        }
    }
}
