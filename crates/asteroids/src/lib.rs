//! Asteroids
//!
//! A small headless asteroids game on top of `sprite_engine`. The ship is
//! flown by an autopilot, every frame is handed to the engine's render
//! backend, and each life starts with a nested "get ready" loop.

#![warn(missing_docs)]

pub mod assets;
pub mod components;
pub mod config;
pub mod game;
pub mod get_ready;
pub mod hud;
pub mod pilot;

pub use config::{GameConfig, GameplayConfig};
pub use game::AsteroidsLoop;
