//! Asteroids entry point
//!
//! Usage: `asteroids [config.toml|config.ron]` (defaults to `asteroids.toml`)

use asteroids::{AsteroidsLoop, GameConfig};
use sprite_engine::config::Config;
use sprite_engine::Engine;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "asteroids.toml".to_string());
    let config = GameConfig::load_or_default(&path)?;
    config.engine.init_logging();

    log::info!("Starting {}", config.engine.window.title);
    // The engine validates the window before the playfield is sized from it
    let field = config.engine.viewport();
    let mut engine = Engine::new(config.engine)?;
    let game = AsteroidsLoop::new(config.gameplay, field);
    engine.execute(Box::new(game))?;

    log::info!("Asteroids exited cleanly");
    Ok(())
}
