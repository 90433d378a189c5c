//! Core engine implementation

use crate::{
    assets::{Resources, SearchPaths},
    config::{Config, ConfigError, Deserialize, Serialize},
    foundation::{
        logging,
        math::Vec2,
        time::{FixedStep, Timer},
    },
    render::{LogBackend, RenderBackend, RenderContext, RenderError},
    runtime::{ExecutionLoopStack, GameLoop, LoopControl, LoopError, TickContext},
};
use std::path::PathBuf;
use thiserror::Error;

/// Main engine struct
///
/// The engine owns everything that lives for the whole process: resource
/// caches, the loop stack, the backend and frame timing. Each frame it ticks
/// the current loop, applies the transition that loop asked for, then renders
/// whichever loop is current afterwards.
pub struct Engine {
    config: EngineConfig,
    resources: Resources,
    loops: ExecutionLoopStack,
    backend: Box<dyn RenderBackend>,
    clock: FixedStep,
    timer: Timer,
    render_ctx: RenderContext,
    frame: u64,
    running: bool,
}

impl Engine {
    /// Create an engine that logs its frames instead of drawing them
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_backend(config, Box::new(LogBackend::new()))
    }

    /// Create an engine presenting through `backend`
    pub fn with_backend(config: EngineConfig, backend: Box<dyn RenderBackend>) -> Result<Self, EngineError> {
        log::info!("Initializing engine '{}'...", config.window.title);

        if config.window.width == 0 || config.window.height == 0 {
            return Err(EngineError::InitializationFailed(format!(
                "Window size {}x{} is empty",
                config.window.width, config.window.height
            )));
        }

        let resources = Resources::new(&config.search_paths());
        let clock = FixedStep::new(config.timing.ticks_per_second, config.timing.pace_frames);
        let render_ctx = RenderContext::new(config.viewport());

        Ok(Self {
            config,
            resources,
            loops: ExecutionLoopStack::new(),
            backend,
            clock,
            timer: Timer::new(),
            render_ctx,
            frame: 0,
            running: true,
        })
    }

    /// Run `root` to completion with a fresh engine
    pub fn run(config: EngineConfig, root: Box<dyn GameLoop>) -> Result<(), EngineError> {
        let mut engine = Self::new(config)?;
        engine.execute(root)
    }

    /// Push `root` and step until the engine stops, then shut down
    pub fn execute(&mut self, root: Box<dyn GameLoop>) -> Result<(), EngineError> {
        self.start_loop(root)?;

        log::info!("Starting main loop...");
        let result = loop {
            match self.step() {
                Ok(true) => continue,
                Ok(false) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        if let Err(e) = &result {
            log::error!("Main loop failed: {}", e);
        }
        self.shutdown();
        result
    }

    /// Advance exactly one frame
    ///
    /// Returns `false` once there is nothing left to run: the stack emptied,
    /// a loop returned [`LoopControl::Quit`], [`quit`](Self::quit) was called,
    /// or `max_frames` was reached.
    pub fn step(&mut self) -> Result<bool, EngineError> {
        if !self.running || self.loops.is_empty() {
            return Ok(false);
        }

        self.clock.begin_frame();
        self.timer.update();

        let mut tick = TickContext {
            delta_time: self.clock.delta_time(),
            frame: self.frame,
            resources: &mut self.resources,
        };
        let control = self.loops.current_mut()?.tick(&mut tick)?;
        self.apply(control)?;

        if self.running {
            if let Ok(current) = self.loops.current() {
                self.render_ctx.reset(self.frame);
                current.render(&mut self.render_ctx)?;
                self.backend.present(self.frame, self.render_ctx.commands())?;
            }
        }

        self.frame += 1;
        if let Some(max_frames) = self.config.timing.max_frames {
            if self.frame >= max_frames && self.running {
                log::info!("Reached frame limit ({})", max_frames);
                self.running = false;
            }
        }

        self.clock.end_frame();
        Ok(self.running && !self.loops.is_empty())
    }

    /// Start `game_loop` on top of the current one
    pub fn start_loop(&mut self, mut game_loop: Box<dyn GameLoop>) -> Result<(), EngineError> {
        game_loop.on_start(&mut self.resources)?;
        if let Ok(current) = self.loops.current_mut() {
            current.on_suspend();
        }
        self.loops.push(game_loop);
        Ok(())
    }

    /// Pop the current loop and resume the one underneath
    pub fn finish_current(&mut self) -> Result<Box<dyn GameLoop>, EngineError> {
        let mut finished = self.loops.pop()?;
        finished.on_finish();
        if let Ok(resumed) = self.loops.current_mut() {
            log::debug!("Resuming loop '{}'", resumed.name());
            resumed.on_resume();
        }
        Ok(finished)
    }

    fn apply(&mut self, control: LoopControl) -> Result<(), EngineError> {
        match control {
            LoopControl::Continue => {}
            LoopControl::Push(next) => self.start_loop(next)?,
            LoopControl::Finish => {
                self.finish_current()?;
                if self.loops.is_empty() {
                    log::info!("Loop stack is empty");
                    self.running = false;
                }
            }
            LoopControl::Quit => self.quit(),
        }
        Ok(())
    }

    /// Finish every remaining loop and release process resources
    pub fn shutdown(&mut self) {
        while let Ok(mut remaining) = self.loops.pop() {
            remaining.on_finish();
        }
        self.resources.clear();
        self.backend.shutdown();
        self.running = false;
        log::info!(
            "Engine shutdown complete after {} frames ({:.1} fps average)",
            self.frame,
            self.timer.average_fps()
        );
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the engine will keep stepping
    pub fn is_running(&self) -> bool {
        self.running && !self.loops.is_empty()
    }

    /// The engine's resource caches
    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    /// Mutable access to the resource caches
    pub fn resources_mut(&mut self) -> &mut Resources {
        &mut self.resources
    }

    /// The loop stack
    pub fn loops(&self) -> &ExecutionLoopStack {
        &self.loops
    }

    /// Frames completed so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Seconds simulated per tick
    pub fn delta_time(&self) -> f32 {
        self.clock.delta_time()
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("loops", &self.loops)
            .field("frame", &self.frame)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Window configuration
    pub window: WindowConfig,

    /// Frame timing
    pub timing: TimingConfig,

    /// Asset system configuration
    pub assets: AssetConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Size of the drawing surface
    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.window.width as f32, self.window.height as f32)
    }

    /// Asset search paths
    pub fn search_paths(&self) -> SearchPaths {
        SearchPaths::new(self.assets.search_paths.iter().cloned())
    }

    /// Initialize `env_logger` with this configuration's default filter
    pub fn init_logging(&self) {
        logging::init_with_filter(&self.logging.filter);
    }
}

/// Window configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,

    /// Window width
    pub width: u32,

    /// Window height
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Sprite Engine Application".to_string(),
            width: 800,
            height: 600,
        }
    }
}

/// Frame timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Simulation ticks per second
    pub ticks_per_second: u32,

    /// Sleep off the remainder of each frame
    pub pace_frames: bool,

    /// Stop after this many frames
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_frames: Option<u64>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 60,
            pace_frames: true,
            max_frames: None,
        }
    }
}

/// Asset system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directories searched, in order, when resolving a reference
    pub search_paths: Vec<PathBuf>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            search_paths: vec![PathBuf::from("resources")],
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Initialization error
    #[error("Engine initialization failed: {0}")]
    InitializationFailed(String),

    /// A loop failed or the stack was misused
    #[error("Loop error: {0}")]
    Loop(#[from] LoopError),

    /// Rendering error
    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFormat;
    use crate::render::NullBackend;
    use crate::scene::World;

    fn headless(max_frames: Option<u64>) -> EngineConfig {
        let mut config = EngineConfig::default();
        config.timing.pace_frames = false;
        config.timing.max_frames = max_frames;
        config
    }

    struct Counter {
        world: World,
        ticks: u32,
        finish_after: u32,
    }

    impl GameLoop for Counter {
        fn world(&self) -> &World {
            &self.world
        }

        fn world_mut(&mut self) -> &mut World {
            &mut self.world
        }

        fn tick(&mut self, _ctx: &mut TickContext<'_>) -> Result<LoopControl, LoopError> {
            self.ticks += 1;
            if self.ticks >= self.finish_after {
                Ok(LoopControl::Finish)
            } else {
                Ok(LoopControl::Continue)
            }
        }
    }

    fn counter(finish_after: u32) -> Box<dyn GameLoop> {
        Box::new(Counter {
            world: World::new(Vec2::new(8.0, 8.0)),
            ticks: 0,
            finish_after,
        })
    }

    #[test]
    fn test_config_defaults_survive_partial_files() {
        let config = EngineConfig::from_str_as("[timing]\nmax_frames = 5\n", ConfigFormat::Toml).unwrap();
        assert_eq!(config.timing.max_frames, Some(5));
        assert_eq!(config.timing.ticks_per_second, 60);
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn test_config_round_trips_in_both_formats() {
        let mut config = headless(Some(3));
        config.window.title = "Round trip".to_string();
        config.assets.search_paths.push(PathBuf::from("extra"));

        for format in [ConfigFormat::Toml, ConfigFormat::Ron] {
            let text = config.to_string_as(format).unwrap();
            assert_eq!(EngineConfig::from_str_as(&text, format).unwrap(), config);
        }
    }

    #[test]
    fn test_empty_window_is_rejected() {
        let mut config = headless(None);
        config.window.width = 0;
        assert!(matches!(
            Engine::with_backend(config, Box::new(NullBackend)),
            Err(EngineError::InitializationFailed(_))
        ));
    }

    #[test]
    fn test_step_without_loops_does_nothing() {
        let mut engine = Engine::with_backend(headless(None), Box::new(NullBackend)).unwrap();
        assert!(!engine.step().unwrap());
        assert_eq!(engine.frame(), 0);
    }

    #[test]
    fn test_finish_empties_stack_and_stops() {
        let mut engine = Engine::with_backend(headless(None), Box::new(NullBackend)).unwrap();
        engine.execute(counter(4)).unwrap();
        assert_eq!(engine.frame(), 4);
        assert!(engine.loops().is_empty());
        assert!(!engine.is_running());
    }

    #[test]
    fn test_max_frames_stops_long_running_loop() {
        let mut engine = Engine::with_backend(headless(Some(10)), Box::new(NullBackend)).unwrap();
        engine.execute(counter(u32::MAX)).unwrap();
        assert_eq!(engine.frame(), 10);
        // Shutdown finishes whatever was still running
        assert!(engine.loops().is_empty());
    }

    #[test]
    fn test_finish_current_on_empty_stack_errors() {
        let mut engine = Engine::with_backend(headless(None), Box::new(NullBackend)).unwrap();
        assert!(matches!(
            engine.finish_current(),
            Err(EngineError::Loop(LoopError::EmptyStack))
        ));
    }
}
