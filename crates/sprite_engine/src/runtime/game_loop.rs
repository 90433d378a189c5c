//! Game loop trait and lifecycle

use crate::assets::{CacheError, Resources};
use crate::render::{RenderContext, RenderError};
use crate::scene::World;
use thiserror::Error;

/// What the engine should do after a tick
pub enum LoopControl {
    /// Keep running this loop
    Continue,
    /// Suspend this loop and run `next` until it finishes
    Push(Box<dyn GameLoop>),
    /// This loop is done; resume the one below it
    Finish,
    /// Stop the engine
    Quit,
}

impl std::fmt::Debug for LoopControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Continue => f.write_str("Continue"),
            Self::Push(next) => write!(f, "Push({})", next.name()),
            Self::Finish => f.write_str("Finish"),
            Self::Quit => f.write_str("Quit"),
        }
    }
}

/// Per-tick inputs handed to the current loop
pub struct TickContext<'a> {
    /// Seconds simulated by this tick
    pub delta_time: f32,
    /// Engine frame counter
    pub frame: u64,
    /// Engine resource caches
    pub resources: &'a mut Resources,
}

/// Loop and loop-stack errors
#[derive(Debug, Error)]
pub enum LoopError {
    /// No loop is active
    #[error("No game loop is active")]
    EmptyStack,

    /// A resource the loop needs could not be resolved
    #[error("Resource error: {0}")]
    Resource(#[from] CacheError),

    /// Rendering failed
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Game-specific failure
    #[error("Game logic error: {0}")]
    GameLogic(String),
}

/// A span of program execution that owns one world
///
/// Loops are stacked: a loop may start a nested loop (pause menu, cut-scene)
/// by returning [`LoopControl::Push`], and resumes when that loop returns
/// [`LoopControl::Finish`]. The engine applies these transitions between
/// ticks, never during a loop's own tick or render.
pub trait GameLoop {
    /// Name used in log messages
    fn name(&self) -> &str {
        "loop"
    }

    /// The scene this loop drives
    fn world(&self) -> &World;

    /// Mutable access to the scene
    fn world_mut(&mut self) -> &mut World;

    /// Advance the simulation by one tick
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<LoopControl, LoopError>;

    /// Draw the current state
    fn render(&self, ctx: &mut RenderContext) -> Result<(), RenderError> {
        self.world().render(ctx)
    }

    /// Called once before the first tick, while resources are available
    fn on_start(&mut self, _resources: &mut Resources) -> Result<(), LoopError> {
        Ok(())
    }

    /// A nested loop was pushed on top of this one
    fn on_suspend(&mut self) {}

    /// The loop on top of this one finished
    fn on_resume(&mut self) {}

    /// This loop was popped off the stack
    fn on_finish(&mut self) {}
}
