//! Backend abstraction for presenting a frame
//!
//! This is the seam to the external rasterizer: the engine records
//! [`DrawCommand`]s and a backend turns them into pixels, a window blit, a
//! terminal dump or nothing at all.

use super::commands::DrawCommand;
use super::RenderError;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Presents recorded frames
pub trait RenderBackend {
    /// Present the commands recorded for `frame`
    fn present(&mut self, frame: u64, commands: &[DrawCommand]) -> BackendResult<()>;

    /// Called once when the engine shuts down
    fn shutdown(&mut self) {}
}

/// Discards every frame
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl RenderBackend for NullBackend {
    fn present(&mut self, _frame: u64, _commands: &[DrawCommand]) -> BackendResult<()> {
        Ok(())
    }
}

/// Logs every frame: a summary at `debug`, each command at `trace`
#[derive(Debug, Default, Clone)]
pub struct LogBackend {
    presented: u64,
}

impl LogBackend {
    /// Create a logging backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames presented so far
    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl RenderBackend for LogBackend {
    fn present(&mut self, frame: u64, commands: &[DrawCommand]) -> BackendResult<()> {
        log::debug!("Frame {}: {} draw commands", frame, commands.len());
        for (i, command) in commands.iter().enumerate() {
            log::trace!("  Command {}: {:?}", i, command);
        }
        self.presented += 1;
        Ok(())
    }

    fn shutdown(&mut self) {
        log::info!("LogBackend presented {} frames", self.presented);
    }
}
