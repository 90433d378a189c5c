//! Time management utilities

use std::time::{Duration, Instant};

/// High-precision timer for frame timing
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.delta_time = elapsed.as_secs_f32();
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since timer creation
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}

/// Fixed-rate tick clock
///
/// Hands out the same delta every tick so simulation stays deterministic, and
/// optionally sleeps off whatever is left of the frame budget.
#[derive(Debug, Clone)]
pub struct FixedStep {
    step: Duration,
    frame_start: Instant,
    pace: bool,
}

impl FixedStep {
    /// Create a clock for `ticks_per_second` (clamped to at least 1)
    pub fn new(ticks_per_second: u32, pace: bool) -> Self {
        let ticks = ticks_per_second.max(1);
        Self {
            step: Duration::from_secs_f64(1.0 / f64::from(ticks)),
            frame_start: Instant::now(),
            pace,
        }
    }

    /// Seconds per tick
    pub fn delta_time(&self) -> f32 {
        self.step.as_secs_f32()
    }

    /// Mark the start of a frame
    pub fn begin_frame(&mut self) {
        self.frame_start = Instant::now();
    }

    /// Finish a frame, sleeping off the remaining budget when pacing is on
    pub fn end_frame(&mut self) {
        if !self.pace {
            return;
        }
        let spent = self.frame_start.elapsed();
        if let Some(remaining) = self.step.checked_sub(spent) {
            std::thread::sleep(remaining);
        }
    }
}
