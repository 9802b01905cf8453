//! Time management utilities

use std::time::Instant;

/// Frame timer supplying the per-frame delta time to the scene update
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
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer from the wall clock (call once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.advance(elapsed.as_secs_f32());
    }

    /// Advance by a fixed step instead of the wall clock
    ///
    /// Used by headless runs so every frame sees the same delta.
    pub fn tick_fixed(&mut self, delta_time: f32) {
        self.last_frame = Instant::now();
        self.advance(delta_time.max(0.0));
    }

    fn advance(&mut self, delta_time: f32) {
        self.delta_time = delta_time;
        self.total_time += delta_time;
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
    #[allow(clippy::cast_precision_loss)]
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }

    /// Get the current FPS (based on last frame time)
    pub fn current_fps(&self) -> f32 {
        if self.delta_time > 0.0 {
            1.0 / self.delta_time
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fixed_ticks_accumulate() {
        let mut timer = Timer::new();
        for _ in 0..4 {
            timer.tick_fixed(0.25);
        }

        assert_eq!(timer.frame_count(), 4);
        assert_relative_eq!(timer.total_time(), 1.0);
        assert_relative_eq!(timer.delta_time(), 0.25);
        assert_relative_eq!(timer.average_fps(), 4.0);
        assert_relative_eq!(timer.current_fps(), 4.0);
    }

    #[test]
    fn test_negative_step_is_clamped() {
        let mut timer = Timer::new();
        timer.tick_fixed(-1.0);
        assert_relative_eq!(timer.delta_time(), 0.0);
        assert_relative_eq!(timer.current_fps(), 0.0);
    }
}
