//! Tick clock for the fixed-step simulation.
//!
//! All game timestamps are integer milliseconds so that think times, timeouts
//! and lag-compensation offsets compare exactly.

/// Level time advanced once per server frame.
#[derive(Debug, Clone)]
pub struct LevelTime {
    /// Current level time in milliseconds.
    time: i64,
    /// Length of one simulation step in milliseconds.
    frame_time: i64,
    /// Frames simulated since level start.
    frame_count: u64,
}

impl Default for LevelTime {
    fn default() -> Self {
        Self::new(16)
    }
}

impl LevelTime {
    /// Create a clock at time zero with the given step length.
    pub fn new(frame_time_ms: i64) -> Self {
        Self {
            time: 0,
            frame_time: frame_time_ms.max(1),
            frame_count: 0,
        }
    }

    /// Advance by one step.
    pub fn advance(&mut self) {
        self.time += self.frame_time;
        self.frame_count += 1;
    }

    /// Current time in milliseconds.
    pub fn now(&self) -> i64 {
        self.time
    }

    /// Step length in milliseconds.
    pub fn frame_time_ms(&self) -> i64 {
        self.frame_time
    }

    /// Step length in seconds.
    pub fn frame_time_seconds(&self) -> f32 {
        self.frame_time as f32 * 0.001
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_adds_one_step() {
        let mut t = LevelTime::new(50);
        t.advance();
        t.advance();
        assert_eq!(t.now(), 100);
        assert_eq!(t.frame_count(), 2);
        assert!((t.frame_time_seconds() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn zero_step_is_clamped() {
        let t = LevelTime::new(0);
        assert_eq!(t.frame_time_ms(), 1);
    }
}
