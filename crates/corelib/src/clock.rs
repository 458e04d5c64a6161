//! Wall-clock timer driving shader animation.

use std::time::{Duration, Instant};

/// Elapsed-time clock started at construction.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    start: Instant,
    last: Instant,
}

impl Clock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self { start: now, last: now }
    }

    /// Seconds since the clock was created.
    #[inline]
    pub fn elapsed_secs(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    /// Time since the previous `delta` call (or since creation).
    pub fn delta(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now - self.last;
        self.last = now;
        dt
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_monotonic() {
        let clock = Clock::new();
        let a = clock.elapsed_secs();
        std::thread::sleep(Duration::from_millis(5));
        let b = clock.elapsed_secs();
        assert!(b > a, "{b} should be greater than {a}");
        assert!(b >= 0.005);
    }

    #[test]
    fn delta_resets_between_calls() {
        let mut clock = Clock::new();
        std::thread::sleep(Duration::from_millis(5));
        let first = clock.delta();
        let second = clock.delta();
        assert!(first >= Duration::from_millis(5));
        assert!(second < first);
    }
}
