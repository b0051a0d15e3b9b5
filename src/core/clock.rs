//! Time sources for paragraph ageing.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Monotonic clock measured from an origin that can be reset.
pub trait Clock: Send + Sync {
    /// Time elapsed since the origin.
    fn elapsed(&self) -> Duration;

    /// Move the origin to now.
    fn reset(&self);
}

/// Wall clock backed by [`Instant`].
#[derive(Debug)]
pub struct SystemClock {
    origin: Mutex<Instant>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Mutex::new(Instant::now()),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        let origin = *self.origin.lock().unwrap_or_else(|e| e.into_inner());
        origin.elapsed()
    }

    fn reset(&self) {
        *self.origin.lock().unwrap_or_else(|e| e.into_inner()) = Instant::now();
    }
}

/// Clock that only moves when told to. Used for replaying captured sessions
/// and in tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    pub fn advance_secs(&self, seconds: f32) {
        self.advance(Duration::from_secs_f32(seconds));
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn reset(&self) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_when_advanced() {
        let clock = ManualClock::new();
        assert_eq!(clock.elapsed(), Duration::ZERO);
        clock.advance_secs(1.5);
        assert_eq!(clock.elapsed(), Duration::from_millis(1500));
        clock.reset();
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }

    #[test]
    fn system_clock_reset_moves_origin_forward() {
        let clock = SystemClock::new();
        std::thread::sleep(Duration::from_millis(5));
        let before = clock.elapsed();
        clock.reset();
        assert!(clock.elapsed() <= before);
    }
}
