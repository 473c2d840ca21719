use std::thread;
use std::time::{Duration, Instant};

/// Time source and pacing for the control loop. Injected so tests can
/// drive the loop with virtual time instead of real sleeps.
pub trait Clock {
    /// Monotonic time since the clock's origin.
    fn now(&mut self) -> Duration;

    /// Blocks until `duration` has elapsed.
    fn sleep(&mut self, duration: Duration);
}

/// Wall clock backed by `Instant` and `thread::sleep`.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&mut self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}
