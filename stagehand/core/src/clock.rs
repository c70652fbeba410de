//! Injectable time source
//!
//! Timed transitions never read the wall clock directly. They hold a
//! [`SharedClock`], which is [`SystemClock`] in production and
//! [`ManualClock`] in tests, where time only moves when the test says so.
//!
//! This is the only module in the crate allowed to block the thread.

use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Source of monotonic time
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> Instant;

    /// Time elapsed since `earlier`, zero if `earlier` is in the future
    fn since(&self, earlier: Instant) -> Duration {
        self.now().saturating_duration_since(earlier)
    }

    /// Time left until `later`, zero if `later` has passed
    fn until(&self, later: Instant) -> Duration {
        later.saturating_duration_since(self.now())
    }

    /// Block for `duration` (or pretend to)
    fn sleep(&self, duration: Duration);
}

/// Clock shared between transitions
pub type SharedClock = Arc<dyn Clock>;

/// The real, monotonic wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// A clock that only advances when told to
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use stagehand_core::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let start = clock.now();
/// clock.sleep(Duration::from_millis(250));
/// assert_eq!(clock.since(start), Duration::from_millis(250));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    /// Create a clock frozen at the current instant
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    /// Create a shared handle, ready to hand to a timed transition
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Move time forward by `duration`
    pub fn advance(&self, duration: Duration) {
        *self.elapsed.lock() += duration;
    }

    /// Total time advanced since creation
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

/// Process-wide clock used when a timed transition gets no explicit clock
#[must_use]
pub fn default_clock() -> SharedClock {
    static DEFAULT: OnceLock<SharedClock> = OnceLock::new();
    Arc::clone(DEFAULT.get_or_init(|| Arc::new(SystemClock)))
}
