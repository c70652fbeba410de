//! How fast a transition moves
//!
//! Effects ask their [`Pacing`] for the progress of the current *phase*
//! (0.0 at the start, 1.0 at the end). A fade has two phases (in and out), a
//! slide has one. The effect decides what to do with the number; the pacing
//! only decides how it grows.
//!
//! - [`Pacing::Stepped`] adds a fixed factor every genuine step, so the
//!   effect's speed follows the host's tick rate.
//! - [`Pacing::Timed`] derives progress from elapsed time on a [`Clock`], so
//!   the effect takes the same wall time regardless of tick rate.

use std::fmt;
use std::time::{Duration, Instant};

use crate::clock::{default_clock, Clock, SharedClock};

/// Progress strategy shared by all transition effects
pub enum Pacing {
    /// Fixed increment per step
    Stepped {
        /// Amount added per step
        factor: f64,
        /// Progress of the current phase
        progress: f64,
    },
    /// Progress measured against a clock
    Timed {
        /// Total duration across all phases
        duration: Duration,
        /// Time source
        clock: SharedClock,
        /// When the transition started, once it has
        started_at: Option<Instant>,
    },
}

impl Pacing {
    /// Advance by `factor` per step
    #[must_use]
    pub fn stepped(factor: f64) -> Self {
        Self::Stepped {
            factor,
            progress: 0.0,
        }
    }

    /// Advance by whatever factor covers `duration` at `ticks_per_second`
    #[must_use]
    pub fn ticks(ticks_per_second: f64, duration: Duration) -> Self {
        Self::stepped(duration_to_factor(ticks_per_second, duration))
    }

    /// Take `duration` of wall time, measured on the default clock
    #[must_use]
    pub fn timed(duration: Duration) -> Self {
        Self::timed_with_clock(duration, default_clock())
    }

    /// Take `duration` of time, measured on `clock`
    #[must_use]
    pub fn timed_with_clock(duration: Duration, clock: SharedClock) -> Self {
        Self::Timed {
            duration,
            clock,
            started_at: None,
        }
    }

    /// Reset for a new run
    pub fn begin(&mut self) {
        match self {
            Self::Stepped { progress, .. } => *progress = 0.0,
            Self::Timed {
                clock, started_at, ..
            } => *started_at = Some(clock.now()),
        }
    }

    /// Start counting the next phase from zero
    pub fn next_phase(&mut self) {
        if let Self::Stepped { progress, .. } = self {
            *progress = 0.0;
        }
    }

    /// Take one step and return the progress of phase `phase` out of `phases`
    pub fn advance(&mut self, phase: u32, phases: u32) -> f64 {
        match self {
            Self::Stepped { factor, progress } => {
                *progress += *factor;
                *progress
            }
            Self::Timed {
                duration,
                clock,
                started_at,
            } => {
                let span = *duration / phases.max(1);
                let origin = *started_at.get_or_insert_with(|| clock.now()) + span * phase;
                calculate_progress(&**clock, origin, span)
            }
        }
    }
}

impl fmt::Debug for Pacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stepped { factor, progress } => f
                .debug_struct("Stepped")
                .field("factor", factor)
                .field("progress", progress)
                .finish(),
            Self::Timed {
                duration,
                started_at,
                ..
            } => f
                .debug_struct("Timed")
                .field("duration", duration)
                .field("started_at", started_at)
                .finish_non_exhaustive(),
        }
    }
}

/// Convert a frequency (ticks per second) into the per-tick factor that
/// spans `duration`
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use stagehand_core::transition::duration_to_factor;
///
/// // 60 ticks per second over one second: 1/60 per tick
/// let factor = duration_to_factor(60.0, Duration::from_secs(1));
/// assert!((factor - 1.0 / 60.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn duration_to_factor(ticks_per_second: f64, duration: Duration) -> f64 {
    let secs = duration.as_secs_f64();
    if secs <= 0.0 || ticks_per_second <= 0.0 {
        return 1.0;
    }
    (1.0 / ticks_per_second) / secs
}

/// Fraction of `duration` that has passed since `since`
///
/// A zero duration counts as already complete.
#[must_use]
pub fn calculate_progress(clock: &dyn Clock, since: Instant, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    clock.since(since).as_secs_f64() / duration.as_secs_f64()
}
