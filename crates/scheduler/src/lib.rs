use std::fmt;
use std::time::{Duration, Instant};

use tracing::info;

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

/// Period between surface swaps unless configured otherwise.
pub const DEFAULT_SWAP_INTERVAL: Duration = Duration::from_millis(15_000);

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("swap interval must be greater than zero")]
    ZeroInterval,
    #[error("swap interval {0:?} is too large to schedule")]
    IntervalOverflow(Duration),
}

/// Which rendering surface is the current stepping target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Foreground,
    Background,
}

impl Phase {
    pub fn other(self) -> Self {
        match self {
            Phase::Foreground => Phase::Background,
            Phase::Background => Phase::Foreground,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Foreground => f.write_str("foreground"),
            Phase::Background => f.write_str("background"),
        }
    }
}

/// One phase toggle: `stop` should be halted and `start` reloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swap {
    pub stop: Phase,
    pub start: Phase,
    pub due: Instant,
}

/// Repeating timer that alternates the active surface.
#[derive(Debug, Clone)]
pub struct SwapScheduler {
    phase: Phase,
    interval: Duration,
    /// `None` once the next swap would fall past the end of the clock.
    next_due: Option<Instant>,
}

impl SwapScheduler {
    /// Starts in the foreground phase with the first swap due one interval after `now`.
    pub fn new(interval: Duration, now: Instant) -> Result<Self, SchedulerError> {
        if interval.is_zero() {
            return Err(SchedulerError::ZeroInterval);
        }
        let next_due = now
            .checked_add(interval)
            .ok_or(SchedulerError::IntervalOverflow(interval))?;
        Ok(Self {
            phase: Phase::Foreground,
            interval,
            next_due: Some(next_due),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Resets the cadence so the next swap is one interval after `now`.
    /// The current phase is kept.
    pub fn restart(&mut self, now: Instant) {
        self.next_due = now.checked_add(self.interval);
    }

    /// Fires every swap that has come due by `now`, oldest first.
    ///
    /// A caller that polls late receives one swap per elapsed interval, the
    /// same as a free-running repeating timer would have produced.
    pub fn tick(&mut self, now: Instant) -> Vec<Swap> {
        let mut swaps = Vec::new();
        while let Some(due) = self.next_due.filter(|due| now >= *due) {
            let swap = Swap {
                stop: self.phase,
                start: self.phase.other(),
                due,
            };
            info!(from = %swap.stop, to = %swap.start, "switching surfaces");
            self.phase = swap.start;
            self.next_due = due.checked_add(self.interval);
            swaps.push(swap);
        }
        swaps
    }
}
