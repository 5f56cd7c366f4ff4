//! Time slices handed to the work loop by the host environment.

use core::time::Duration;
use std::time::Instant;

/// A non-blocking view of how much time is left in the current slice.
pub trait Deadline {
    /// Time remaining before the loop should yield back to the host.
    fn time_remaining(&self) -> Duration;
}

impl<F> Deadline for F
where
    F: Fn() -> Duration,
{
    fn time_remaining(&self) -> Duration {
        self()
    }
}

/// A deadline that never runs out. Used to render synchronously.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl Deadline for Unbounded {
    fn time_remaining(&self) -> Duration {
        Duration::MAX
    }
}

/// A fixed budget measured from the moment the slice was opened.
#[derive(Debug, Clone, Copy)]
pub struct SliceDeadline {
    started: Instant,
    budget: Duration,
}

impl SliceDeadline {
    /// Opens a slice of `budget` starting now.
    #[must_use]
    pub fn new(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }
}

impl Deadline for SliceDeadline {
    fn time_remaining(&self) -> Duration {
        self.budget.saturating_sub(self.started.elapsed())
    }
}
