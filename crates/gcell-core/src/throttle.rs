#![forbid(unsafe_code)]

//! Trailing-edge throttle policy for resize handling.
//!
//! Hosts can deliver a flood of resize events while the user drags a window
//! edge. Re-measuring and re-laying-out on every one of them is wasted work,
//! so the engine coalesces them: events within the throttle window collapse
//! into a single trailing execution.
//!
//! # Design
//!
//! [`Throttle`] is an explicit scheduling policy, not a timer. Each
//! [`record`](Throttle::record) supersedes the pending deadline with
//! `now + interval` (the implicit-debounce behavior of replacing a pending
//! timer with a fresh one); the host drains it by calling
//! [`fire_due`](Throttle::fire_due) from its own clock. Nothing here reads a
//! clock — every method takes `now`, which keeps the policy deterministic
//! under test.
//!
//! # Invariants
//!
//! 1. At most one deadline is pending at a time.
//! 2. A `record` while a deadline is pending moves the deadline; it never
//!    schedules a second one.
//! 3. `fire_due` reports how many events collapsed into the firing, then
//!    resets to idle.

use web_time::{Duration, Instant};

/// Trailing-edge throttle with a superseding deadline.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    deadline: Option<Instant>,
    coalesced: u32,
}

impl Throttle {
    /// Create a throttle with the given trailing interval.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
            coalesced: 0,
        }
    }

    /// The configured trailing interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Replace the trailing interval. A pending deadline keeps its
    /// already-computed fire time.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Record an event at `now`. Returns the (new) trailing deadline.
    ///
    /// A pending deadline is superseded: the throttle will fire once, at
    /// `last_event + interval`.
    pub fn record(&mut self, now: Instant) -> Instant {
        let deadline = now + self.interval;
        self.deadline = Some(deadline);
        self.coalesced = self.coalesced.saturating_add(1);
        deadline
    }

    /// The pending deadline, if any.
    #[must_use]
    pub fn pending(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the pending deadline has been reached at `now`.
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    /// Fire the trailing execution if its deadline has passed.
    ///
    /// Returns `Some(n)` with the number of coalesced events and resets to
    /// idle; `None` if nothing is due yet.
    pub fn fire_due(&mut self, now: Instant) -> Option<u32> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                let fired = self.coalesced;
                self.coalesced = 0;
                Some(fired)
            }
            _ => None,
        }
    }

    /// Cancel the pending deadline, discarding coalesced events.
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.coalesced = 0;
    }
}
