//! Time sources and the per-session countdown.
//!
//! The countdown is tick driven: whoever owns the event loop calls
//! [`Countdown::tick`] once per second. Each arming hands out a fresh
//! [`TimerToken`]; ticks carrying an older token are ignored, so a restart can
//! never be hit by a tick scheduled for the previous run.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of "now" for elapsed-time measurement.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Identifies one arming of a [`Countdown`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not armed, or the token belongs to an earlier arming.
    Ignored,
    Running { remaining_secs: u32 },
    Expired,
}

#[derive(Debug, Default)]
pub struct Countdown {
    generation: u64,
    armed: bool,
    remaining_secs: u32,
}

impl Countdown {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            generation: 0,
            armed: false,
            remaining_secs: duration_secs,
        }
    }

    /// Reset to `duration_secs` and start accepting ticks. Invalidates every
    /// token issued before.
    pub fn arm(&mut self, duration_secs: u32) -> TimerToken {
        self.generation += 1;
        self.armed = true;
        self.remaining_secs = duration_secs;
        TimerToken(self.generation)
    }

    /// Stop accepting ticks. Remaining time is left as is.
    pub fn disarm(&mut self) {
        if self.armed {
            self.armed = false;
            self.generation += 1;
        }
    }

    /// Disarm and put the remaining time back to `duration_secs`.
    pub fn reset(&mut self, duration_secs: u32) {
        self.disarm();
        self.remaining_secs = duration_secs;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn token(&self) -> Option<TimerToken> {
        self.armed.then_some(TimerToken(self.generation))
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn tick(&mut self, token: TimerToken) -> TickOutcome {
        if !self.armed || token.0 != self.generation {
            return TickOutcome::Ignored;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.disarm();
            TickOutcome::Expired
        } else {
            TickOutcome::Running {
                remaining_secs: self.remaining_secs,
            }
        }
    }
}
