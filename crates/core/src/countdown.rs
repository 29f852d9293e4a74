use serde::{Deserialize, Serialize};

//
// ─── TICK OUTCOME ──────────────────────────────────────────────────────────────
//

/// What a single tick did to the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The counter moved; `remaining` seconds are left.
    Ticked { remaining: u32 },
    /// The counter just hit zero. Emitted exactly once per run, so the
    /// caller can trigger its auto-submit without double-firing.
    Expired,
    /// Paused or already expired; nothing changed.
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum State {
    Running,
    Paused,
    Expired,
}

//
// ─── COUNTDOWN ─────────────────────────────────────────────────────────────────
//

/// Whole-second countdown owned by the caller's tick loop.
///
/// The countdown holds no timer of its own: something external (an interval,
/// a test loop) calls `tick()` once per second while the owning view is
/// active. Pausing freezes the counter exactly; granularity is whole
/// seconds, so no drift compensation is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    initial: u32,
    remaining: u32,
    elapsed: u32,
    state: State,
}

impl Countdown {
    /// A running countdown starting at `seconds`.
    #[must_use]
    pub fn new(seconds: u32) -> Self {
        Self {
            initial: seconds,
            remaining: seconds,
            elapsed: 0,
            state: if seconds == 0 {
                State::Expired
            } else {
                State::Running
            },
        }
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Seconds observed while running; the quiz reports this as time spent.
    #[must_use]
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state == State::Paused
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.state == State::Expired
    }

    /// Advance one second.
    ///
    /// Returns `Tick::Expired` exactly once, on the tick that reaches zero.
    pub fn tick(&mut self) -> Tick {
        if self.state != State::Running {
            return Tick::Idle;
        }

        self.remaining -= 1;
        self.elapsed += 1;

        if self.remaining == 0 {
            self.state = State::Expired;
            return Tick::Expired;
        }
        Tick::Ticked {
            remaining: self.remaining,
        }
    }

    /// Freeze the counter. No-op once expired.
    pub fn pause(&mut self) {
        if self.state == State::Running {
            self.state = State::Paused;
        }
    }

    /// Continue from the frozen value. No-op once expired.
    pub fn resume(&mut self) {
        if self.state == State::Paused {
            self.state = State::Running;
        }
    }

    /// Restore the initial duration and clear elapsed time.
    pub fn reset(&mut self) {
        *self = Self::new(self.initial);
    }
}

//
// ─── STOPWATCH ─────────────────────────────────────────────────────────────────
//

/// Count-up companion to `Countdown`, used by study-session views to track
/// how long a session has been running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stopwatch {
    elapsed: u32,
    paused: bool,
}

impl Stopwatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Advance one second unless paused. Returns the new elapsed total.
    pub fn tick(&mut self) -> u32 {
        if !self.paused {
            self.elapsed += 1;
        }
        self.elapsed
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
