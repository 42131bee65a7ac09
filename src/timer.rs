//! Pausable game clock.
//!
//! Every duration in the simulation (buffs, cooldowns, wave timing,
//! consumable countdowns, floating text) is measured against one `Timer`.
//! Stopping it freezes all of them at once.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// A monotonic time source.  `now` is measured from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall clock backed by `Instant`.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock.  Clones share the same reading, so a test can keep one
/// handle and advance the clock a `Timer` is reading from.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, secs: f64) {
        self.now.set(self.now.get() + Duration::from_secs_f64(secs));
    }

    pub fn set(&self, secs: f64) {
        self.now.set(Duration::from_secs_f64(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

pub struct Timer {
    clock: Box<dyn Clock>,
    /// Clock reading when the current running span began.
    running_since: Option<Duration>,
    /// Time banked by previous running spans.
    banked: Duration,
}

impl Timer {
    /// A stopped timer at zero.
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            running_since: None,
            banked: Duration::ZERO,
        }
    }

    /// Begin or resume counting.  Calling it while running changes nothing.
    pub fn start(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(self.clock.now());
        }
    }

    /// Freeze the reading.  Calling it while stopped changes nothing.
    pub fn stop(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.banked += self.clock.now().saturating_sub(since);
        }
    }

    pub fn reset(&mut self) {
        self.running_since = None;
        self.banked = Duration::ZERO;
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    /// Total running time in seconds.
    pub fn get_time(&self) -> f64 {
        let live = match self.running_since {
            Some(since) => self.clock.now().saturating_sub(since),
            None => Duration::ZERO,
        };
        (self.banked + live).as_secs_f64()
    }
}

impl std::fmt::Debug for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timer")
            .field("running", &self.is_running())
            .field("time", &self.get_time())
            .finish()
    }
}
