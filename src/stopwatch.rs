//! Spin-time stopwatch.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time source.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-advanced clock for deterministic tests and trace replay.
///
/// Clones share the same time, so a test can keep one handle and give the
/// other to a [`Stopwatch`].
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Elapsed time split the way records store it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Elapsed {
    pub minutes: u32,
    /// Seconds within the minute, millisecond resolution.
    pub seconds: f64,
}

impl Elapsed {
    pub fn from_millis(ms: u64) -> Self {
        Self {
            minutes: (ms / 60_000) as u32,
            seconds: (ms % 60_000) as f64 / 1000.0,
        }
    }

    pub fn as_millis(&self) -> u64 {
        u64::from(self.minutes) * 60_000 + (self.seconds * 1000.0).round() as u64
    }
}

impl fmt::Display for Elapsed {
    /// `MM:SS.mmm`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.as_millis();
        write!(
            f,
            "{:02}:{:02}.{:03}",
            ms / 60_000,
            (ms % 60_000) / 1000,
            ms % 1000
        )
    }
}

/// Start/stop stopwatch over an injectable [`Clock`].
///
/// While running, reads are live. After `stop()` the reading is frozen until
/// `reset()` or the next `start()`.
pub struct Stopwatch<C: Clock = SystemClock> {
    clock: C,
    started: Option<Instant>,
    elapsed: Duration,
}

impl Stopwatch<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for Stopwatch<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Stopwatch<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            started: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Start timing from zero. Returns the start instant as read from the
    /// stopwatch's clock.
    pub fn start(&mut self) -> Instant {
        let now = self.clock.now();
        self.elapsed = Duration::ZERO;
        self.started = Some(now);
        now
    }

    /// Freeze the reading. No-op if not running.
    pub fn stop(&mut self) {
        if let Some(started) = self.started.take() {
            self.elapsed = self.clock.now().saturating_duration_since(started);
        }
    }

    pub fn reset(&mut self) {
        self.started = None;
        self.elapsed = Duration::ZERO;
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    /// When the current run started, if running.
    pub fn started_at(&self) -> Option<Instant> {
        self.started
    }

    pub fn elapsed(&self) -> Duration {
        match self.started {
            Some(started) => self.clock.now().saturating_duration_since(started),
            None => self.elapsed,
        }
    }

    /// Whole milliseconds elapsed.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    pub fn split(&self) -> Elapsed {
        Elapsed::from_millis(self.elapsed_ms())
    }

    /// `MM:SS.mmm` for the display refresh.
    pub fn display(&self) -> String {
        self.split().to_string()
    }
}

impl<C: Clock> fmt::Debug for Stopwatch<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stopwatch")
            .field("running", &self.is_running())
            .field("elapsed", &self.elapsed())
            .finish()
    }
}
