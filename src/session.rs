//! Measurement session state machine.
//!
//! ```text
//!          Armed              LaunchStarted
//! ┌──────┐ ─────> ┌───────┐ ──────────────> ┌───────────┐
//! │ Idle │        │ Armed │                 │ Recording │ <─┐ PowerSample
//! └──────┘ <───── └───────┘                 └───────────┘ ──┘ LaunchComplete
//!     ^  disconnect()                             │
//!     └───────────────────────────────────────────┘
//!              stop_recording() / disconnect()
//! ```
//!
//! Launch-data-complete does not end the measurement: the top keeps spinning
//! after the launcher has sent its power data, and the stopwatch runs until
//! the caller stops it.

use std::time::Instant;

use log::{debug, info};

use crate::decoder::DeviceEvent;
use crate::stopwatch::{Clock, Elapsed, Stopwatch, SystemClock};

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Armed,
    Recording { started: Instant, max_power: u16 },
}

/// Notification for the UI (or any other observer).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionEvent {
    Armed,
    LaunchStarted,
    PowerUpdate(u16),
    LaunchComplete(u16),
    /// Display refresh while recording.
    Tick(Elapsed),
    Log(String),
}

/// A finished measurement, handed off by [`Session::stop_recording`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measurement {
    pub power: u16,
    pub minutes: u32,
    pub seconds: f64,
    /// Shoot counter from the launch-complete frame, 0 if none arrived.
    pub shoot_count: u8,
}

pub struct Session<C: Clock = SystemClock> {
    state: SessionState,
    stopwatch: Stopwatch<C>,
    shoot_count: u8,
}

impl Session<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for Session<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Session<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            state: SessionState::Idle,
            stopwatch: Stopwatch::with_clock(clock),
            shoot_count: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, SessionState::Recording { .. })
    }

    /// Latest power reading of the running launch, 0 unless recording.
    pub fn current_power(&self) -> u16 {
        match self.state {
            SessionState::Recording { max_power, .. } => max_power,
            _ => 0,
        }
    }

    pub fn stopwatch(&self) -> &Stopwatch<C> {
        &self.stopwatch
    }

    /// Consume one device event.
    pub fn handle(&mut self, event: DeviceEvent) -> Vec<SessionEvent> {
        match event {
            DeviceEvent::Armed => {
                if self.state == SessionState::Idle {
                    self.state = SessionState::Armed;
                }
                info!("top set, waiting for launch");
                vec![
                    SessionEvent::Log("top set on launcher".into()),
                    SessionEvent::Armed,
                ]
            }
            DeviceEvent::LaunchStarted => {
                if self.is_recording() {
                    debug!("duplicate launch start ignored");
                    return Vec::new();
                }
                self.shoot_count = 0;
                let started = self.stopwatch.start();
                self.state = SessionState::Recording {
                    started,
                    max_power: 0,
                };
                info!("launch started, stopwatch running");
                vec![
                    SessionEvent::Log("launch started, stopwatch running".into()),
                    SessionEvent::LaunchStarted,
                ]
            }
            DeviceEvent::PowerSample { value } => {
                if let SessionState::Recording { max_power, .. } = &mut self.state {
                    *max_power = value;
                }
                debug!("power {value}");
                vec![SessionEvent::PowerUpdate(value)]
            }
            DeviceEvent::LaunchComplete {
                max_power,
                shoot_count,
            } => {
                if !self.is_recording() {
                    debug!("launch complete outside a recording (power {max_power})");
                    return Vec::new();
                }
                self.shoot_count = shoot_count;
                info!("launch data complete, power {max_power}, shoot #{shoot_count}");
                vec![
                    SessionEvent::Log(format!(
                        "launch data complete, power {max_power}, stopwatch still running"
                    )),
                    SessionEvent::LaunchComplete(max_power),
                ]
            }
        }
    }

    /// Stop the stopwatch and hand off the measurement. `None` unless recording.
    pub fn stop_recording(&mut self) -> Option<Measurement> {
        let SessionState::Recording { max_power, .. } = self.state else {
            return None;
        };
        self.stopwatch.stop();
        let elapsed = self.stopwatch.split();
        let measurement = Measurement {
            power: max_power,
            minutes: elapsed.minutes,
            seconds: elapsed.seconds,
            shoot_count: self.shoot_count,
        };
        self.state = SessionState::Idle;
        self.shoot_count = 0;
        self.stopwatch.reset();
        info!("recording stopped: power {max_power}, {elapsed}");
        Some(measurement)
    }

    /// Drop any in-flight measurement and return to `Idle`.
    pub fn disconnect(&mut self) {
        self.stopwatch.stop();
        self.stopwatch.reset();
        self.shoot_count = 0;
        self.state = SessionState::Idle;
    }

    /// Current reading for the display refresh. `None` unless recording.
    pub fn tick(&self) -> Option<SessionEvent> {
        self.is_recording()
            .then(|| SessionEvent::Tick(self.stopwatch.split()))
    }
}
