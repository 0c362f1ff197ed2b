//! Launcher monitor: link + decoder + session.
//!
//! Handles receive, decode and session bookkeeping. No UI logic; callers drive
//! the loop with [`Monitor::poll`] and observe [`SessionEvent`]s either from
//! the return values or through [`Monitor::set_on_event`].

use std::time::Duration;

use log::{debug, info, warn};

use crate::decoder::{DeviceEvent, PacketDecoder};
use crate::error::ConnError;
use crate::frame::RawFrame;
use crate::link::Link;
use crate::session::{Measurement, Session, SessionEvent};
use crate::stopwatch::{Clock, SystemClock};
use crate::store::RecordStore;

/// Default receive wait, which doubles as the display refresh period.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// How long [`Monitor::poll`] waits for a notification before emitting a
    /// display tick.
    pub poll_timeout: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

/// A measurement stored by [`Monitor::stop_recording`].
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub name: String,
    pub measurement: Measurement,
    /// True if a new record was created, false if an existing one was updated.
    pub added: bool,
}

/// Drives one launcher.
///
/// Single-threaded: the monitor owns the session and borrows the record store
/// per call. Frames produced on another thread reach it through
/// [`crate::link::ChannelLink`].
///
/// # Example
///
/// ```
/// use beypass::link::{Link, ReplayLink};
/// use beypass::{Monitor, RecordStore};
///
/// let link = ReplayLink::frames([vec![160], vec![112], vec![176, 0x84, 0x03]]);
/// let mut monitor = Monitor::new(link);
/// let mut store = RecordStore::default();
///
/// monitor.connect()?;
/// while monitor.link().is_connected() {
///     match monitor.poll() {
///         Ok(events) => events.iter().for_each(|e| println!("{e:?}")),
///         Err(_) => break,
///     }
/// }
/// let recorded = monitor.stop_recording(&mut store, "Pegasus").unwrap();
/// assert_eq!(recorded.measurement.power, 900);
/// # Ok::<(), beypass::ConnError>(())
/// ```
pub struct Monitor<L: Link, C: Clock = SystemClock> {
    link: L,
    decoder: PacketDecoder,
    session: Session<C>,
    config: MonitorConfig,
    /// Called for every emitted event.
    on_event: Option<Box<dyn FnMut(&SessionEvent)>>,
}

impl<L: Link> Monitor<L, SystemClock> {
    pub fn new(link: L) -> Self {
        Self::with_clock(link, SystemClock, MonitorConfig::default())
    }
}

impl<L: Link, C: Clock> Monitor<L, C> {
    pub fn with_clock(link: L, clock: C, config: MonitorConfig) -> Self {
        Self {
            link,
            decoder: PacketDecoder::new(),
            session: Session::with_clock(clock),
            config,
            on_event: None,
        }
    }

    /// Register a callback invoked for every [`SessionEvent`].
    pub fn set_on_event(&mut self, f: impl FnMut(&SessionEvent) + 'static) {
        self.on_event = Some(Box::new(f));
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn session(&self) -> &Session<C> {
        &self.session
    }

    pub fn config(&self) -> MonitorConfig {
        self.config
    }

    /// Open the link. On failure the session stays `Idle` and the error is
    /// returned as-is.
    pub fn connect(&mut self) -> Result<(), ConnError> {
        info!("connecting");
        if let Err(e) = self.link.connect() {
            warn!("connect failed: {e}");
            self.emit(vec![SessionEvent::Log(format!("error: {e}"))]);
            return Err(e);
        }
        self.decoder.reset();
        self.session.disconnect();
        self.emit(vec![SessionEvent::Log("connected".into())]);
        Ok(())
    }

    /// Close the link and discard any in-flight measurement.
    pub fn disconnect(&mut self) {
        self.link.disconnect();
        self.decoder.reset();
        self.session.disconnect();
        info!("disconnected");
        self.emit(vec![SessionEvent::Log("disconnected".into())]);
    }

    /// Wait up to the configured timeout for one notification and process it.
    ///
    /// A receive timeout is not an error: it yields a display tick while
    /// recording and nothing otherwise. Link errors are returned once and
    /// leave the session as it was.
    pub fn poll(&mut self) -> Result<Vec<SessionEvent>, ConnError> {
        match self.link.recv_timeout(self.config.poll_timeout) {
            Ok(wire) => Ok(self.process(&wire)),
            Err(ConnError::Timeout { .. }) => Ok(self.tick().into_iter().collect()),
            Err(e) => {
                warn!("link error: {e}");
                self.emit(vec![SessionEvent::Log(format!("error: {e}"))]);
                Err(e)
            }
        }
    }

    /// Decode one notification and run it through the session.
    ///
    /// Empty or unrecognised notifications change nothing.
    pub fn process(&mut self, wire: &[u8]) -> Vec<SessionEvent> {
        let frame = match RawFrame::parse(wire) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("dropped notification: {e}");
                return Vec::new();
            }
        };
        debug!("recv {frame:?}");

        let mut events = vec![SessionEvent::Log(format!(
            "recv: [{}] {}",
            frame.index(),
            frame.hex()
        ))];
        for device_event in self.decoder.decode(&frame) {
            // Only a launch start the session accepts opens a new burst.
            if device_event == DeviceEvent::LaunchStarted && !self.session.is_recording() {
                self.decoder.reset();
            }
            events.extend(self.session.handle(device_event));
        }
        self.emit(events)
    }

    /// Display tick while recording.
    pub fn tick(&mut self) -> Option<SessionEvent> {
        let tick = self.session.tick()?;
        if let Some(cb) = self.on_event.as_mut() {
            cb(&tick);
        }
        Some(tick)
    }

    /// Stop the running measurement and store it under `name`.
    ///
    /// A blank name becomes `Bey <next id>`. Returns `None` when nothing is
    /// being recorded.
    pub fn stop_recording(&mut self, store: &mut RecordStore, name: &str) -> Option<Recorded> {
        let measurement = self.session.stop_recording()?;
        self.decoder.reset();

        let name = match name.trim() {
            "" => format!("Bey {}", store.next_id()),
            name => name.to_string(),
        };
        let added = store.upsert_by_name(&name, &measurement);
        let verb = if added { "added" } else { "updated" };
        info!(
            "{verb} {name:?}: power {}, {}m {}s",
            measurement.power, measurement.minutes, measurement.seconds
        );
        self.emit(vec![SessionEvent::Log(format!(
            "recorded {name}: power {}, {}m {}s ({verb})",
            measurement.power, measurement.minutes, measurement.seconds
        ))]);

        Some(Recorded {
            name,
            measurement,
            added,
        })
    }

    fn emit(&mut self, events: Vec<SessionEvent>) -> Vec<SessionEvent> {
        if let Some(cb) = self.on_event.as_mut() {
            for event in &events {
                cb(event);
            }
        }
        events
    }
}
