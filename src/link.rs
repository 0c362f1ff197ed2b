//! Transport abstraction.
//!
//! The launcher talks over a BLE notify characteristic. Discovery, pairing
//! and GATT plumbing live outside this crate; anything that can hand over
//! notification payloads one at a time implements [`Link`].

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crate::error::ConnError;

/// Notification service UUID advertised by the launcher.
pub const SERVICE_UUID: &str = "55c40000-f8eb-11ec-b939-0242ac120002";

/// Notify characteristic carrying the frames.
pub const CHARACTERISTIC_UUID: &str = "55c4f002-f8eb-11ec-b939-0242ac120002";

/// A source of raw notifications.
pub trait Link {
    /// Open the link and start notifications.
    fn connect(&mut self) -> Result<(), ConnError>;

    /// Close the link. Safe to call when already closed.
    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    /// Block up to `timeout` for the next notification payload.
    fn recv_timeout(&mut self, timeout: Duration) -> Result<Vec<u8>, ConnError>;
}

// ---------------------------------------------------------------------------
// ChannelLink
// ---------------------------------------------------------------------------

/// Link fed from another thread through a channel.
///
/// A BLE callback (or any producer) pushes payloads through the
/// [`Sender`] returned by [`ChannelLink::new`]; the monitor thread pulls them.
/// Dropping every sender reads as a device disconnect.
#[derive(Debug)]
pub struct ChannelLink {
    rx: Receiver<Vec<u8>>,
    connected: bool,
}

impl ChannelLink {
    pub fn new() -> (Sender<Vec<u8>>, Self) {
        let (tx, rx) = mpsc::channel();
        (
            tx,
            Self {
                rx,
                connected: false,
            },
        )
    }
}

impl Link for ChannelLink {
    fn connect(&mut self) -> Result<(), ConnError> {
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
        // Anything queued belongs to the old connection.
        while self.rx.try_recv().is_ok() {}
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn recv_timeout(&mut self, timeout: Duration) -> Result<Vec<u8>, ConnError> {
        if !self.connected {
            return Err(ConnError::NotConnected);
        }
        match self.rx.recv_timeout(timeout) {
            Ok(frame) => Ok(frame),
            Err(RecvTimeoutError::Timeout) => Err(ConnError::Timeout { timeout }),
            Err(RecvTimeoutError::Disconnected) => {
                self.connected = false;
                Err(ConnError::Disconnected)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ReplayLink
// ---------------------------------------------------------------------------

/// One scripted step of a [`ReplayLink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replay {
    Frame(Vec<u8>),
    /// Nothing arrives for one `recv_timeout` call.
    Silence,
}

/// Plays back a fixed script of notifications, then reports a disconnect.
#[derive(Debug, Clone, Default)]
pub struct ReplayLink {
    script: VecDeque<Replay>,
    connected: bool,
    /// Error message `connect` fails with, if set.
    refuse: Option<String>,
}

impl ReplayLink {
    pub fn new(script: impl IntoIterator<Item = Replay>) -> Self {
        Self {
            script: script.into_iter().collect(),
            connected: false,
            refuse: None,
        }
    }

    /// Script of frames only.
    pub fn frames(frames: impl IntoIterator<Item = Vec<u8>>) -> Self {
        Self::new(frames.into_iter().map(Replay::Frame))
    }

    /// Make `connect` fail, e.g. to simulate a missing adapter.
    pub fn refusing(reason: impl Into<String>) -> Self {
        Self {
            refuse: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Steps not yet played.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Link for ReplayLink {
    fn connect(&mut self) -> Result<(), ConnError> {
        if let Some(reason) = &self.refuse {
            return Err(ConnError::Unavailable(reason.clone()));
        }
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn recv_timeout(&mut self, timeout: Duration) -> Result<Vec<u8>, ConnError> {
        if !self.connected {
            return Err(ConnError::NotConnected);
        }
        match self.script.pop_front() {
            Some(Replay::Frame(frame)) => Ok(frame),
            Some(Replay::Silence) => Err(ConnError::Timeout { timeout }),
            None => {
                self.connected = false;
                Err(ConnError::Disconnected)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    const T: Duration = Duration::from_millis(50);

    #[test]
    fn channel_link_delivers_in_order() {
        let (tx, mut link) = ChannelLink::new();
        link.connect().unwrap();
        let producer = thread::spawn(move || {
            tx.send(vec![160]).unwrap();
            tx.send(vec![112]).unwrap();
        });
        producer.join().unwrap();
        assert_eq!(link.recv_timeout(T).unwrap(), vec![160]);
        assert_eq!(link.recv_timeout(T).unwrap(), vec![112]);
        // all senders dropped
        assert!(matches!(link.recv_timeout(T), Err(ConnError::Disconnected)));
        assert!(!link.is_connected());
    }

    #[test]
    fn channel_link_timeout() {
        let (_tx, mut link) = ChannelLink::new();
        link.connect().unwrap();
        assert!(matches!(link.recv_timeout(T), Err(ConnError::Timeout { .. })));
    }

    #[test]
    fn channel_link_disconnect_drops_queue() {
        let (tx, mut link) = ChannelLink::new();
        link.connect().unwrap();
        tx.send(vec![160]).unwrap();
        link.disconnect();
        assert!(matches!(link.recv_timeout(T), Err(ConnError::NotConnected)));
        link.connect().unwrap();
        assert!(matches!(link.recv_timeout(T), Err(ConnError::Timeout { .. })));
    }

    #[test]
    fn replay_script() {
        let mut link = ReplayLink::new([Replay::Frame(vec![160]), Replay::Silence]);
        assert!(matches!(link.recv_timeout(T), Err(ConnError::NotConnected)));
        link.connect().unwrap();
        assert_eq!(link.recv_timeout(T).unwrap(), vec![160]);
        assert!(matches!(link.recv_timeout(T), Err(ConnError::Timeout { .. })));
        assert!(matches!(link.recv_timeout(T), Err(ConnError::Disconnected)));
        assert_eq!(link.remaining(), 0);
    }

    #[test]
    fn replay_refusing() {
        let mut link = ReplayLink::refusing("no adapter");
        let err = link.connect().unwrap_err();
        assert_eq!(err.to_string(), "connection failed: no adapter");
        assert!(!link.is_connected());
    }
}
