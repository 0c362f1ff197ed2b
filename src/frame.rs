//! Notification frames.
//!
//! Wire format:
//! ```text
//! INDEX PAYLOAD...
//! ```
//!
//! One BLE notification carries exactly one frame. There is no start/end
//! marker, length field, or checksum; the leading index byte selects the
//! payload layout (see [`crate::protocol`]).

use std::fmt;

use crate::error::{Result, WireError};

/// A single notification as received from the launcher.
///
/// Offsets used throughout the crate are frame-relative: byte 0 is the
/// index, the first payload byte is at offset 1.
#[derive(Clone, PartialEq, Eq)]
pub struct RawFrame {
    bytes: Vec<u8>,
}

impl RawFrame {
    /// Validate a notification. The only requirement is a present index byte.
    pub fn parse(wire: &[u8]) -> Result<Self> {
        if wire.is_empty() {
            return Err(WireError::EmptyFrame);
        }
        Ok(Self {
            bytes: wire.to_vec(),
        })
    }

    /// Build a frame from an index and payload.
    pub fn new(index: u8, payload: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(1 + payload.len());
        bytes.push(index);
        bytes.extend_from_slice(payload);
        Self { bytes }
    }

    /// Frame type index (byte 0).
    pub fn index(&self) -> u8 {
        self.bytes[0]
    }

    /// Payload bytes after the index.
    pub fn payload(&self) -> &[u8] {
        &self.bytes[1..]
    }

    /// Whole frame including the index byte.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false: a parsed frame has at least its index byte.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Space-separated lowercase hex dump: `"b0 05 20 00 00"`.
    pub fn hex(&self) -> String {
        self.bytes
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Debug for RawFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // "[176] 9B | b0 05 20 ..."
        write!(f, "[{}] {}B | {}", self.index(), self.len(), self.hex())
    }
}
