use std::time::Duration;

use thiserror::Error;

/// Errors arising from frame validation and field decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("empty notification (no frame index byte)")]
    EmptyFrame,

    #[error("frame too short for {field}: need {need} bytes, got {got}")]
    PayloadTooShort {
        field: &'static str,
        need: usize,
        got: usize,
    },
}

impl WireError {
    pub(crate) fn payload_too_short(field: &'static str, need: usize, got: usize) -> Self {
        Self::PayloadTooShort { field, need, got }
    }
}

/// Errors from link operations.
#[derive(Debug, Error)]
pub enum ConnError {
    /// The transport could not be opened (no adapter, device not found,
    /// user cancelled the pairing prompt).
    #[error("connection failed: {0}")]
    Unavailable(String),

    /// `recv_timeout` elapsed without a notification.
    #[error("recv timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// The device went away.
    #[error("connection closed by device")]
    Disconnected,

    /// `recv_timeout` called before `connect`.
    #[error("link is not connected")]
    NotConnected,
}

pub type Result<T> = std::result::Result<T, WireError>;
