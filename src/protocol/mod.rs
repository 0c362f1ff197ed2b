//! Frame types and per-frame decode dispatch.
//!
//! [`Message`] is the typed view of a single notification. Decoding is pure
//! and infallible: frames that are too short for a section simply lose that
//! section, and unrecognised indices become [`Message::Unknown`].
//!
//! Index map:
//!
//! | Index     | Frame                                   |
//! |-----------|-----------------------------------------|
//! | 112       | Launch started                          |
//! | 113-114   | Launch continuation (no data)           |
//! | 115       | Launch data complete                    |
//! | 160       | Top set on the launcher (armed)         |
//! | 176-181   | Power burst, 8 samples                  |
//! | 182       | Terminal power frame, 2 samples + count |

pub mod power;

use crate::frame::RawFrame;

// ---------------------------------------------------------------------------
// Index constants
// ---------------------------------------------------------------------------

pub const INDEX_LAUNCH_START: u8 = 112;
pub const INDEX_LAUNCH_END: u8 = 115;
pub const INDEX_ARMED: u8 = 160;
pub const INDEX_POWER_FIRST: u8 = 176;
pub const INDEX_POWER_LAST: u8 = 181;
pub const INDEX_POWER_TERMINAL: u8 = 182;

// ---------------------------------------------------------------------------
// Message — frames the launcher sends to us
// ---------------------------------------------------------------------------

/// A notification from the launcher, decoded by frame index.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Message {
    /// Top set on the launcher.
    Armed,

    // -- Launch burst --
    LaunchStart,
    /// Indices 113 and 114. Carry nothing we use.
    LaunchContinuation { index: u8 },
    /// All power frames for this launch have been sent.
    LaunchEnd,

    // -- Power data --
    PowerBurst(power::PowerBurst),
    PowerTerminal(power::PowerTerminal),

    // -- Forward compat --
    Unknown { index: u8, payload: Vec<u8> },
}

impl Message {
    /// Decode a frame into a typed `Message`.
    pub fn decode(frame: &RawFrame) -> Self {
        match frame.index() {
            INDEX_ARMED => Message::Armed,
            INDEX_LAUNCH_START => Message::LaunchStart,
            index @ 113..=114 => Message::LaunchContinuation { index },
            INDEX_LAUNCH_END => Message::LaunchEnd,
            INDEX_POWER_FIRST..=INDEX_POWER_LAST => {
                Message::PowerBurst(power::PowerBurst::decode(frame))
            }
            INDEX_POWER_TERMINAL => Message::PowerTerminal(power::PowerTerminal::decode(frame)),
            index => Message::Unknown {
                index,
                payload: frame.payload().to_vec(),
            },
        }
    }

    /// Encode back to notification bytes. Used by the replay link and tests
    /// to synthesise device traffic.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Message::Armed => vec![INDEX_ARMED],
            Message::LaunchStart => vec![INDEX_LAUNCH_START],
            Message::LaunchContinuation { index } => vec![*index],
            Message::LaunchEnd => vec![INDEX_LAUNCH_END],
            Message::PowerBurst(m) => m.encode(),
            Message::PowerTerminal(m) => m.encode(),
            Message::Unknown { index, payload } => {
                let mut buf = Vec::with_capacity(1 + payload.len());
                buf.push(*index);
                buf.extend_from_slice(payload);
                buf
            }
        }
    }

    /// Whether this index belongs to the launch range (112-115).
    pub fn is_launch_frame(&self) -> bool {
        matches!(
            self,
            Message::LaunchStart | Message::LaunchContinuation { .. } | Message::LaunchEnd
        )
    }
}
