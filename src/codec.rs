//! Field codecs for the launcher notification protocol.
//!
//! Power values are unsigned 16-bit, low byte first. All offsets are
//! frame-relative (byte 0 is the frame index).

use crate::error::{Result, WireError};

/// Number of power slots in a burst frame (indices 176-181).
pub const BURST_SLOTS: usize = 8;

/// Number of power slots in the terminal frame (index 182).
pub const TERMINAL_SLOTS: usize = 2;

/// Offset of the shoot counter in the terminal frame.
pub const SHOOT_COUNT_OFFSET: usize = 9;

// ---------------------------------------------------------------------------
// Read helpers
// ---------------------------------------------------------------------------

/// Read a single byte.
pub fn read_u8(data: &[u8], offset: usize) -> Result<u8> {
    check_len(data, offset, 1, "UINT8")?;
    Ok(data[offset])
}

/// Read the power value in slot `slot`.
///
/// `lo = data[2*slot + 1]`, `hi = data[2*slot + 2]`, `value = (hi << 8) | lo`.
pub fn read_power(data: &[u8], slot: usize) -> Result<u16> {
    let offset = slot * 2 + 1;
    check_len(data, offset, 2, "POWER")?;
    Ok(u16::from_le_bytes([data[offset], data[offset + 1]]))
}

/// Read up to `slots` power values, dropping zero ("unused") and truncated slots.
pub fn read_power_slots(data: &[u8], slots: usize) -> Vec<u16> {
    (0..slots)
        .filter_map(|slot| read_power(data, slot).ok())
        .filter(|&value| value != 0)
        .collect()
}

// ---------------------------------------------------------------------------
// Write helpers
// ---------------------------------------------------------------------------

/// Append a power value, low byte first.
pub fn write_power(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

// ---------------------------------------------------------------------------
// Internal
// ---------------------------------------------------------------------------

fn check_len(data: &[u8], offset: usize, need: usize, name: &'static str) -> Result<()> {
    if data.len() < offset + need {
        Err(WireError::payload_too_short(name, offset + need, data.len()))
    } else {
        Ok(())
    }
}
