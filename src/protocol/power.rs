//! Shoot-power frames.

use crate::codec;
use crate::frame::RawFrame;

/// Power burst frame (indices 176-181). Up to 8 samples per frame.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowerBurst {
    /// Position of this frame within the burst (0 for index 176).
    pub seq: u8,
    /// Non-zero samples in slot order.
    pub samples: Vec<u16>,
}

impl PowerBurst {
    pub fn decode(frame: &RawFrame) -> Self {
        Self {
            seq: frame.index().wrapping_sub(super::INDEX_POWER_FIRST),
            samples: codec::read_power_slots(frame.as_bytes(), codec::BURST_SLOTS),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![super::INDEX_POWER_FIRST.wrapping_add(self.seq)];
        for slot in 0..codec::BURST_SLOTS {
            codec::write_power(&mut buf, self.samples.get(slot).copied().unwrap_or(0));
        }
        buf
    }
}

/// Terminal power frame (index 182). Two samples plus the shoot counter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowerTerminal {
    /// Non-zero samples in slot order.
    pub samples: Vec<u16>,
    /// Launcher's running shoot count. `None` when the frame stops short of
    /// the counter byte.
    pub shoot_count: Option<u8>,
}

impl PowerTerminal {
    pub fn decode(frame: &RawFrame) -> Self {
        let wire = frame.as_bytes();
        Self {
            samples: codec::read_power_slots(wire, codec::TERMINAL_SLOTS),
            shoot_count: codec::read_u8(wire, codec::SHOOT_COUNT_OFFSET).ok(),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![super::INDEX_POWER_TERMINAL];
        for slot in 0..codec::TERMINAL_SLOTS {
            codec::write_power(&mut buf, self.samples.get(slot).copied().unwrap_or(0));
        }
        // Bytes 5-8 are unused padding.
        buf.resize(codec::SHOOT_COUNT_OFFSET, 0);
        buf.push(self.shoot_count.unwrap_or(0));
        buf
    }
}
