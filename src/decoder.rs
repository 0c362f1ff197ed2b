//! Frame → [`DeviceEvent`] decoding.
//!
//! [`Message::decode`] is stateless. The one thing it cannot know is what a
//! launch-complete frame (index 115) should report: the latest power and the
//! shoot counter come from earlier frames of the same burst. [`PacketDecoder`]
//! carries exactly that burst context and nothing else.

use crate::frame::RawFrame;
use crate::protocol::Message;

/// Domain event derived from launcher frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviceEvent {
    Armed,
    LaunchStarted,
    PowerSample { value: u16 },
    LaunchComplete { max_power: u16, shoot_count: u8 },
}

/// Burst-aware decoder.
#[derive(Debug, Clone, Default)]
pub struct PacketDecoder {
    /// Latest non-zero power seen in the current burst. Overwritten by every
    /// sample, matching how the launcher reports its running value.
    last_power: u16,
    /// Latest terminal-frame shoot counter in the current burst.
    shoot_count: u8,
}

impl PacketDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one frame into zero or more events.
    pub fn decode(&mut self, frame: &RawFrame) -> Vec<DeviceEvent> {
        self.apply(&Message::decode(frame))
    }

    /// Fold an already-decoded message into events.
    pub fn apply(&mut self, message: &Message) -> Vec<DeviceEvent> {
        match message {
            Message::Armed => vec![DeviceEvent::Armed],
            Message::LaunchStart => vec![DeviceEvent::LaunchStarted],
            Message::LaunchContinuation { .. } | Message::Unknown { .. } => Vec::new(),
            Message::LaunchEnd => vec![DeviceEvent::LaunchComplete {
                max_power: self.last_power,
                shoot_count: self.shoot_count,
            }],
            Message::PowerBurst(burst) => self.samples(&burst.samples),
            Message::PowerTerminal(terminal) => {
                let events = self.samples(&terminal.samples);
                if let Some(count) = terminal.shoot_count {
                    self.shoot_count = count;
                }
                events
            }
        }
    }

    /// Latest power in the current burst (0 if none yet).
    pub fn last_power(&self) -> u16 {
        self.last_power
    }

    /// Latest shoot counter in the current burst (0 if no terminal frame yet).
    pub fn shoot_count(&self) -> u8 {
        self.shoot_count
    }

    /// Drop burst context. The monitor calls this on (dis)connect, when the
    /// session accepts a launch start and once a measurement is stored. A
    /// repeated 112 in the middle of a burst leaves it untouched.
    pub fn reset(&mut self) {
        self.last_power = 0;
        self.shoot_count = 0;
    }

    fn samples(&mut self, values: &[u16]) -> Vec<DeviceEvent> {
        values
            .iter()
            .map(|&value| {
                self.last_power = value;
                DeviceEvent::PowerSample { value }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::power::{PowerBurst, PowerTerminal};

    fn feed(decoder: &mut PacketDecoder, wire: &[u8]) -> Vec<DeviceEvent> {
        decoder.decode(&RawFrame::parse(wire).unwrap())
    }

    fn burst(seq: u8, samples: &[u16]) -> Vec<u8> {
        PowerBurst {
            seq,
            samples: samples.to_vec(),
        }
        .encode()
    }

    fn terminal(samples: &[u16], shoot_count: u8) -> Vec<u8> {
        PowerTerminal {
            samples: samples.to_vec(),
            shoot_count: Some(shoot_count),
        }
        .encode()
    }

    #[test]
    fn armed_and_launch_start() {
        let mut d = PacketDecoder::new();
        assert_eq!(feed(&mut d, &[160]), vec![DeviceEvent::Armed]);
        assert_eq!(feed(&mut d, &[112]), vec![DeviceEvent::LaunchStarted]);
        assert!(feed(&mut d, &[113]).is_empty());
        assert!(feed(&mut d, &[114]).is_empty());
    }

    #[test]
    fn unknown_indices_are_inert() {
        let mut d = PacketDecoder::new();
        for index in (0..=255u8).filter(|&i| !matches!(i, 112..=115 | 160 | 176..=182)) {
            assert!(feed(&mut d, &[index, 0x05, 0x20]).is_empty(), "index {index}");
        }
        assert_eq!(d.last_power(), 0);
    }

    #[test]
    fn burst_slot_zero() {
        let mut d = PacketDecoder::new();
        let events = feed(&mut d, &[176, 0x05, 0x20, 0x00, 0x00]);
        assert_eq!(events, vec![DeviceEvent::PowerSample { value: 8197 }]);
    }

    #[test]
    fn samples_in_slot_order() {
        let mut d = PacketDecoder::new();
        let events = feed(&mut d, &burst(0, &[300, 500, 900]));
        assert_eq!(
            events,
            vec![
                DeviceEvent::PowerSample { value: 300 },
                DeviceEvent::PowerSample { value: 500 },
                DeviceEvent::PowerSample { value: 900 },
            ]
        );
    }

    #[test]
    fn full_burst_reports_latest_power_and_count() {
        let mut d = PacketDecoder::new();
        feed(&mut d, &[112]);
        feed(&mut d, &burst(0, &[1200, 4000, 6500, 8000, 8400, 8600, 8700, 8750]));
        feed(&mut d, &burst(5, &[8760]));
        let events = feed(&mut d, &terminal(&[8100, 0], 12));
        assert_eq!(events, vec![DeviceEvent::PowerSample { value: 8100 }]);
        assert_eq!(
            feed(&mut d, &[115]),
            vec![DeviceEvent::LaunchComplete {
                max_power: 8100,
                shoot_count: 12,
            }]
        );
    }

    #[test]
    fn truncated_burst_defaults_shoot_count() {
        let mut d = PacketDecoder::new();
        feed(&mut d, &[112]);
        feed(&mut d, &burst(0, &[640]));
        assert_eq!(
            feed(&mut d, &[115]),
            vec![DeviceEvent::LaunchComplete {
                max_power: 640,
                shoot_count: 0,
            }]
        );
    }

    #[test]
    fn repeated_launch_start_keeps_burst() {
        let mut d = PacketDecoder::new();
        feed(&mut d, &[112]);
        feed(&mut d, &burst(0, &[5000]));
        feed(&mut d, &terminal(&[], 3));
        assert_eq!(feed(&mut d, &[112]), vec![DeviceEvent::LaunchStarted]);
        assert_eq!(
            feed(&mut d, &[115]),
            vec![DeviceEvent::LaunchComplete {
                max_power: 5000,
                shoot_count: 3,
            }]
        );
    }

    #[test]
    fn reset_clears_burst() {
        let mut d = PacketDecoder::new();
        feed(&mut d, &burst(0, &[5000]));
        feed(&mut d, &terminal(&[], 3));
        d.reset();
        assert_eq!(
            feed(&mut d, &[115]),
            vec![DeviceEvent::LaunchComplete {
                max_power: 0,
                shoot_count: 0,
            }]
        );
    }

    #[test]
    fn short_terminal_keeps_samples_and_count() {
        let mut d = PacketDecoder::new();
        feed(&mut d, &terminal(&[], 4));
        let events = feed(&mut d, &[182, 0x10, 0x00]);
        assert_eq!(events, vec![DeviceEvent::PowerSample { value: 16 }]);
        assert_eq!(d.shoot_count(), 4);
    }
}
