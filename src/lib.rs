pub mod codec;
pub mod decoder;
pub mod error;
pub mod frame;
pub mod link;
pub mod monitor;
pub mod perf;
pub mod protocol;
pub mod session;
pub mod stopwatch;
pub mod store;

pub use decoder::{DeviceEvent, PacketDecoder};
pub use error::{ConnError, WireError};
pub use frame::RawFrame;
pub use link::Link;
pub use monitor::{Monitor, MonitorConfig, Recorded};
pub use perf::{Model, evaluate};
pub use protocol::Message;
pub use session::{Measurement, Session, SessionEvent, SessionState};
pub use stopwatch::{Elapsed, Stopwatch};
pub use store::{Ranked, Record, RecordPatch, RecordStore, Settings};
