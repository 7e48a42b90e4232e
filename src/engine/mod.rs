pub mod monitor;
pub mod reader;

pub use monitor::{Monitor, MonitorStatus};
pub use reader::SnapshotReader;
