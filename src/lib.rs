pub mod analytics;
pub mod buffers;
pub mod config;
pub mod core;
pub mod decode;
pub mod engine;
pub mod features;
pub mod ingest;
pub mod observability;
pub mod persist;
pub mod store;

pub use config::{CsiTransport, MonitorConfig};
