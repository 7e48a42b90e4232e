//! Append-only CSV record of every ingested sample.

pub mod record;
pub mod writer;

pub use record::{header, LogRecord, Source};
pub use writer::{spawn_log_writer, timestamped_log_path, LogClosed, LogSink, LogWriterHandle, PersistenceLog};
