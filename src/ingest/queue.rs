use log::debug;
use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::SystemTime;

use super::{run_loop, spawn_receiver, Ingest, LineSource, ReceiverExit};
use crate::core::QueueStatusRecord;
use crate::decode::decode_queue_line;
use crate::observability::ReceiverStats;
use crate::persist::{LogClosed, LogRecord, LogSink};
use crate::store::SharedStore;

/// Receive loop for the queue-status feed. Does not touch core analytics.
pub struct QueueReceiver {
    store: SharedStore,
    log: LogSink,
    stats: Arc<ReceiverStats>,
}

impl QueueReceiver {
    pub fn new(store: SharedStore, log: LogSink) -> Self {
        Self {
            store,
            log,
            stats: Arc::new(ReceiverStats::new("queue")),
        }
    }

    pub fn stats(&self) -> Arc<ReceiverStats> {
        self.stats.clone()
    }

    /// Process one line; `Ok(None)` means it was dropped
    pub fn ingest(&mut self, line: &str, received_at: SystemTime) -> Result<Option<QueueStatusRecord>, LogClosed> {
        let record = match decode_queue_line(line, received_at) {
            Ok(record) => record,
            Err(e) => {
                debug!("[queue] Dropping line: {}", e);
                self.stats.record_dropped();
                return Ok(None);
            }
        };

        self.store.publish_queue(&record);
        self.log.append(LogRecord::queue(&record))?;
        self.stats.record_accepted();
        Ok(Some(record))
    }

    pub fn run<S: LineSource>(mut self, mut source: S) -> ReceiverExit {
        run_loop(&mut self, &mut source)
    }

    /// Run on a dedicated `queue-receiver` thread
    pub fn spawn<S, F>(self, open: F) -> io::Result<JoinHandle<ReceiverExit>>
    where
        S: LineSource + 'static,
        F: FnOnce() -> io::Result<S> + Send + 'static,
    {
        spawn_receiver(self, open)
    }
}

impl Ingest for QueueReceiver {
    const FEED: &'static str = "queue";

    fn ingest_line(&mut self, line: &str) -> Result<(), LogClosed> {
        self.ingest(line, SystemTime::now()).map(|_| ())
    }
}
