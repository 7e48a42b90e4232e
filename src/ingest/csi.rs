use log::debug;
use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::SystemTime;

use super::{run_loop, spawn_receiver, Ingest, LineSource, ReceiverExit};
use crate::analytics::CoreUpdate;
use crate::core::FeatureRecord;
use crate::decode::CsiDecoder;
use crate::features;
use crate::observability::ReceiverStats;
use crate::persist::{LogClosed, LogRecord, LogSink};
use crate::store::SharedStore;

/// Everything derived from one accepted CSI line
#[derive(Debug, Clone, PartialEq)]
pub struct CsiSample {
    pub features: FeatureRecord,
    pub update: CoreUpdate,
    pub inter_arrival_ms: Option<f64>,
}

/// Receive loop for the CSI feed
pub struct CsiReceiver {
    decoder: CsiDecoder,
    store: SharedStore,
    log: LogSink,
    stats: Arc<ReceiverStats>,
    last_arrival: Option<SystemTime>,
}

impl CsiReceiver {
    pub fn new(decoder: CsiDecoder, store: SharedStore, log: LogSink) -> Self {
        Self {
            decoder,
            store,
            log,
            stats: Arc::new(ReceiverStats::new("csi")),
            last_arrival: None,
        }
    }

    pub fn stats(&self) -> Arc<ReceiverStats> {
        self.stats.clone()
    }

    /// Process one line received at `received_at`.
    ///
    /// `Ok(None)` means the line was dropped. The inter-arrival time is
    /// published for every line, dropped or not; only accepted samples
    /// carry it into the log.
    pub fn ingest(&mut self, line: &str, received_at: SystemTime) -> Result<Option<CsiSample>, LogClosed> {
        let inter_arrival_ms = self
            .last_arrival
            .replace(received_at)
            .and_then(|previous| received_at.duration_since(previous).ok())
            .map(|dt| dt.as_secs_f64() * 1000.0);
        if let Some(ms) = inter_arrival_ms {
            self.store.publish_inter_arrival(received_at, ms);
        }

        let frame = match self.decoder.decode(line, received_at) {
            Ok(frame) => frame,
            Err(e) => {
                debug!("[csi] Dropping sample: {}", e);
                self.stats.record_dropped();
                return Ok(None);
            }
        };
        let features = features::extract(&frame);

        let update = match self.store.publish_csi(&frame, &features) {
            Ok(update) => update,
            Err(e) => {
                debug!("[csi] Dropping sample: {}", e);
                self.stats.record_dropped();
                return Ok(None);
            }
        };

        self.log
            .append(LogRecord::csi(&features, &update, inter_arrival_ms))?;
        self.stats.record_accepted();

        Ok(Some(CsiSample {
            features,
            update,
            inter_arrival_ms,
        }))
    }

    /// Block on `source` until it ends or fails
    pub fn run<S: LineSource>(mut self, mut source: S) -> ReceiverExit {
        run_loop(&mut self, &mut source)
    }

    /// Run on a dedicated `csi-receiver` thread; `open` connects the transport there
    pub fn spawn<S, F>(self, open: F) -> io::Result<JoinHandle<ReceiverExit>>
    where
        S: LineSource + 'static,
        F: FnOnce() -> io::Result<S> + Send + 'static,
    {
        spawn_receiver(self, open)
    }
}

impl Ingest for CsiReceiver {
    const FEED: &'static str = "csi";

    fn ingest_line(&mut self, line: &str) -> Result<(), LogClosed> {
        self.ingest(line, SystemTime::now()).map(|_| ())
    }
}
