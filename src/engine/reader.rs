use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::store::{SharedStore, Snapshot};

/// Periodic consumer of store snapshots.
///
/// Each tick holds the store lock only long enough to copy the retained
/// points; the sink runs after the lock is released.
pub struct SnapshotReader {
    store: SharedStore,
    period: Duration,
    window: Option<Duration>,
}

impl SnapshotReader {
    pub fn new(store: SharedStore, period: Duration) -> Self {
        Self {
            store,
            period,
            window: None,
        }
    }

    /// Only hand out points within `window` of the newest one
    pub fn with_window(mut self, window: Option<Duration>) -> Self {
        self.window = window;
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Take one snapshot now
    pub fn read(&self) -> Snapshot {
        match self.window {
            Some(window) => self.store.snapshot_window(window),
            None => self.store.snapshot(),
        }
    }

    /// Deliver a snapshot to `sink` every period until `shutdown` fires
    pub fn spawn<F>(self, mut sink: F, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()>
    where
        F: FnMut(Snapshot) + Send + 'static,
    {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => sink(self.read()),
                    _ = shutdown.recv() => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorConfig;
    use crate::core::QueueStatusRecord;
    use crate::store::{LinkMetric, SeriesKey};
    use std::time::SystemTime;

    #[test]
    fn test_read_without_window() {
        let store = SharedStore::new(&MonitorConfig::default());
        store.publish_queue(&QueueStatusRecord {
            timestamp: SystemTime::now(),
            backlog_depth: 4,
            snr_db: 18.0,
            source_timestamp: None,
        });

        let reader = SnapshotReader::new(store, Duration::from_millis(10));
        let snapshot = reader.read();
        assert_eq!(snapshot.latest(&SeriesKey::Link(LinkMetric::Backlog)), Some(4.0));
    }
}
