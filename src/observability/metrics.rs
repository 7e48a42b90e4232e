use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one ingestion feed, readable while the receiver runs
#[derive(Debug)]
pub struct ReceiverStats {
    feed: String,
    accepted: AtomicU64,
    dropped: AtomicU64,
}

/// Plain copy of [`ReceiverStats`] at one instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub feed: String,
    pub accepted: u64,
    pub dropped: u64,
}

impl ReceiverStats {
    pub fn new(feed: impl Into<String>) -> Self {
        Self {
            feed: feed.into(),
            accepted: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    pub fn feed(&self) -> &str {
        &self.feed
    }

    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            feed: self.feed.clone(),
            accepted: self.accepted(),
            dropped: self.dropped(),
        }
    }
}
