use std::time::{Duration, SystemTime};

use super::RingBuffer;

/// Bounded, insertion-ordered sequence of timestamped values.
///
/// Timestamps are wall-clock receipt times. They are expected to be
/// non-decreasing within one series but this is not enforced.
#[derive(Debug, Clone)]
pub struct TimeSeries<T> {
    points: RingBuffer<(SystemTime, T)>,
}

impl<T> TimeSeries<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: RingBuffer::new(capacity),
        }
    }

    pub fn push(&mut self, at: SystemTime, value: T) {
        self.points.push((at, value));
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.points.capacity()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &(SystemTime, T)> + '_ {
        self.points.iter()
    }

    pub fn latest(&self) -> Option<&(SystemTime, T)> {
        self.points.latest()
    }

    pub fn first_timestamp(&self) -> Option<SystemTime> {
        self.points.oldest().map(|(at, _)| *at)
    }

    pub fn last_timestamp(&self) -> Option<SystemTime> {
        self.points.latest().map(|(at, _)| *at)
    }
}

impl<T: Clone> TimeSeries<T> {
    /// Copy out every retained point at or after `cutoff` (all points when `None`).
    pub fn points_since(&self, cutoff: Option<SystemTime>) -> Vec<(SystemTime, T)> {
        self.points
            .iter()
            .filter(|(at, _)| cutoff.map_or(true, |c| *at >= c))
            .cloned()
            .collect()
    }
}

/// Seconds from `origin` to `at`, clamped at zero for clock steps backwards.
pub fn elapsed_secs(origin: SystemTime, at: SystemTime) -> f64 {
    at.duration_since(origin)
        .unwrap_or(Duration::ZERO)
        .as_secs_f64()
}
