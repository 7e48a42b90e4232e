use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

use super::series::{CoreMetric, LinkMetric, SeriesKey};
use super::snapshot::{CoreView, Snapshot};
use crate::analytics::{CoreState, CoreUpdate};
use crate::buffers::TimeSeries;
use crate::config::MonitorConfig;
use crate::core::{FeatureRecord, QueueStatusRecord, SubcarrierFrame};

struct CoreSlot {
    analytics: CoreState,
    amplitude: Vec<f64>,
    phase_residual: Vec<f64>,
}

struct StoreState {
    series: BTreeMap<SeriesKey, TimeSeries<f64>>,
    cores: Vec<CoreSlot>,
}

impl StoreState {
    fn append(&mut self, key: SeriesKey, at: SystemTime, value: f64) {
        if let Some(series) = self.series.get_mut(&key) {
            series.push(at, value);
        }
    }
}

/// Every published series plus all per-core analytics state behind one lock.
///
/// Each sample is applied in a single critical section, so a snapshot never
/// sees some series updated for a sample and others not. Cloning the handle
/// shares the same store.
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<StoreState>>,
    capacity: usize,
}

impl SharedStore {
    pub fn new(config: &MonitorConfig) -> Self {
        let series = SeriesKey::all(config.core_count)
            .into_iter()
            .map(|key| (key, TimeSeries::new(config.buffer_capacity)))
            .collect();
        let cores = (0..config.core_count)
            .map(|_| CoreSlot {
                analytics: CoreState::new(config.moving_average_window, config.variance_window),
                amplitude: vec![0.0; config.subcarrier_count],
                phase_residual: vec![0.0; config.subcarrier_count],
            })
            .collect();

        Self {
            inner: Arc::new(Mutex::new(StoreState { series, cores })),
            capacity: config.buffer_capacity,
        }
    }

    /// Points retained per series
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Update the frame's core analytics and publish every derived scalar.
    ///
    /// Feature extraction must already be done; only the window update and
    /// the appends happen under the lock.
    pub fn publish_csi(&self, frame: &SubcarrierFrame, features: &FeatureRecord) -> Result<CoreUpdate> {
        let mut state = self.lock();
        let tracked = state.cores.len();
        let slot = state
            .cores
            .get_mut(features.core_id)
            .ok_or_else(|| anyhow!("Core {} is not tracked (0..{})", features.core_id, tracked))?;

        let update = slot.analytics.update(&frame.samples, features);
        slot.amplitude.clone_from(&features.amplitude);
        slot.phase_residual.clone_from(&features.phase_residual);

        let mut points = vec![
            (CoreMetric::MeanAmplitude, features.mean_amplitude),
            (CoreMetric::PhaseResidualStd, features.phase_residual_std),
            (CoreMetric::AmplitudeMovingAverage, update.amplitude_moving_average),
            (CoreMetric::PhaseMovingAverage, update.phase_moving_average),
            (CoreMetric::PhaseDerivative, update.phase_derivative),
            (CoreMetric::Correlation, update.correlation),
            (CoreMetric::MedianAmplitude, features.median_amplitude),
            (CoreMetric::PhaseResidualVariance, features.phase_residual_variance),
        ];
        if let Some(variance) = update.variance {
            points.push((CoreMetric::AmplitudeVariance, variance.amplitude));
            points.push((CoreMetric::PhaseVariance, variance.phase));
        }

        let at = update.timestamp;
        for (metric, value) in points {
            state.append(SeriesKey::core(features.core_id, metric), at, value);
        }

        Ok(update)
    }

    /// Gap between consecutive CSI lines, recorded whether or not the line decodes
    pub fn publish_inter_arrival(&self, at: SystemTime, inter_arrival_ms: f64) {
        self.lock()
            .append(SeriesKey::Link(LinkMetric::InterArrivalMs), at, inter_arrival_ms);
    }

    pub fn publish_queue(&self, record: &QueueStatusRecord) {
        let mut state = self.lock();
        state.append(
            SeriesKey::Link(LinkMetric::Backlog),
            record.timestamp,
            record.backlog_depth as f64,
        );
        state.append(SeriesKey::Link(LinkMetric::SnrDb), record.timestamp, record.snr_db);
    }

    /// Copy of every retained point
    pub fn snapshot(&self) -> Snapshot {
        self.capture(None)
    }

    /// Copy of the points within `window` of the newest retained timestamp
    pub fn snapshot_window(&self, window: Duration) -> Snapshot {
        self.capture(Some(window))
    }

    pub fn series_len(&self, key: &SeriesKey) -> usize {
        self.lock().series.get(key).map_or(0, TimeSeries::len)
    }

    fn capture(&self, window: Option<Duration>) -> Snapshot {
        let (raw, cores) = {
            let state = self.lock();
            let cutoff = window.and_then(|window| {
                state
                    .series
                    .values()
                    .filter_map(TimeSeries::last_timestamp)
                    .max()
                    .and_then(|newest| newest.checked_sub(window))
            });

            let raw: Vec<_> = state
                .series
                .iter()
                .map(|(key, series)| (*key, series.points_since(cutoff)))
                .collect();
            let cores: Vec<_> = state
                .cores
                .iter()
                .enumerate()
                .map(|(core_id, slot)| CoreView {
                    core_id,
                    frames: slot.analytics.frames(),
                    amplitude: slot.amplitude.clone(),
                    phase_residual: slot.phase_residual.clone(),
                })
                .collect();
            (raw, cores)
        };

        Snapshot::from_points(raw, cores)
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
