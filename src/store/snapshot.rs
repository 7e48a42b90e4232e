use std::collections::BTreeMap;
use std::time::SystemTime;

use super::series::SeriesKey;
use crate::buffers::time_series::elapsed_secs;

/// Latest per-subcarrier vectors of one core
#[derive(Debug, Clone, PartialEq)]
pub struct CoreView {
    pub core_id: usize,
    pub frames: u64,
    pub amplitude: Vec<f64>,
    pub phase_residual: Vec<f64>,
}

/// Point-in-time copy of the store, safe to read without locking.
///
/// Point times are seconds since `origin`, the earliest timestamp retained
/// by any series in the snapshot, so all series share one time axis.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub origin: Option<SystemTime>,
    pub series: BTreeMap<SeriesKey, Vec<(f64, f64)>>,
    pub cores: Vec<CoreView>,
}

impl Snapshot {
    pub(crate) fn from_points(
        raw: Vec<(SeriesKey, Vec<(SystemTime, f64)>)>,
        cores: Vec<CoreView>,
    ) -> Self {
        let origin = raw
            .iter()
            .flat_map(|(_, points)| points.iter().map(|(at, _)| *at))
            .min();

        let series = raw
            .into_iter()
            .map(|(key, points)| {
                let values = points
                    .into_iter()
                    .map(|(at, value)| (origin.map_or(0.0, |o| elapsed_secs(o, at)), value))
                    .collect();
                (key, values)
            })
            .collect();

        Self {
            origin,
            series,
            cores,
        }
    }

    /// Points of one series, oldest first; empty if the key is unknown
    pub fn get(&self, key: &SeriesKey) -> &[(f64, f64)] {
        self.series.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn latest(&self, key: &SeriesKey) -> Option<f64> {
        self.get(key).last().map(|(_, value)| *value)
    }

    pub fn core(&self, core_id: usize) -> Option<&CoreView> {
        self.cores.get(core_id)
    }

    pub fn is_empty(&self) -> bool {
        self.series.values().all(Vec::is_empty)
    }

    /// One line per non-empty series: point count and latest value
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "No samples yet".to_string();
        }

        let mut report = String::from("=== Snapshot ===\n");
        for (key, points) in self.series.iter().filter(|(_, p)| !p.is_empty()) {
            if let Some((t, value)) = points.last() {
                report.push_str(&format!(
                    "  {}: {} point{}, latest {:.4} at +{:.3}s\n",
                    key,
                    points.len(),
                    if points.len() == 1 { "" } else { "s" },
                    value,
                    t
                ));
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::series::LinkMetric;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_common_origin_across_series() {
        let at = |ms| UNIX_EPOCH + Duration::from_millis(ms);
        let raw = vec![
            (SeriesKey::Link(LinkMetric::SnrDb), vec![(at(2000), 10.0), (at(2500), 11.0)]),
            (SeriesKey::Link(LinkMetric::Backlog), vec![(at(1000), 3.0)]),
        ];
        let snapshot = Snapshot::from_points(raw, Vec::new());

        assert_eq!(snapshot.origin, Some(at(1000)));
        assert_eq!(snapshot.get(&SeriesKey::Link(LinkMetric::Backlog)), &[(0.0, 3.0)]);
        assert_eq!(
            snapshot.get(&SeriesKey::Link(LinkMetric::SnrDb)),
            &[(1.0, 10.0), (1.5, 11.0)]
        );
        assert_eq!(snapshot.latest(&SeriesKey::Link(LinkMetric::SnrDb)), Some(11.0));
    }

    #[test]
    fn test_empty_summary() {
        let snapshot = Snapshot::default();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.summary(), "No samples yet");
        assert!(snapshot.get(&SeriesKey::Link(LinkMetric::SnrDb)).is_empty());
    }
}
