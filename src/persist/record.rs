use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::analytics::CoreUpdate;
use crate::core::{FeatureRecord, QueueStatusRecord};

/// Feed that produced a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Csi,
    Queue,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csi => "CSI",
            Self::Queue => "QUEUE",
        }
    }
}

/// One log row: the union of CSI and queue fields, absent ones left empty
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: SystemTime,
    pub source: Source,
    pub amplitude_mean: Option<f64>,
    pub phase_std: Option<f64>,
    pub amplitude_ma: Option<f64>,
    pub phase_ma: Option<f64>,
    pub phase_derivative: Option<f64>,
    pub snr_db: Option<f64>,
    pub backlog: Option<i64>,
    pub instant_iat_ms: Option<f64>,
    pub amplitude: Option<Vec<f64>>,
    pub phase: Option<Vec<f64>>,
}

impl LogRecord {
    pub fn csi(features: &FeatureRecord, update: &CoreUpdate, instant_iat_ms: Option<f64>) -> Self {
        Self {
            timestamp: features.timestamp,
            source: Source::Csi,
            amplitude_mean: Some(features.mean_amplitude),
            phase_std: Some(features.phase_residual_std),
            amplitude_ma: Some(update.amplitude_moving_average),
            phase_ma: Some(update.phase_moving_average),
            phase_derivative: Some(update.phase_derivative),
            snr_db: None,
            backlog: None,
            instant_iat_ms,
            amplitude: Some(features.amplitude.clone()),
            phase: Some(features.phase_residual.clone()),
        }
    }

    pub fn queue(record: &QueueStatusRecord) -> Self {
        Self {
            timestamp: record.timestamp,
            source: Source::Queue,
            amplitude_mean: None,
            phase_std: None,
            amplitude_ma: None,
            phase_ma: None,
            phase_derivative: None,
            snr_db: Some(record.snr_db),
            backlog: Some(record.backlog_depth),
            instant_iat_ms: None,
            amplitude: None,
            phase: None,
        }
    }

    /// Render as CSV fields; vectors are padded or cut to `subcarriers` columns
    pub fn to_row(&self, subcarriers: usize) -> Vec<String> {
        let seconds = self
            .timestamp
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs_f64();

        let mut row = Vec::with_capacity(10 + 2 * subcarriers);
        row.push(format!("{:.6}", seconds));
        row.push(self.source.as_str().to_string());
        for value in [
            self.amplitude_mean,
            self.phase_std,
            self.amplitude_ma,
            self.phase_ma,
            self.phase_derivative,
            self.snr_db,
        ] {
            row.push(fixed(value));
        }
        row.push(self.backlog.map(|b| b.to_string()).unwrap_or_default());
        row.push(fixed(self.instant_iat_ms));
        push_vector(&mut row, self.amplitude.as_deref(), subcarriers);
        push_vector(&mut row, self.phase.as_deref(), subcarriers);
        row
    }
}

/// Column names, written once when the log is created
pub fn header(subcarriers: usize) -> Vec<String> {
    let mut columns: Vec<String> = [
        "timestamp_s",
        "source",
        "amplitude_mean",
        "phase_std",
        "amplitude_MA",
        "phase_MA",
        "phase_derivative",
        "SNR_dB",
        "backlog",
        "instant_iat_ms",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect();
    columns.extend((0..subcarriers).map(|i| format!("ampl_sc_{}", i)));
    columns.extend((0..subcarriers).map(|i| format!("phase_sc_{}", i)));
    columns
}

fn fixed(value: Option<f64>) -> String {
    value.map(|v| format!("{:.6}", v)).unwrap_or_default()
}

fn push_vector(row: &mut Vec<String>, values: Option<&[f64]>, subcarriers: usize) {
    match values {
        Some(values) => row.extend(
            (0..subcarriers).map(|i| values.get(i).map(|v| format!("{:.6}", v)).unwrap_or_default()),
        ),
        None => row.extend(std::iter::repeat(String::new()).take(subcarriers)),
    }
}
