use num_complex::Complex64;
use std::time::SystemTime;

/// One decoded CSI measurement from a single receive core.
///
/// Immutable once decoded; `samples` holds exactly `subcarrierCount`
/// entries, already reordered to physical subcarrier indexing when the
/// decoder applies the spectral shift.
#[derive(Debug, Clone, PartialEq)]
pub struct SubcarrierFrame {
    pub sequence: i64,
    pub core_id: usize,
    /// Carried through but not used by the analytics
    pub stream_id: i64,
    pub samples: Vec<Complex64>,
    pub received_at: SystemTime,
}

impl SubcarrierFrame {
    pub fn subcarrier_count(&self) -> usize {
        self.samples.len()
    }
}

/// One queue-status line: backlog depth and link SNR.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueStatusRecord {
    pub timestamp: SystemTime,
    pub backlog_depth: i64,
    pub snr_db: f64,
    /// Leading token of the line when it parses as an integer
    pub source_timestamp: Option<i64>,
}
