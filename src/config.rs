use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Transport carrying the CSI feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsiTransport {
    /// One sample per datagram
    #[default]
    Udp,
    /// Newline-delimited stream, single accepted connection
    Tcp,
}

/// Monitor configuration.
///
/// Keys are camelCase in JSON; every field falls back to its default when
/// absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitorConfig {
    pub csi_port: u16,
    pub queue_port: u16,
    /// Trailing samples averaged per core (M)
    pub moving_average_window: usize,
    /// Trailing frames per core used for the windowed variance (W)
    pub variance_window: usize,
    pub subcarrier_count: usize,
    pub core_count: usize,
    /// Points retained per published series
    pub buffer_capacity: usize,
    pub bind_address: String,
    pub csi_transport: CsiTransport,
    /// Directory receiving the timestamped CSV log
    pub log_dir: PathBuf,
    pub snapshot_interval_ms: u64,
    /// Trailing window handed to the renderer; 0 disables windowing
    pub plot_window_secs: f64,
    /// Reorder subcarriers so index 0 is the band center
    pub fft_shift: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            csi_port: 12346,
            queue_port: 12345,
            moving_average_window: 10,
            variance_window: 10,
            subcarrier_count: 64,
            core_count: 4,
            buffer_capacity: 2000,
            bind_address: "0.0.0.0".to_string(),
            csi_transport: CsiTransport::Udp,
            log_dir: PathBuf::from("."),
            snapshot_interval_ms: 100,
            plot_window_secs: 10.0,
            fft_shift: true,
        }
    }
}

impl MonitorConfig {
    /// Build from a JSON object and validate
    pub fn from_json(config: Value) -> Result<Self> {
        let config: Self =
            serde_json::from_value(config).context("Failed to parse monitor configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file and validate
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .context(format!("Failed to read configuration from {:?}", path))?;
        let value: Value = serde_json::from_str(&json)
            .context(format!("Configuration at {:?} is not valid JSON", path))?;
        Self::from_json(value)
    }

    pub fn validate(&self) -> Result<()> {
        let counts = [
            ("movingAverageWindow", self.moving_average_window),
            ("varianceWindow", self.variance_window),
            ("subcarrierCount", self.subcarrier_count),
            ("coreCount", self.core_count),
            ("bufferCapacity", self.buffer_capacity),
        ];
        for (name, value) in counts {
            if value == 0 {
                bail!("{} must be greater than zero", name);
            }
        }
        if self.snapshot_interval_ms == 0 {
            bail!("snapshotIntervalMs must be greater than zero");
        }
        if !self.plot_window_secs.is_finite() || self.plot_window_secs < 0.0 {
            bail!("plotWindowSecs must be a non-negative number");
        }
        Ok(())
    }

    pub fn snapshot_interval(&self) -> Duration {
        Duration::from_millis(self.snapshot_interval_ms)
    }

    pub fn plot_window(&self) -> Option<Duration> {
        if self.plot_window_secs > 0.0 {
            Some(Duration::from_secs_f64(self.plot_window_secs))
        } else {
            None
        }
    }

    /// Tokens a well-formed CSI line must carry
    pub fn csi_token_count(&self) -> usize {
        3 + 2 * self.subcarrier_count
    }
}
