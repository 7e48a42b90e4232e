use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalars published once per frame for each core
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CoreMetric {
    MeanAmplitude,
    PhaseResidualStd,
    AmplitudeMovingAverage,
    PhaseMovingAverage,
    AmplitudeVariance,
    PhaseVariance,
    PhaseDerivative,
    Correlation,
    MedianAmplitude,
    PhaseResidualVariance,
}

impl CoreMetric {
    pub const ALL: [CoreMetric; 10] = [
        CoreMetric::MeanAmplitude,
        CoreMetric::PhaseResidualStd,
        CoreMetric::AmplitudeMovingAverage,
        CoreMetric::PhaseMovingAverage,
        CoreMetric::AmplitudeVariance,
        CoreMetric::PhaseVariance,
        CoreMetric::PhaseDerivative,
        CoreMetric::Correlation,
        CoreMetric::MedianAmplitude,
        CoreMetric::PhaseResidualVariance,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::MeanAmplitude => "mean_amplitude",
            Self::PhaseResidualStd => "phase_residual_std",
            Self::AmplitudeMovingAverage => "amplitude_ma",
            Self::PhaseMovingAverage => "phase_ma",
            Self::AmplitudeVariance => "amplitude_variance",
            Self::PhaseVariance => "phase_variance",
            Self::PhaseDerivative => "phase_derivative",
            Self::Correlation => "correlation",
            Self::MedianAmplitude => "median_amplitude",
            Self::PhaseResidualVariance => "phase_residual_variance",
        }
    }
}

/// Link-level scalars not tied to a core
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LinkMetric {
    SnrDb,
    Backlog,
    InterArrivalMs,
}

impl LinkMetric {
    pub const ALL: [LinkMetric; 3] = [LinkMetric::SnrDb, LinkMetric::Backlog, LinkMetric::InterArrivalMs];

    pub fn name(&self) -> &'static str {
        match self {
            Self::SnrDb => "snr_db",
            Self::Backlog => "backlog",
            Self::InterArrivalMs => "inter_arrival_ms",
        }
    }
}

/// Identifies one published series in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeriesKey {
    Core { core: usize, metric: CoreMetric },
    Link(LinkMetric),
}

impl SeriesKey {
    pub fn core(core: usize, metric: CoreMetric) -> Self {
        Self::Core { core, metric }
    }

    /// Every key published for a store tracking `cores` cores
    pub fn all(cores: usize) -> Vec<SeriesKey> {
        let mut keys: Vec<SeriesKey> = (0..cores)
            .flat_map(|core| CoreMetric::ALL.iter().map(move |metric| Self::core(core, *metric)))
            .collect();
        keys.extend(LinkMetric::ALL.iter().map(|metric| Self::Link(*metric)));
        keys
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core { core, metric } => write!(f, "core{}.{}", core, metric.name()),
            Self::Link(metric) => write!(f, "link.{}", metric.name()),
        }
    }
}
