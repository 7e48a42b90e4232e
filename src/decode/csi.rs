use num_complex::Complex64;
use std::time::SystemTime;

use super::{parse_number, DecodeError};
use crate::config::MonitorConfig;
use crate::core::SubcarrierFrame;

/// Decodes `seq,coreId,streamId,re0,im0,...` lines into frames.
#[derive(Debug, Clone)]
pub struct CsiDecoder {
    subcarriers: usize,
    cores: usize,
    shift: bool,
}

impl CsiDecoder {
    pub fn new(subcarriers: usize, cores: usize, shift: bool) -> Self {
        Self {
            subcarriers,
            cores,
            shift,
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(config.subcarrier_count, config.core_count, config.fft_shift)
    }

    pub fn subcarriers(&self) -> usize {
        self.subcarriers
    }

    pub fn expected_tokens(&self) -> usize {
        3 + 2 * self.subcarriers
    }

    /// Decode one line. Tokens past the last subcarrier pair are ignored.
    pub fn decode(&self, line: &str, received_at: SystemTime) -> Result<SubcarrierFrame, DecodeError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(DecodeError::Empty);
        }

        let tokens: Vec<&str> = line.split(',').collect();
        let expected = self.expected_tokens();
        if tokens.len() < expected {
            return Err(DecodeError::TooFewTokens {
                expected,
                found: tokens.len(),
            });
        }

        let sequence: i64 = parse_number(tokens[0], "sequence number")?;
        let core: i64 = parse_number(tokens[1], "core id")?;
        if core < 0 || core as u64 >= self.cores as u64 {
            return Err(DecodeError::CoreOutOfRange {
                core,
                count: self.cores,
            });
        }
        let stream_id: i64 = parse_number(tokens[2], "stream id")?;

        let mut samples = tokens[3..expected]
            .chunks_exact(2)
            .map(|pair| -> Result<Complex64, DecodeError> {
                let re: f64 = parse_number(pair[0], "real part")?;
                let im: f64 = parse_number(pair[1], "imaginary part")?;
                Ok(Complex64::new(re, im))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if self.shift {
            fft_shift(&mut samples);
        }

        Ok(SubcarrierFrame {
            sequence,
            core_id: core as usize,
            stream_id,
            samples,
            received_at,
        })
    }
}

/// Move the zero-frequency bin to the center, matching physical subcarrier order.
pub fn fft_shift<T>(values: &mut [T]) {
    let half = values.len() / 2;
    values.rotate_right(half);
}

/// Centered subcarrier indices `-K/2 .. K/2` for a shifted frame.
pub fn subcarrier_indices(subcarriers: usize) -> Vec<i64> {
    let half = (subcarriers / 2) as i64;
    (0..subcarriers as i64).map(|i| i - half).collect()
}

/// Guard-band and DC bins of a shifted frame (`true` = guard).
///
/// For 64 subcarriers these are -32..=-29, 0 and 29..=31.
pub fn guard_band_mask(subcarriers: usize) -> Vec<bool> {
    let half = (subcarriers / 2) as i64;
    let edge = (subcarriers / 16) as i64;
    subcarrier_indices(subcarriers)
        .into_iter()
        .map(|k| k < -half + edge || k == 0 || k > half - edge)
        .collect()
}
