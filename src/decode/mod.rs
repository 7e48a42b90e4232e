//! Line decoders for the two telemetry feeds.
//!
//! Decoding is a pure function of the input line. Every failure is a
//! [`DecodeError`]; callers drop the sample and carry on.

pub mod csi;
pub mod queue;

pub use csi::{fft_shift, guard_band_mask, subcarrier_indices, CsiDecoder};
pub use queue::decode_queue_line;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("empty line")]
    Empty,

    #[error("expected at least {expected} tokens, found {found}")]
    TooFewTokens { expected: usize, found: usize },

    #[error("invalid {field}: {token:?}")]
    InvalidNumber { field: &'static str, token: String },

    #[error("core id {core} outside 0..{count}")]
    CoreOutOfRange { core: i64, count: usize },

    #[error("{field} token {token:?} is not key=value")]
    MissingValue { field: &'static str, token: String },
}

fn parse_number<T: std::str::FromStr>(token: &str, field: &'static str) -> Result<T, DecodeError> {
    token.trim().parse().map_err(|_| DecodeError::InvalidNumber {
        field,
        token: token.to_string(),
    })
}
