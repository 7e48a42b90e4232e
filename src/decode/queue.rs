use std::time::SystemTime;

use super::{parse_number, DecodeError};
use crate::core::QueueStatusRecord;

const MIN_TOKENS: usize = 6;
const BACKLOG_TOKEN: usize = 2;
const SNR_TOKEN: usize = 5;

/// Decode a whitespace-delimited queue-status line.
///
/// Token 2 carries the backlog (`fq=7`), token 5 the SNR (`snr=12.5`); the
/// rest is ignored apart from an optional leading integer timestamp.
pub fn decode_queue_line(line: &str, received_at: SystemTime) -> Result<QueueStatusRecord, DecodeError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(DecodeError::Empty);
    }
    if tokens.len() < MIN_TOKENS {
        return Err(DecodeError::TooFewTokens {
            expected: MIN_TOKENS,
            found: tokens.len(),
        });
    }

    let backlog_depth = parse_number(value_of(tokens[BACKLOG_TOKEN], "backlog")?, "backlog")?;
    let snr_db = parse_number(value_of(tokens[SNR_TOKEN], "snr")?, "snr")?;

    Ok(QueueStatusRecord {
        timestamp: received_at,
        backlog_depth,
        snr_db,
        source_timestamp: tokens[0].parse().ok(),
    })
}

fn value_of<'a>(token: &'a str, field: &'static str) -> Result<&'a str, DecodeError> {
    token
        .split_once('=')
        .map(|(_, value)| value)
        .ok_or_else(|| DecodeError::MissingValue {
            field,
            token: token.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_of() {
        assert_eq!(value_of("fq=7", "backlog"), Ok("7"));
        assert!(matches!(
            value_of("fq7", "backlog"),
            Err(DecodeError::MissingValue { field: "backlog", .. })
        ));
    }
}
