//! Recording plans: total window split into fixed-length chunks.

use serde::{Deserialize, Serialize};

/// Chunk length the backend uses when none is given.
pub const DEFAULT_CHUNK_SECS: u64 = 180;

/// A validated recording request (both durations positive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingPlan {
    pub total_secs: u64,
    pub chunk_secs: u64,
}

impl RecordingPlan {
    /// `None` unless both durations are positive.
    pub fn new(total_secs: i64, chunk_secs: i64) -> Option<Self> {
        let total_secs = u64::try_from(total_secs).ok().filter(|v| *v > 0)?;
        let chunk_secs = u64::try_from(chunk_secs).ok().filter(|v| *v > 0)?;
        Some(Self {
            total_secs,
            chunk_secs,
        })
    }

    /// Number of chunks the backend will produce, last one possibly short.
    pub fn expected_chunks(&self) -> u64 {
        self.total_secs.div_ceil(self.chunk_secs)
    }

    /// Whole minutes in the total window.
    pub fn total_minutes(&self) -> u64 {
        self.total_secs / 60
    }
}

/// Parse a duration argument into seconds.
///
/// Accepts plain seconds (`900`) or unit-suffixed parts (`15m`, `1h30m`,
/// `90s`). A leading `-` is kept so callers can reject non-positive values
/// with a proper message.
pub fn parse_duration_secs(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let (negative, body) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    if body.is_empty() {
        return None;
    }

    let total = if let Ok(secs) = body.parse::<i64>() {
        secs
    } else {
        let mut total: i64 = 0;
        let mut digits = String::new();
        for c in body.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            let value: i64 = digits.parse().ok()?;
            digits.clear();
            let unit = match c.to_ascii_lowercase() {
                'h' => 3600,
                'm' => 60,
                's' => 1,
                _ => return None,
            };
            total = total.checked_add(value.checked_mul(unit)?)?;
        }
        // trailing digits without a unit ("1h30") are ambiguous
        if !digits.is_empty() {
            return None;
        }
        total
    };

    Some(if negative { -total } else { total })
}
