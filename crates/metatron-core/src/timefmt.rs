//! Elapsed-time rendering and the optional run duration limit.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 3600;

/// Format whole seconds as zero-padded `HH:MM:SS`.
///
/// Hours are not wrapped, so runs past 99 hours print three or more hour
/// digits.
pub fn format_hms(seconds: u64) -> String {
    let hours = seconds / SECS_PER_HOUR;
    let minutes = (seconds % SECS_PER_HOUR) / SECS_PER_MINUTE;
    let secs = seconds % SECS_PER_MINUTE;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// A validated `HH:MM:SS` stop time.
///
/// The reporting loop stops when the formatted elapsed time equals
/// [`as_str`](Self::as_str) exactly, so the limit is kept in the canonical
/// form produced by [`format_hms`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationLimit {
    text: String,
    seconds: u64,
}

impl DurationLimit {
    pub fn from_seconds(seconds: u64) -> Self {
        Self {
            text: format_hms(seconds),
            seconds,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    /// Whether `elapsed` seconds have reached this limit.
    pub fn is_reached_at(&self, elapsed: u64) -> bool {
        format_hms(elapsed) == self.text
    }
}

impl FromStr for DurationLimit {
    type Err = ConfigError;

    /// Accepts canonical `HH:MM:SS`: at least two hour digits with no extra
    /// leading zero, exactly two minute and second digits below 60, and a
    /// total above zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidDuration(s.to_string());
        let parts: Vec<&str> = s.split(':').collect();
        let [h, m, sec] = parts.as_slice() else {
            return Err(invalid());
        };
        let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
        if h.len() < 2 || m.len() != 2 || sec.len() != 2 || ![*h, *m, *sec].into_iter().all(all_digits) {
            return Err(invalid());
        }

        let hours: u64 = h.parse().map_err(|_| invalid())?;
        let minutes: u64 = m.parse().map_err(|_| invalid())?;
        let secs: u64 = sec.parse().map_err(|_| invalid())?;
        if minutes >= 60 || secs >= 60 {
            return Err(invalid());
        }

        let total = hours
            .checked_mul(SECS_PER_HOUR)
            .and_then(|t| t.checked_add(minutes * SECS_PER_MINUTE + secs))
            .ok_or_else(invalid)?;
        // Zero and padded forms like "001:00:00" would never match an
        // elapsed time.
        let limit = Self::from_seconds(total);
        if total == 0 || limit.text != s {
            return Err(invalid());
        }
        Ok(limit)
    }
}

impl fmt::Display for DurationLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
