//! Run configuration.
//!
//! [`RunConfig`] carries everything one repetition run needs. Start from
//! [`RunConfig::default`] and override fields with struct-update syntax.

use metatron_core::constants::{DEFAULT_MEMORY_GB, GIB, MEMORY_DIVISOR};
use metatron_core::error::ConfigError;
use metatron_core::{DisplayMode, DurationLimit};

use crate::preprocess::Preprocess;

/// Configuration for a single run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Bytes to repeat. Must not be empty.
    pub payload: Vec<u8>,
    /// Label shown on the status line.
    pub label: String,
    /// Expansion budget in bytes; 0 disables expansion.
    pub target_bytes: usize,
    /// Replace the buffer with its expanded SHA-256 digest.
    pub digest: bool,
    /// Deflate the buffer after the digest stage.
    pub compress: bool,
    /// Stop when elapsed time reaches this value.
    pub duration: Option<DurationLimit>,
    /// Status line rendering.
    pub display: DisplayMode,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            payload: Vec::new(),
            label: String::new(),
            target_bytes: (DEFAULT_MEMORY_GB * GIB / MEMORY_DIVISOR) as usize,
            digest: false,
            compress: false,
            duration: None,
            display: DisplayMode::default(),
        }
    }
}

impl RunConfig {
    /// Reject configurations that cannot start a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.payload.is_empty() {
            return Err(ConfigError::EmptyPayload);
        }
        Ok(())
    }

    pub fn preprocess(&self) -> Preprocess {
        Preprocess {
            digest: self.digest,
            compress: self.compress,
        }
    }
}

/// Byte budget for a memory request of `gigabytes` GiB.
///
/// Half of the requested memory is used for the expanded payload.
/// `0` disables expansion.
pub fn memory_budget_bytes(gigabytes: u64) -> Result<usize, ConfigError> {
    gigabytes
        .checked_mul(GIB)
        .map(|b| b / MEMORY_DIVISOR)
        .and_then(|b| usize::try_from(b).ok())
        .ok_or(ConfigError::MemoryOverflow { gigabytes })
}

/// Interpret a `y`/`yes` style toggle. Anything else is off.
pub fn parse_toggle(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
