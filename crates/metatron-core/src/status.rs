//! The once-per-second status line.

use std::fmt;

use crate::constants::STATUS_PADDING;

/// Pre-rendered fields of one status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// Elapsed time as `HH:MM:SS`.
    pub elapsed: String,
    /// Scaled cumulative iteration count.
    pub iterations: String,
    /// Scaled frequency of the last window, without the `Hz` unit.
    pub frequency: String,
    /// Display label of the payload.
    pub label: String,
}

impl fmt::Display for StatusLine {
    /// `[HH:MM:SS] Repeating: (<iterations> / <frequency>Hz): <label>` followed
    /// by a few spaces of padding.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] Repeating: ({} / {}Hz): {}{:pad$}",
            self.elapsed,
            self.iterations,
            self.frequency,
            self.label,
            "",
            pad = STATUS_PADDING
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_all_fields() {
        let line = StatusLine {
            elapsed: "00:00:01".to_string(),
            iterations: "1.234M".to_string(),
            frequency: "1.234M".to_string(),
            label: "I am Love.".to_string(),
        };
        assert_eq!(
            line.to_string(),
            "[00:00:01] Repeating: (1.234M / 1.234MHz): I am Love.     "
        );
    }
}
