//! Human-readable scaling of [`BigCount`] values.
//!
//! A count with `power = digits - 1` is shown as its leading
//! `power % 3 + 1` digits, a dot, the next three digits and a suffix taken
//! from the domain's table at index `power / 3`:
//!
//! ```
//! use metatron_core::magnitude::{format_magnitude, Domain};
//! use metatron_core::BigCount;
//!
//! let n: BigCount = "1234567".parse().unwrap();
//! assert_eq!(format_magnitude(&n, Domain::Iterations), "1.234M");
//! let f: BigCount = "98765432101".parse().unwrap();
//! assert_eq!(format_magnitude(&f, Domain::Frequency), "98.765G");
//! ```
//!
//! Beyond the end of a table the suffix is blank. Counts too short to have
//! three fractional digits are padded with zeros.

use std::str::FromStr;

use crate::bignum::BigCount;
use crate::constants::{FREQUENCY_SUFFIXES, ITERATION_SUFFIXES};

/// Which suffix alphabet to scale with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    /// Cumulative counts: k, M, B, T, q, Q, s, S, O, N, D.
    Iterations,
    /// Per-second rates: SI prefixes k through R.
    Frequency,
}

impl Domain {
    fn suffixes(self) -> &'static [u8] {
        match self {
            Self::Iterations => ITERATION_SUFFIXES,
            Self::Frequency => FREQUENCY_SUFFIXES,
        }
    }
}

/// How counters are rendered on the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// `1.234M` style with a per-domain suffix letter.
    #[default]
    Suffix,
    /// `1.234x10^6` scientific style, identical for both domains.
    Exponent,
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hz" | "suffix" => Ok(Self::Suffix),
            "exp" | "exponent" => Ok(Self::Exponent),
            other => Err(format!("unknown display mode {other:?} (expected hz or exp)")),
        }
    }
}

/// Up to three digits starting at `from`, right-padded with `0`.
fn fraction(digits: &str, from: usize) -> String {
    let end = (from + 3).min(digits.len());
    let mut frac = digits.get(from..end).unwrap_or("").to_string();
    while frac.len() < 3 {
        frac.push('0');
    }
    frac
}

/// Render `count` as `<lead>.<frac><suffix>` for `domain`.
pub fn format_magnitude(count: &BigCount, domain: Domain) -> String {
    let digits = count.as_str();
    let power = digits.len() - 1;
    let lead = power % 3 + 1;
    let suffix = domain
        .suffixes()
        .get(power / 3)
        .map_or(' ', |&b| char::from(b));
    format!("{}.{}{}", &digits[..lead], fraction(digits, lead), suffix)
}

/// Render `count` as `<d>.<ddd>x10^<power>`.
pub fn format_exponent(count: &BigCount) -> String {
    let digits = count.as_str();
    let power = digits.len() - 1;
    format!("{}.{}x10^{}", &digits[..1], fraction(digits, 1), power)
}

/// Render `count` for `domain` in the requested display mode.
pub fn render(count: &BigCount, domain: Domain, mode: DisplayMode) -> String {
    match mode {
        DisplayMode::Suffix => format_magnitude(count, domain),
        DisplayMode::Exponent => format_exponent(count),
    }
}
