//! Fixed constants of the repeater.

/// Number of circles (nodes) in Metatron's Cube.
pub const NODE_COUNT: usize = 13;

/// The golden ratio, `(1 + sqrt(5)) / 2`.
pub const PHI: f64 = 1.618_033_988_749_895;

/// Bytes in one gibibyte.
pub const GIB: u64 = 1024 * 1024 * 1024;

/// Fraction of the requested memory actually used for the expanded payload.
///
/// A budget of `n` GiB expands the payload to `n * GIB / MEMORY_DIVISOR` bytes.
pub const MEMORY_DIVISOR: u64 = 2;

/// Default memory budget in GiB when none is given.
pub const DEFAULT_MEMORY_GB: u64 = 1;

/// Length of a single reporting window.
pub const WINDOW_SECS: u64 = 1;

/// Suffix alphabet for cumulative iteration counts (index = power / 3).
pub const ITERATION_SUFFIXES: &[u8] = b" kMBTqQsSOND";

/// Suffix alphabet for per-second frequencies (SI prefixes).
pub const FREQUENCY_SUFFIXES: &[u8] = b" kMGTPEZYR";

/// Trailing spaces after the display label, clearing leftovers of a longer
/// previous line.
pub const STATUS_PADDING: usize = 5;
