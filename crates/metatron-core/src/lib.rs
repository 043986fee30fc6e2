//! # metatron-core
//! Foundation types for the Metatron repeater.
//!
//! Everything in this crate is pure and I/O-free:
//! - [`graph`] — the fixed 13-node Metatron's Cube topology
//! - [`partition`] — golden-ratio payload expansion and node allocation
//! - [`bignum`] — unbounded decimal counters
//! - [`magnitude`] — scaled display of counters and rates
//! - [`timefmt`] — `HH:MM:SS` elapsed time
//! - [`status`] — the live status line
//! - [`traits`] — clock and status output seams used by the reporting loop

pub mod bignum;
pub mod constants;
pub mod error;
pub mod graph;
pub mod magnitude;
pub mod partition;
pub mod status;
pub mod timefmt;
pub mod traits;

pub use bignum::BigCount;
pub use graph::{Graph, GraphNode};
pub use magnitude::{DisplayMode, Domain};
pub use status::StatusLine;
pub use timefmt::DurationLimit;
