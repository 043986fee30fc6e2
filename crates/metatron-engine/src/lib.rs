//! # metatron-engine
//! Preprocessing, mixing and the reporting loop.
//!
//! Wires the pure building blocks of `metatron-core` into a running session:
//! - [`payload`] — assembles the repeated bytes from an intention and files
//! - [`config::RunConfig`] — everything one run needs
//! - [`preprocess`] — optional SHA-256 digest expansion and zlib compression
//! - [`mixer`] — one repetition across the Metatron's Cube graph
//! - [`session`] — one-second windows, counting and status output

pub mod config;
pub mod mixer;
pub mod payload;
pub mod preprocess;
pub mod session;

pub use config::{memory_budget_bytes, RunConfig};
pub use mixer::Mixer;
pub use payload::{assemble, read_payload_file, FilePayload, Payload};
pub use preprocess::Preprocess;
pub use session::{prepare, EndReason, LoopState, RunSummary, Session, SystemClock, TerminalSink};
