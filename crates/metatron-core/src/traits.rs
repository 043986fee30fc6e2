//! Seams between the reporting loop and the outside world.
//!
//! - [`Clock`] — monotonic time source driving the one-second windows
//! - [`StatusSink`] — destination of the live status line
//!
//! Production implementations live in `metatron-engine`; tests substitute
//! stepping clocks and recording sinks.

use std::io;
use std::time::Instant;

use crate::status::StatusLine;

/// Monotonic time source.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Receives one status line per completed window.
pub trait StatusSink {
    /// Replace the currently shown status with `line`.
    fn update(&mut self, line: &StatusLine) -> io::Result<()>;

    /// Called once when the loop stops. Terminates the live line.
    fn finish(&mut self) -> io::Result<()>;
}

impl<S: StatusSink + ?Sized> StatusSink for &mut S {
    fn update(&mut self, line: &StatusLine) -> io::Result<()> {
        (**self).update(line)
    }

    fn finish(&mut self) -> io::Result<()> {
        (**self).finish()
    }
}
