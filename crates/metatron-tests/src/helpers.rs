//! Shared test helpers for E2E and integration tests.

use std::cell::Cell;
use std::io;
use std::time::{Duration, Instant};

use metatron_core::traits::{Clock, StatusSink};
use metatron_core::StatusLine;
use metatron_engine::RunConfig;

/// Clock that advances by a fixed step on every read.
///
/// With a 1 ms step a one-second window sees exactly 999 reads inside it,
/// so every window performs 999 mix passes.
#[derive(Debug)]
pub struct StepClock {
    base: Instant,
    step: Duration,
    reads: Cell<u32>,
}

impl StepClock {
    pub fn new(step: Duration) -> Self {
        Self {
            base: Instant::now(),
            step,
            reads: Cell::new(0),
        }
    }

    pub fn millis(step: u64) -> Self {
        Self::new(Duration::from_millis(step))
    }
}

impl Clock for StepClock {
    fn now(&self) -> Instant {
        let n = self.reads.get();
        self.reads.set(n + 1);
        self.base + self.step * n
    }
}

/// Mix passes per window under [`StepClock::millis`]`(step)`.
pub fn passes_per_window(step_ms: u64) -> u64 {
    1000u64.div_ceil(step_ms) - 1
}

/// Sink that keeps every status line it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub lines: Vec<StatusLine>,
    pub finished: u32,
}

impl StatusSink for RecordingSink {
    fn update(&mut self, line: &StatusLine) -> io::Result<()> {
        self.lines.push(line.clone());
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.finished += 1;
        Ok(())
    }
}

/// Sink whose writes always fail, as on a closed stdout.
#[derive(Debug, Default)]
pub struct BrokenSink;

impl StatusSink for BrokenSink {
    fn update(&mut self, _line: &StatusLine) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn finish(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }
}

/// Sink that records lines but fails the `fail_at`-th update (1-based).
#[derive(Debug, Default)]
pub struct FailingSink {
    pub recorded: RecordingSink,
    pub fail_at: usize,
    updates: usize,
}

impl FailingSink {
    pub fn failing_at(fail_at: usize) -> Self {
        Self {
            fail_at,
            ..Self::default()
        }
    }
}

impl StatusSink for FailingSink {
    fn update(&mut self, line: &StatusLine) -> io::Result<()> {
        self.updates += 1;
        if self.updates == self.fail_at {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        }
        self.recorded.update(line)
    }

    fn finish(&mut self) -> io::Result<()> {
        self.recorded.finish()
    }
}

/// A small config repeating `payload` into `target_bytes`.
pub fn small_config(payload: &str, target_bytes: usize, duration: Option<&str>) -> RunConfig {
    RunConfig {
        payload: payload.as_bytes().to_vec(),
        label: payload.to_string(),
        target_bytes,
        duration: duration.map(|d| d.parse().expect("valid duration")),
        ..RunConfig::default()
    }
}
