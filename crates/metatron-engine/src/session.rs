//! The reporting loop.
//!
//! A [`Session`] owns the loaded graph and drives it in one-second windows:
//! inside a window the mixer runs back to back until the clock passes the
//! window end, then the window's repetitions are folded into the grand
//! total and a status line is emitted.
//!
//! ```text
//!   Running ──(cancel flag | duration reached)──▶ Cancelled ──finish()──▶ Stopped
//!      └───────────────────(finish())─────────────────────────────────────▲
//! ```
//!
//! The window is a poll against the [`Clock`], never a sleep, and the
//! cancellation flag is checked after every repetition.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use metatron_core::constants::WINDOW_SECS;
use metatron_core::error::MetatronError;
use metatron_core::graph::{build_graph, Graph};
use metatron_core::magnitude::render;
use metatron_core::partition::{allocate, load};
use metatron_core::timefmt::format_hms;
use metatron_core::traits::{Clock, StatusSink};
use metatron_core::{BigCount, DisplayMode, Domain, DurationLimit, StatusLine};
use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::mixer::Mixer;

/// Wall-clock [`Clock`] backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Writes the status line in place using a carriage return.
#[derive(Debug)]
pub struct TerminalSink<W: Write> {
    out: W,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Show a transient loading notice, overwritten by the first status line.
    pub fn loading(&mut self) -> io::Result<()> {
        write!(self.out, "Loading...{:10}\r", "")?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> StatusSink for TerminalSink<W> {
    fn update(&mut self, line: &StatusLine) -> io::Result<()> {
        write!(self.out, "{line}\r")?;
        self.out.flush()
    }

    fn finish(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        self.out.flush()
    }
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Cancelled(EndReason),
    Stopped(EndReason),
}

/// Why a session left the running state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The cancellation flag was raised.
    Interrupted,
    /// Elapsed time matched the configured duration.
    DurationReached,
    /// The status sink rejected a write.
    OutputFailed,
}

/// Final counters of a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Completed (reported) windows.
    pub seconds: u64,
    /// Every repetition performed, including those of a window cut short by
    /// cancellation. That last partial window is never reported, so this can
    /// exceed the total shown on the final status line.
    pub total_iterations: BigCount,
    /// Iterations of the last completed window.
    pub last_frequency: BigCount,
    pub end: EndReason,
}

/// A loaded graph plus the fixed per-run multipliers.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub graph: Graph,
    /// Payload copies used by the partition allocator.
    pub multiplier: u64,
    /// Digest copies used by the preprocessing pipeline.
    pub hash_multiplier: u64,
    /// Length of the buffer finally loaded into the graph.
    pub buffer_len: usize,
}

/// Validate `config`, allocate, preprocess and load the graph.
pub fn prepare(config: &RunConfig) -> Result<Prepared, MetatronError> {
    config.validate()?;

    let mut graph = build_graph();
    let alloc = allocate(&mut graph, &config.payload, config.target_bytes);
    info!(
        multiplier = alloc.multiplier,
        bytes = alloc.buffer.len(),
        "payload allocated"
    );

    let preprocess = config.preprocess();
    let processed = preprocess.apply(alloc.buffer, config.target_bytes)?;
    let buffer_len = processed.buffer.len();
    // An expanded, untouched buffer is already loaded by `allocate`.
    if !preprocess.is_noop() || config.target_bytes == 0 {
        load(&mut graph, &processed.buffer, buffer_len);
    }
    debug!(bytes = buffer_len, hash_multiplier = processed.hash_multiplier, "graph loaded");

    Ok(Prepared {
        graph,
        multiplier: alloc.multiplier,
        hash_multiplier: processed.hash_multiplier,
        buffer_len,
    })
}

/// Iterations credited for a window of `raw` mixer steps.
pub fn window_total(raw: u64, multiplier: u64, hash_multiplier: u64) -> BigCount {
    BigCount::from(raw)
        .times_u64(multiplier)
        .times_u64(hash_multiplier)
}

/// One repetition run.
pub struct Session<C: Clock> {
    prepared: Prepared,
    label: String,
    duration: Option<DurationLimit>,
    display: DisplayMode,
    clock: C,
    mixer: Mixer,
    state: LoopState,
    elapsed: u64,
    total_iterations: BigCount,
    total_freq: BigCount,
}

impl<C: Clock> Session<C> {
    /// Prepare `config` and build a session driven by `clock`.
    pub fn new(config: &RunConfig, clock: C) -> Result<Self, MetatronError> {
        let prepared = prepare(config)?;
        Ok(Self::from_prepared(prepared, config, clock))
    }

    pub fn from_prepared(prepared: Prepared, config: &RunConfig, clock: C) -> Self {
        let mixer = Mixer::for_graph(&prepared.graph);
        Self {
            prepared,
            label: config.label.clone(),
            duration: config.duration.clone(),
            display: config.display,
            clock,
            mixer,
            state: LoopState::Running,
            elapsed: 0,
            total_iterations: BigCount::zero(),
            total_freq: BigCount::zero(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn prepared(&self) -> &Prepared {
        &self.prepared
    }

    pub fn total_iterations(&self) -> &BigCount {
        &self.total_iterations
    }

    fn status_line(&self) -> StatusLine {
        StatusLine {
            elapsed: format_hms(self.elapsed),
            iterations: render(&self.total_iterations, Domain::Iterations, self.display),
            frequency: render(&self.total_freq, Domain::Frequency, self.display),
            label: self.label.clone(),
        }
    }

    /// Mix until the window closes. Returns the raw count and whether
    /// cancellation cut the window short.
    fn run_window(&mut self, cancel: &AtomicBool) -> (u64, bool) {
        let end = self.clock.now() + Duration::from_secs(WINDOW_SECS);
        let mut raw = 0u64;
        while self.clock.now() < end {
            self.mixer.mix(&self.prepared.graph, &mut raw);
            if cancel.load(Ordering::Relaxed) {
                return (raw, true);
            }
        }
        (raw, false)
    }

    /// Stop after a failed status write. The live line is still terminated
    /// on a best-effort basis; the write error is the one reported.
    fn abort<S: StatusSink>(&mut self, mut sink: S, err: io::Error) -> MetatronError {
        self.state = LoopState::Stopped(EndReason::OutputFailed);
        if let Err(finish_err) = sink.finish() {
            debug!(error = %finish_err, "could not terminate status line");
        }
        warn!(error = %err, seconds = self.elapsed, "status output failed, stopping");
        MetatronError::Output(err)
    }

    /// Drive the loop until cancelled or the duration limit is reached.
    ///
    /// Emits one status line per completed window, then calls
    /// [`StatusSink::finish`] exactly once, also when a status write fails.
    pub fn run<S: StatusSink>(&mut self, mut sink: S, cancel: &AtomicBool) -> Result<RunSummary, MetatronError> {
        if cancel.load(Ordering::Relaxed) {
            self.state = LoopState::Cancelled(EndReason::Interrupted);
        }

        while self.state == LoopState::Running {
            let (raw, cut_short) = self.run_window(cancel);
            let window = window_total(raw, self.prepared.multiplier, self.prepared.hash_multiplier);
            self.total_iterations += &window;

            if cut_short {
                debug!(raw, "window cut short by cancellation");
                self.state = LoopState::Cancelled(EndReason::Interrupted);
                break;
            }

            self.elapsed += 1;
            self.total_freq = window;
            if let Err(err) = sink.update(&self.status_line()) {
                return Err(self.abort(&mut sink, err));
            }

            if self.duration.as_ref().is_some_and(|d| d.is_reached_at(self.elapsed)) {
                self.state = LoopState::Cancelled(EndReason::DurationReached);
            } else if cancel.load(Ordering::Relaxed) {
                self.state = LoopState::Cancelled(EndReason::Interrupted);
            }
        }

        let end = match self.state {
            LoopState::Cancelled(reason) | LoopState::Stopped(reason) => reason,
            LoopState::Running => EndReason::Interrupted,
        };
        self.state = LoopState::Stopped(end);
        sink.finish().map_err(MetatronError::Output)?;
        info!(
            seconds = self.elapsed,
            total = %self.total_iterations,
            reason = ?end,
            "repetition stopped"
        );

        Ok(RunSummary {
            seconds: self.elapsed,
            total_iterations: self.total_iterations.clone(),
            last_frequency: self.total_freq.clone(),
            end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Advances by `step` on every call.
    struct StepClock {
        base: Instant,
        step: Duration,
        ticks: Cell<u32>,
    }

    impl StepClock {
        fn millis(step: u64) -> Self {
            Self {
                base: Instant::now(),
                step: Duration::from_millis(step),
                ticks: Cell::new(0),
            }
        }
    }

    impl Clock for StepClock {
        fn now(&self) -> Instant {
            let t = self.ticks.get();
            self.ticks.set(t + 1);
            self.base + self.step * t
        }
    }

    #[derive(Default)]
    struct Recorder {
        lines: Vec<StatusLine>,
        finished: u32,
    }

    impl StatusSink for Recorder {
        fn update(&mut self, line: &StatusLine) -> io::Result<()> {
            self.lines.push(line.clone());
            Ok(())
        }

        fn finish(&mut self) -> io::Result<()> {
            self.finished += 1;
            Ok(())
        }
    }

    fn config(duration: &str) -> RunConfig {
        RunConfig {
            payload: b"test".to_vec(),
            label: "test".to_string(),
            target_bytes: 16,
            duration: Some(duration.parse().unwrap()),
            ..RunConfig::default()
        }
    }

    // --- prepare ---

    #[test]
    fn prepare_rejects_empty_payload() {
        let cfg = RunConfig::default();
        assert!(matches!(
            prepare(&cfg),
            Err(MetatronError::Config(metatron_core::error::ConfigError::EmptyPayload))
        ));
    }

    #[test]
    fn prepare_without_preprocessing_keeps_allocation() {
        let p = prepare(&config("00:00:01")).unwrap();
        assert_eq!(p.multiplier, 4);
        assert_eq!(p.hash_multiplier, 1);
        assert_eq!(p.buffer_len, 16);
        assert_eq!(p.graph.data(0), b"testtestt");
    }

    #[test]
    fn prepare_with_digest_loads_hex() {
        let cfg = RunConfig {
            digest: true,
            target_bytes: 128,
            ..config("00:00:01")
        };
        let p = prepare(&cfg).unwrap();
        assert_eq!(p.multiplier, 32);
        assert_eq!(p.hash_multiplier, 2);
        assert_eq!(p.buffer_len, 128);
        assert!(p.graph.data(0).iter().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn prepare_with_compression_reloads_graph() {
        let cfg = RunConfig {
            compress: true,
            target_bytes: 4096,
            ..config("00:00:01")
        };
        let p = prepare(&cfg).unwrap();
        assert!(p.buffer_len < 4096);
        assert_eq!(p.graph.total_bytes(), p.buffer_len);
    }

    #[test]
    fn prepare_disabled_budget_still_loads_graph() {
        let cfg = RunConfig {
            target_bytes: 0,
            ..config("00:00:01")
        };
        let p = prepare(&cfg).unwrap();
        assert_eq!(p.multiplier, 1);
        assert_eq!(p.graph.total_bytes(), 4);
    }

    // --- window_total ---

    #[test]
    fn window_total_multiplies_through() {
        assert_eq!(window_total(13_000, 4, 2).as_str(), "104000");
        assert!(window_total(0, 4, 2).is_zero());
    }

    // --- run ---

    #[test]
    fn duration_two_reports_exactly_two_seconds() {
        let mut session = Session::new(&config("00:00:02"), StepClock::millis(1)).unwrap();
        let mut rec = Recorder::default();
        let cancel = AtomicBool::new(false);
        let summary = session.run(&mut rec, &cancel).unwrap();

        assert_eq!(summary.seconds, 2);
        assert_eq!(summary.end, EndReason::DurationReached);
        assert_eq!(rec.lines.len(), 2);
        assert_eq!(rec.lines[0].elapsed, "00:00:01");
        assert_eq!(rec.lines[1].elapsed, "00:00:02");
        assert_eq!(rec.finished, 1);
        assert_eq!(session.state(), LoopState::Stopped(EndReason::DurationReached));
    }

    #[test]
    fn window_counts_are_deterministic_with_step_clock() {
        // 1 ms steps: the window end is read once, then 999 reads fall inside it.
        let mut session = Session::new(&config("00:00:02"), StepClock::millis(1)).unwrap();
        let cancel = AtomicBool::new(false);
        let summary = session.run(Recorder::default(), &cancel).unwrap();

        let per_window = window_total(999 * 13, 4, 1);
        assert_eq!(summary.last_frequency, per_window);
        assert_eq!(summary.total_iterations, &per_window + &per_window);
    }

    #[test]
    fn status_line_uses_label_and_scaling() {
        let mut session = Session::new(&config("00:00:01"), StepClock::millis(1)).unwrap();
        let mut rec = Recorder::default();
        session.run(&mut rec, &AtomicBool::new(false)).unwrap();
        // 999 * 13 * 4 = 51948
        assert_eq!(rec.lines[0].iterations, "51.948k");
        assert_eq!(rec.lines[0].frequency, "51.948k");
        assert_eq!(rec.lines[0].label, "test");
    }

    #[test]
    fn pre_raised_cancel_stops_without_windows() {
        let mut session = Session::new(&config("00:00:05"), StepClock::millis(1)).unwrap();
        let mut rec = Recorder::default();
        let summary = session.run(&mut rec, &AtomicBool::new(true)).unwrap();
        assert_eq!(summary.seconds, 0);
        assert!(summary.total_iterations.is_zero());
        assert_eq!(summary.end, EndReason::Interrupted);
        assert!(rec.lines.is_empty());
        assert_eq!(rec.finished, 1);
    }

    /// Raises the flag once `after` status lines have been recorded.
    struct CancelAfter<'a> {
        inner: Recorder,
        after: usize,
        flag: &'a AtomicBool,
    }

    impl StatusSink for CancelAfter<'_> {
        fn update(&mut self, line: &StatusLine) -> io::Result<()> {
            self.inner.update(line)?;
            if self.inner.lines.len() >= self.after {
                self.flag.store(true, Ordering::Relaxed);
            }
            Ok(())
        }

        fn finish(&mut self) -> io::Result<()> {
            self.inner.finish()
        }
    }

    #[test]
    fn cancellation_at_window_boundary() {
        let cfg = RunConfig {
            duration: None,
            ..config("00:00:01")
        };
        let mut session = Session::new(&cfg, StepClock::millis(1)).unwrap();
        let cancel = AtomicBool::new(false);
        let mut sink = CancelAfter {
            inner: Recorder::default(),
            after: 3,
            flag: &cancel,
        };
        let summary = session.run(&mut sink, &cancel).unwrap();
        assert_eq!(summary.seconds, 3);
        assert_eq!(summary.end, EndReason::Interrupted);
        assert_eq!(sink.inner.lines.len(), 3);
    }

    /// Raises `flag` on the `at`-th read.
    struct CancellingClock<'a> {
        inner: StepClock,
        at: u32,
        flag: &'a AtomicBool,
    }

    impl Clock for CancellingClock<'_> {
        fn now(&self) -> Instant {
            if self.inner.ticks.get() == self.at {
                self.flag.store(true, Ordering::Relaxed);
            }
            self.inner.now()
        }
    }

    #[test]
    fn cancellation_inside_window_folds_but_does_not_report() {
        let cfg = RunConfig {
            duration: None,
            ..config("00:00:01")
        };
        let cancel = AtomicBool::new(false);
        // Window 1 spans reads 0..=1000, window 2 starts at read 1001 with
        // an end at 2001 ms. The flag rises at read 1500, after 499 passes.
        let clock = CancellingClock {
            inner: StepClock::millis(1),
            at: 1500,
            flag: &cancel,
        };
        let mut session = Session::new(&cfg, clock).unwrap();
        let mut rec = Recorder::default();
        let summary = session.run(&mut rec, &cancel).unwrap();

        assert_eq!(rec.lines.len(), 1);
        assert_eq!(rec.finished, 1);
        assert_eq!(summary.seconds, 1);
        assert_eq!(summary.end, EndReason::Interrupted);
        assert_eq!(summary.last_frequency, window_total(999 * 13, 4, 1));
        assert_eq!(summary.total_iterations, window_total((999 + 499) * 13, 4, 1));
        assert_eq!(summary.total_iterations.as_str(), "77896");
        assert_eq!(rec.lines[0].iterations, "51.948k");
        assert_eq!(session.state(), LoopState::Stopped(EndReason::Interrupted));
    }

    /// Fails the `fail_at`-th update (1-based).
    #[derive(Default)]
    struct FlakySink {
        inner: Recorder,
        fail_at: usize,
        updates: usize,
    }

    impl StatusSink for FlakySink {
        fn update(&mut self, line: &StatusLine) -> io::Result<()> {
            self.updates += 1;
            if self.updates == self.fail_at {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            self.inner.update(line)
        }

        fn finish(&mut self) -> io::Result<()> {
            self.inner.finish()
        }
    }

    #[test]
    fn failed_write_still_finishes_and_stops() {
        let mut session = Session::new(&config("00:00:05"), StepClock::millis(1)).unwrap();
        let mut sink = FlakySink {
            fail_at: 2,
            ..FlakySink::default()
        };
        let err = session.run(&mut sink, &AtomicBool::new(false)).unwrap_err();

        assert!(matches!(err, MetatronError::Output(_)));
        assert_eq!(sink.inner.lines.len(), 1);
        assert_eq!(sink.inner.finished, 1);
        assert_eq!(session.state(), LoopState::Stopped(EndReason::OutputFailed));
    }

    #[test]
    fn terminal_sink_overwrites_then_newlines() {
        let mut sink = TerminalSink::new(Vec::new());
        let line = StatusLine {
            elapsed: "00:00:01".into(),
            iterations: "1.000k".into(),
            frequency: "1.000k".into(),
            label: "x".into(),
        };
        sink.loading().unwrap();
        sink.update(&line).unwrap();
        sink.finish().unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert!(out.starts_with("Loading...          \r"));
        assert!(out.ends_with("x     \r\n"));
    }
}
