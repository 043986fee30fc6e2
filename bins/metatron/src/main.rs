//! Metatron repeater binary.
//!
//! Expands an intention (and/or file contents) to fill a memory budget,
//! spreads it across Metatron's Cube and repeats it until interrupted or
//! until the optional duration elapses, printing a live status line.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use metatron_core::constants::DEFAULT_MEMORY_GB;
use metatron_core::{DisplayMode, DurationLimit};
use metatron_engine::config::parse_toggle;
use metatron_engine::{
    assemble, memory_budget_bytes, read_payload_file, RunConfig, Session, SystemClock,
    TerminalSink,
};
use tracing::{info, warn};

/// Status line number style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Suffix {
    /// Scaled with unit letters, e.g. 1.234M.
    Hz,
    /// Scientific, e.g. 1.234x10^6.
    Exp,
}

impl From<Suffix> for DisplayMode {
    fn from(s: Suffix) -> Self {
        match s {
            Suffix::Hz => DisplayMode::Suffix,
            Suffix::Exp => DisplayMode::Exponent,
        }
    }
}

/// Repeats an intention millions of times per second in memory.
#[derive(Parser, Debug)]
#[command(
    name = "metatron",
    version,
    about = "Repeats an intention across Metatron's Cube in memory",
    long_about = None
)]
struct Args {
    /// The intention to repeat.
    #[arg(short = 'i', long = "intent")]
    intent: Option<String>,

    /// GiB of RAM to use (half is filled with the expanded payload); 0 disables expansion.
    #[arg(short = 'm', long = "imem", default_value_t = DEFAULT_MEMORY_GB)]
    imem: u64,

    /// Running duration as HH:MM:SS. Runs until Ctrl+C when omitted.
    #[arg(short = 'd', long = "dur")]
    dur: Option<String>,

    /// Use hashing (y/N).
    #[arg(short = 'H', long = "hashing", default_value = "n")]
    hashing: String,

    /// Use compression (y/N).
    #[arg(short = 'c', long = "compress", default_value = "n")]
    compress: String,

    /// File to read intentions from.
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Second file to read intentions from.
    #[arg(short = 'F', long = "file2")]
    file2: Option<PathBuf>,

    /// Number display style.
    #[arg(long, value_enum, default_value_t = Suffix::Hz)]
    suffix: Suffix,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Log output format ("text" or "json").
    #[arg(long, default_value = "text")]
    log_format: String,
}

impl Args {
    /// Read the payload sources and convert CLI args into a RunConfig.
    fn into_config(self) -> Result<RunConfig> {
        let mut files = Vec::new();
        for path in [self.file, self.file2].into_iter().flatten() {
            files.push(read_payload_file(&path)?);
        }
        if self.intent.as_deref().is_none_or(str::is_empty) && files.is_empty() {
            bail!("nothing to repeat: pass --intent or --file");
        }
        let payload = assemble(self.intent.as_deref(), &files);

        let duration = self
            .dur
            .map(|d| d.parse::<DurationLimit>())
            .transpose()
            .context("invalid --dur")?;

        let config = RunConfig {
            payload: payload.bytes,
            label: payload.label,
            target_bytes: memory_budget_bytes(self.imem)?,
            digest: parse_toggle(&self.hashing),
            compress: parse_toggle(&self.compress),
            duration,
            display: self.suffix.into(),
        };
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, &args.log_format);

    println!("Metatron v{}", env!("CARGO_PKG_VERSION"));
    println!();

    let config = args.into_config()?;
    info!(
        bytes = config.payload.len(),
        target_bytes = config.target_bytes,
        digest = config.digest,
        compress = config.compress,
        duration = ?config.duration.as_ref().map(DurationLimit::as_str),
        "configuration loaded"
    );

    // Set up signal handler for graceful shutdown.
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_clone = Arc::clone(&cancel);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        warn!("received SIGINT, shutting down...");
        cancel_clone.store(true, Ordering::Relaxed);
    });

    // The loop busy-polls the clock; keep it off the async workers.
    let summary = tokio::task::spawn_blocking(move || -> Result<_> {
        let mut sink = TerminalSink::new(io::stdout().lock());
        sink.loading().context("failed to write status")?;

        let mut session = Session::new(&config, SystemClock)?;
        let prepared = session.prepared();
        info!(
            multiplier = prepared.multiplier,
            hash_multiplier = prepared.hash_multiplier,
            loaded_bytes = prepared.buffer_len,
            "graph ready"
        );

        Ok(session.run(&mut sink, &cancel)?)
    })
    .await
    .context("repetition task panicked")??;

    info!(
        seconds = summary.seconds,
        total_iterations = %summary.total_iterations,
        last_frequency = %summary.last_frequency,
        end = ?summary.end,
        "metatron shutdown complete"
    );
    Ok(())
}

/// Initialize tracing subscriber with the given log level and output format.
///
/// Logs are written to stderr so they do not break the live status line on
/// stdout. Pass `format = "json"` for structured JSON output.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true).with_writer(io::stderr))
            .init();
    }
}
