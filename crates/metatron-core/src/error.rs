//! Error types for the Metatron repeater.
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("payload is empty: give an intention or a non-empty file")] EmptyPayload,
    #[error("invalid duration {0:?}: expected HH:MM:SS")] InvalidDuration(String),
    #[error("memory budget of {gigabytes} GiB overflows the address space")] MemoryOverflow { gigabytes: u64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BignumError {
    #[error("empty digit string")] Empty,
    #[error("invalid digit {found:?} at index {index}")] InvalidDigit { index: usize, found: char },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreprocessError {
    #[error("compression failed: {0}")] Compression(String),
    #[error("compression produced no output")] EmptyOutput,
}

#[derive(Error, Debug)]
pub enum MetatronError {
    #[error(transparent)] Config(#[from] ConfigError),
    #[error(transparent)] Preprocess(#[from] PreprocessError),
    #[error("cannot read {path:?}: {source}")] Io { path: PathBuf, source: std::io::Error },
    #[error("status output: {0}")] Output(#[source] std::io::Error),
}
