//! Assembly of the repeated payload from an intention and optional files.
//!
//! Each source is first balanced against the longest one: its own content
//! is repeated while one more copy would still leave it shorter than the
//! longest source. The balanced sources are then joined in the order
//! intention, first file, second file.

use std::path::{Path, PathBuf};

use metatron_core::error::MetatronError;
use tracing::debug;

/// File contents tagged with the path they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

/// The assembled bytes and the label shown on the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub bytes: Vec<u8>,
    pub label: String,
}

/// Read `path` as raw bytes, dropping every NUL byte.
pub fn read_payload_file(path: &Path) -> Result<FilePayload, MetatronError> {
    let raw = std::fs::read(path).map_err(|source| MetatronError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let contents: Vec<u8> = raw.into_iter().filter(|&b| b != 0).collect();
    debug!(path = %path.display(), bytes = contents.len(), "read payload file");
    Ok(FilePayload {
        path: path.to_path_buf(),
        contents,
    })
}

/// Copies of a source of length `len` after balancing against `longest`.
///
/// Largest `c >= 1` such that appending one more copy would not keep the
/// source strictly shorter than `longest`.
fn balanced_copies(len: usize, longest: usize) -> usize {
    if len == 0 {
        return 0;
    }
    longest.div_ceil(len).saturating_sub(1).max(1)
}

/// Combine the intention and file sources into one payload.
///
/// An empty intention contributes neither bytes nor label text.
pub fn assemble(intention: Option<&str>, files: &[FilePayload]) -> Payload {
    let intention = intention.filter(|s| !s.is_empty());
    let longest = intention
        .map(str::len)
        .into_iter()
        .chain(files.iter().map(|f| f.contents.len()))
        .max()
        .unwrap_or(0);

    let mut bytes = Vec::new();
    let mut label = String::new();

    if let Some(text) = intention {
        bytes.extend(text.as_bytes().repeat(balanced_copies(text.len(), longest)));
        label.push_str(text);
    }
    for file in files {
        let copies = balanced_copies(file.contents.len(), longest);
        bytes.extend(file.contents.repeat(copies));
        label.push_str(&format!("({})", file.path.display()));
    }

    Payload { bytes, label }
}
