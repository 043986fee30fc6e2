//! Optional preprocessing of the allocated buffer.
//!
//! Two independent stages, always applied in this order when enabled:
//! 1. **Digest**: the buffer is replaced by its SHA-256 hex digest, repeated
//!    until it covers the byte budget again. The number of copies becomes
//!    the run's hash multiplier.
//! 2. **Compression**: the buffer is replaced by its zlib-deflated form.
//!    An encoder failure is fatal for the run; the stage never falls back
//!    to the uncompressed bytes.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use metatron_core::error::PreprocessError;
use metatron_core::partition::expand;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Which stages to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Preprocess {
    pub digest: bool,
    pub compress: bool,
}

/// Output of [`Preprocess::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preprocessed {
    pub buffer: Vec<u8>,
    /// Digest copies needed to refill the budget; 1 when the digest stage
    /// is off or the budget is disabled.
    pub hash_multiplier: u64,
}

/// Lowercase hex SHA-256 of `data` (64 ASCII bytes).
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Digest `buffer` and re-expand the digest to `target_bytes`.
///
/// With `target_bytes == 0` the bare digest is returned with a multiplier
/// of 1. Otherwise whole digest copies are concatenated, so the result may
/// exceed the target by less than one digest length.
pub fn digest_expand(buffer: &[u8], target_bytes: usize) -> (Vec<u8>, u64) {
    let digest = sha256_hex(buffer);
    if target_bytes == 0 {
        return (digest.into_bytes(), 1);
    }
    expand(digest.as_bytes(), target_bytes)
}

/// Deflate `buffer` with a zlib wrapper at the default level.
pub fn compress(buffer: &[u8]) -> Result<Vec<u8>, PreprocessError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(buffer)
        .map_err(|e| PreprocessError::Compression(e.to_string()))?;
    let out = encoder
        .finish()
        .map_err(|e| PreprocessError::Compression(e.to_string()))?;
    if out.is_empty() {
        return Err(PreprocessError::EmptyOutput);
    }
    Ok(out)
}

impl Preprocess {
    pub fn is_noop(&self) -> bool {
        !self.digest && !self.compress
    }

    /// Run the enabled stages over `buffer`.
    pub fn apply(&self, buffer: Vec<u8>, target_bytes: usize) -> Result<Preprocessed, PreprocessError> {
        let mut buffer = buffer;
        let mut hash_multiplier = 1;

        if self.digest {
            let (hashed, copies) = digest_expand(&buffer, target_bytes);
            debug!(copies, bytes = hashed.len(), "digest stage applied");
            buffer = hashed;
            hash_multiplier = copies;
        }

        if self.compress {
            let before = buffer.len();
            buffer = compress(&buffer)?;
            debug!(before, after = buffer.len(), "compression stage applied");
        }

        Ok(Preprocessed {
            buffer,
            hash_multiplier,
        })
    }
}
