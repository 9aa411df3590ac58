//! Streaming file digests.
//!
//! # Overview
//! This module provides the [`Hasher`] struct for computing 256-bit content
//! digests. Files are read to completion through a fixed-size buffer, so
//! memory use does not depend on file size. BLAKE3 is the default; SHA-256
//! is available for reports that have to line up with `sha256sum`.

use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use sha2::Digest as _;

use super::HashError;

/// Fixed-length content digest. Both algorithms produce 32 bytes.
pub type Digest = [u8; 32];

/// Read buffer size used while streaming file contents.
pub const BUFFER_SIZE: usize = 64 * 1024;

/// Content digest algorithm.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// BLAKE3 (fast, default)
    #[default]
    Blake3,
    /// SHA-256
    Sha256,
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blake3 => write!(f, "blake3"),
            Self::Sha256 => write!(f, "sha256"),
        }
    }
}

/// Computes content digests for files and arbitrary byte streams.
///
/// `Hasher` holds no state between calls and is cheap to copy, so every
/// worker can use the same instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hasher {
    algorithm: DigestAlgorithm,
}

impl Hasher {
    /// Create a hasher using the default algorithm (BLAKE3).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hasher for a specific algorithm.
    #[must_use]
    pub fn with_algorithm(algorithm: DigestAlgorithm) -> Self {
        Self { algorithm }
    }

    /// The algorithm this hasher uses.
    #[must_use]
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Digest a byte stream, consuming it to the end.
    ///
    /// # Errors
    ///
    /// Returns the first read error. No partial digest is produced.
    pub fn digest_reader<R: Read>(&self, reader: R) -> io::Result<Digest> {
        match self.algorithm {
            DigestAlgorithm::Blake3 => {
                let mut hasher = blake3::Hasher::new();
                stream_into(reader, |chunk| {
                    hasher.update(chunk);
                })?;
                Ok(*hasher.finalize().as_bytes())
            }
            DigestAlgorithm::Sha256 => {
                let mut hasher = sha2::Sha256::new();
                stream_into(reader, |chunk| hasher.update(chunk))?;
                let mut digest = [0u8; 32];
                digest.copy_from_slice(&hasher.finalize());
                Ok(digest)
            }
        }
    }

    /// Open a file and digest its full contents.
    ///
    /// The file handle is closed before this returns, on success and on error.
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] tagged with `path` if the file cannot be
    /// opened or a read fails partway through.
    pub fn digest_file(&self, path: &Path) -> Result<Digest, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let digest = self
            .digest_reader(file)
            .map_err(|e| HashError::from_io(path, e))?;
        log::trace!("{} {}", digest_to_hex(&digest), path.display());
        Ok(digest)
    }
}

/// Feed a reader into `sink` chunk by chunk until EOF.
fn stream_into<R: Read>(mut reader: R, mut sink: impl FnMut(&[u8])) -> io::Result<()> {
    let mut buffer = vec![0u8; BUFFER_SIZE];
    loop {
        match reader.read(&mut buffer) {
            Ok(0) => return Ok(()),
            Ok(n) => sink(&buffer[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Render a digest as lowercase hex.
#[must_use]
pub fn digest_to_hex(digest: &Digest) -> String {
    use std::fmt::Write;

    digest.iter().fold(String::with_capacity(64), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}
