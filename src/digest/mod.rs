//! Pluggable digest functions
//!
//! Every tree component is generic over a [`Digest`]. Swapping the digest
//! only changes the width of leaf hashes and of serialized records.

mod hashers;
mod traits;

pub use hashers::{Blake3Digest, Sha256Digest, Xxh3Digest};
pub use traits::{concat, to_hex, Digest};
pub(crate) use traits::write_halves;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Digest used when none is configured (matches the reference hashes)
pub type DefaultDigest = Sha256Digest;

/// Runtime selector for the available digests
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestKind {
    #[default]
    Sha256,
    Blake3,
    Xxh3,
}

impl DigestKind {
    /// Output width in bytes
    pub fn width(&self) -> usize {
        match self {
            DigestKind::Sha256 => Sha256Digest::WIDTH,
            DigestKind::Blake3 => Blake3Digest::WIDTH,
            DigestKind::Xxh3 => Xxh3Digest::WIDTH,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DigestKind::Sha256 => Sha256Digest::NAME,
            DigestKind::Blake3 => Blake3Digest::NAME,
            DigestKind::Xxh3 => Xxh3Digest::NAME,
        }
    }
}

impl fmt::Display for DigestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" => Ok(DigestKind::Sha256),
            "blake3" => Ok(DigestKind::Blake3),
            "xxh3" => Ok(DigestKind::Xxh3),
            other => Err(crate::Error::Config(format!("Unknown digest: {}", other))),
        }
    }
}
