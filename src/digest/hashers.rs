//! Concrete digest implementations

use super::Digest;

/// SHA-256, 32-byte output
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sha256Digest;

impl Digest for Sha256Digest {
    type Output = [u8; 32];
    const WIDTH: usize = 32;
    const NAME: &'static str = "sha256";

    fn digest(data: &[u8]) -> [u8; 32] {
        use sha2::Digest as _;
        sha2::Sha256::digest(data).into()
    }
}

/// BLAKE3, 32-byte output
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Blake3Digest;

impl Digest for Blake3Digest {
    type Output = [u8; 32];
    const WIDTH: usize = 32;
    const NAME: &'static str = "blake3";

    fn digest(data: &[u8]) -> [u8; 32] {
        *blake3::hash(data).as_bytes()
    }
}

/// XXH3-64, 8-byte output.
///
/// Not collision resistant. Only useful where throughput matters more than
/// authentication, e.g. change detection between trusted peers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Xxh3Digest;

impl Digest for Xxh3Digest {
    type Output = [u8; 8];
    const WIDTH: usize = 8;
    const NAME: &'static str = "xxh3";

    fn digest(data: &[u8]) -> [u8; 8] {
        xxhash_rust::xxh3::xxh3_64(data).to_be_bytes()
    }
}
