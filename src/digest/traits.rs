//! Digest trait definition

use std::fmt::Debug;

/// A fixed-width hash function over byte slices
///
/// Implementations are zero-sized markers; the tree types carry them as a
/// type parameter so the output width is known statically.
pub trait Digest: Clone + Copy + Debug + Default + PartialEq + Eq + Send + Sync + 'static {
    /// Raw digest bytes, exactly [`Digest::WIDTH`] long
    type Output: AsRef<[u8]> + AsMut<[u8]> + Copy + Default + Eq + Debug + Send + Sync + 'static;

    /// Output width in bytes
    const WIDTH: usize;

    /// Short identifier used in config files and CLI output
    const NAME: &'static str;

    /// Hash the given data
    fn digest(data: &[u8]) -> Self::Output;

    /// Width of one serialized record: two digests side by side
    fn record_width() -> usize {
        2 * Self::WIDTH
    }

    /// Copy the first `WIDTH` bytes of `bytes` into an output value.
    /// Missing bytes are left zero.
    fn output_from_prefix(bytes: &[u8]) -> Self::Output {
        let mut out = Self::Output::default();
        let n = bytes.len().min(Self::WIDTH);
        out.as_mut()[..n].copy_from_slice(&bytes[..n]);
        out
    }
}

/// Concatenate two hashes into a `2 * WIDTH` preimage.
///
/// Each half is zero-padded when the input is shorter than `WIDTH`.
pub fn concat<D: Digest>(left: &[u8], right: &[u8]) -> Vec<u8> {
    let mut buf = vec![0u8; D::record_width()];
    write_halves::<D>(&mut buf, left, right);
    buf
}

/// Overwrite an existing preimage buffer in place
pub(crate) fn write_halves<D: Digest>(buf: &mut [u8], left: &[u8], right: &[u8]) {
    let (l, r) = buf.split_at_mut(D::WIDTH);
    l.fill(0);
    r.fill(0);
    let nl = left.len().min(D::WIDTH);
    let nr = right.len().min(D::WIDTH);
    l[..nl].copy_from_slice(&left[..nl]);
    r[..nr].copy_from_slice(&right[..nr]);
}

/// Convert digest bytes to a hex string
pub fn to_hex(bytes: impl AsRef<[u8]>) -> String {
    hex::encode(bytes)
}
