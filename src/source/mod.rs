//! Chunk sources
//!
//! Fixed-size chunking of sequential readers, plus byte-range reads used to
//! serve raw chunks back to a verifier.

mod chunker;
mod range;

pub use chunker::{chunk_count, ChunkReader};
pub use range::{read_range, ByteRange};
