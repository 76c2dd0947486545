//! Bulk tree construction
//!
//! Chunks are hashed in parallel into a preallocated [`LeafArray`] by a
//! [`ConcurrentLeafHasher`]; once every worker has finished, the array is
//! reduced bottom-up by [`BulkBuilder`].

mod builder;
mod hasher;

pub use builder::BulkBuilder;
pub use hasher::{ConcurrentLeafHasher, LeafArray, Submitter};

use crate::config::TreeConfig;
use crate::digest::Digest;
use crate::source::{chunk_count, ChunkReader};
use crate::tree::Tree;
use crate::Result;
use indicatif::ProgressBar;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Hash every chunk of `reader` in parallel and build the tree.
///
/// `expected_chunks` sizes the leaf array up front; a reader producing more
/// chunks than that fails with [`crate::Error::CapacityExceeded`].
/// `progress` follows the number of source bytes handed to the workers.
pub fn hash_reader<D: Digest, R: Read>(
    reader: R,
    chunk_size: usize,
    expected_chunks: usize,
    hasher: &ConcurrentLeafHasher,
    progress: &ProgressBar,
) -> Result<Tree<D>> {
    let mut chunks = ChunkReader::new(reader, chunk_size)?;
    let mut leaves = LeafArray::<D>::with_len(expected_chunks);

    hasher.run(&mut leaves, |submitter| {
        while let Some(chunk) = chunks.next() {
            submitter.submit(chunk?)?;
            progress.set_position(chunks.bytes_read());
        }
        Ok(())
    })?;

    Ok(BulkBuilder::build(leaves))
}

/// Hash an in-memory buffer in parallel
pub fn hash_bytes<D: Digest>(data: &[u8], config: &TreeConfig) -> Result<Tree<D>> {
    config.validate()?;
    let expected = chunk_count(data.len() as u64, config.chunk_size);
    hash_reader(
        data,
        config.chunk_size,
        expected,
        &ConcurrentLeafHasher::from_config(config),
        &ProgressBar::hidden(),
    )
}

/// Hash a file in parallel, sizing the leaf array and `progress` from the
/// file length
pub fn hash_file<D: Digest>(
    path: impl AsRef<Path>,
    config: &TreeConfig,
    progress: &ProgressBar,
) -> Result<Tree<D>> {
    config.validate()?;
    let file = File::open(path.as_ref())?;
    let size = file.metadata()?.len();
    let expected = chunk_count(size, config.chunk_size);
    progress.set_length(size);
    log::debug!(
        "bulk hashing {} ({} bytes, {} chunks)",
        path.as_ref().display(),
        size,
        expected
    );

    hash_reader(
        BufReader::new(file),
        config.chunk_size,
        expected,
        &ConcurrentLeafHasher::from_config(config),
        progress,
    )
}
