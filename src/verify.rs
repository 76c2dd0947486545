//! Checking data against a published tree

use crate::bulk;
use crate::codec;
use crate::config::{BuildMode, TreeConfig};
use crate::digest::{to_hex, Digest};
use crate::tree::{IncrementalTree, Tree};
use crate::{Error, Result};
use indicatif::ProgressBar;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;

/// Outcome of comparing a file against a serialized tree
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Verification {
    /// Root hash of the serialized tree, hex
    pub expected: String,
    /// Root hash computed from the file, hex
    pub actual: String,
    /// Number of chunks hashed from the file
    pub chunks: usize,
    pub matches: bool,
}

/// Hash a file with the configured build mode.
///
/// `progress` is sized to the file length and advanced by bytes read; pass
/// [`ProgressBar::hidden`] to hash silently.
pub fn build_file<D: Digest>(
    path: impl AsRef<Path>,
    config: &TreeConfig,
    progress: &ProgressBar,
) -> Result<Tree<D>> {
    config.validate()?;
    let started = Instant::now();
    let tree = match config.mode {
        BuildMode::Bulk => bulk::hash_file::<D>(path.as_ref(), config, progress)?,
        BuildMode::Incremental => {
            let file = File::open(path.as_ref())?;
            progress.set_length(file.metadata()?.len());
            IncrementalTree::<D>::from_reader_with_progress(
                BufReader::new(file),
                config.chunk_size,
                progress,
            )?
            .into_tree()
        }
    };
    progress.finish();
    log::info!(
        "Finished file hash in {:.2?}: {} into {} leaves ({}, {})",
        started.elapsed(),
        path.as_ref().display(),
        tree.leaf_count(),
        config.mode,
        D::NAME
    );
    Ok(tree)
}

/// Rebuild the tree for `path` and compare its root with `serialized`
pub fn verify_file<D: Digest>(
    path: impl AsRef<Path>,
    serialized: &[u8],
    config: &TreeConfig,
    progress: &ProgressBar,
) -> Result<Verification> {
    let published = codec::deserialize::<D>(serialized)?;
    let expected = published
        .root_hash()
        .ok_or_else(|| Error::Format("serialized tree has no root".into()))?;

    let tree = build_file::<D>(path, config, progress)?;
    let chunks = tree.leaf_count();
    let actual = tree.root_hash();

    let matches = actual == Some(expected);
    if !matches {
        log::warn!("root hash mismatch for {} chunks", chunks);
    }
    Ok(Verification {
        expected: to_hex(expected),
        actual: actual.map(to_hex).unwrap_or_default(),
        chunks,
        matches,
    })
}
