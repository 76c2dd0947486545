//! Append-only tree grown one leaf at a time

use super::{Node, Tree};
use crate::digest::{DefaultDigest, Digest};
use crate::source::ChunkReader;
use crate::Result;
use indicatif::ProgressBar;
use std::io::Read;

/// A hash tree that accepts leaves in order.
///
/// Each new leaf is paired with the first perfect subtree found walking down
/// the right spine, much like incrementing a binary counter. Everything left
/// of the spine is frozen, so the tree after `k` insertions survives intact
/// inside every later tree and the root only depends on the leaf sequence.
///
/// Not synchronized: one writer at a time.
#[derive(Clone, Debug, Default)]
pub struct IncrementalTree<D: Digest = DefaultDigest> {
    tree: Tree<D>,
    leaves: usize,
}

impl<D: Digest> IncrementalTree<D> {
    /// Create an empty tree
    pub fn new() -> Self {
        IncrementalTree {
            tree: Tree::empty(),
            leaves: 0,
        }
    }

    /// Hash a chunk and append it as the next leaf
    pub fn insert(&mut self, chunk: &[u8]) {
        self.insert_digest(D::digest(chunk));
    }

    /// Append an already computed leaf digest
    pub fn insert_digest(&mut self, digest: D::Output) {
        let root = match self.tree.root.take() {
            None => Box::new(Node::leaf(digest)),
            Some(root) => root.add(digest),
        };
        self.tree.root = Some(root);
        self.leaves += 1;
    }

    /// Build a tree from every chunk of `reader`.
    ///
    /// Chunks follow the [`ChunkReader`] rules: fixed size, final chunk
    /// zero-padded, no empty trailing chunk. Any read error aborts the build.
    pub fn from_reader<R: Read>(reader: R, chunk_size: usize) -> Result<Self> {
        Self::from_reader_with_progress(reader, chunk_size, &ProgressBar::hidden())
    }

    /// Like [`IncrementalTree::from_reader`], moving `progress` to the number
    /// of source bytes consumed after every chunk
    pub fn from_reader_with_progress<R: Read>(
        reader: R,
        chunk_size: usize,
        progress: &ProgressBar,
    ) -> Result<Self> {
        let mut tree = Self::new();
        let mut chunks = ChunkReader::new(reader, chunk_size)?;
        while let Some(chunk) = chunks.next() {
            tree.insert(&chunk?);
            progress.set_position(chunks.bytes_read());
        }
        log::debug!(
            "incremental tree built from {} chunks ({} bytes)",
            tree.leaves,
            chunks.bytes_read()
        );
        Ok(tree)
    }

    pub fn root_hash(&self) -> Option<D::Output> {
        self.tree.root_hash()
    }

    /// Number of leaves inserted so far
    pub fn len(&self) -> usize {
        self.leaves
    }

    pub fn is_empty(&self) -> bool {
        self.leaves == 0
    }

    pub fn tree(&self) -> &Tree<D> {
        &self.tree
    }

    pub fn into_tree(self) -> Tree<D> {
        self.tree
    }
}
