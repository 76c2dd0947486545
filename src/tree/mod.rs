//! Merkle tree over an ordered sequence of chunks
//!
//! This implements a binary hash tree where:
//! - Leaves hold the digest of one input chunk
//! - Internal nodes hold the concatenation of their children's hashes
//! - The root hash commits to every chunk and to their order
//!
//! Trees are grown one leaf at a time with [`IncrementalTree`] or reduced
//! from a prepared leaf array with [`crate::bulk::BulkBuilder`]. Both yield
//! a [`Tree`].

mod incremental;
mod node;

pub use incremental::IncrementalTree;
pub use node::{Node, Payload};

use crate::digest::{DefaultDigest, Digest};
use std::fmt;

/// A finished hash tree
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tree<D: Digest = DefaultDigest> {
    root: Option<Box<Node<D>>>,
}

impl<D: Digest> Tree<D> {
    /// Create an empty tree
    pub fn empty() -> Self {
        Tree { root: None }
    }

    /// Create a tree with the given root
    pub fn new(root: Node<D>) -> Self {
        Tree {
            root: Some(Box::new(root)),
        }
    }

    pub(crate) fn from_boxed(root: Option<Box<Node<D>>>) -> Self {
        Tree { root }
    }

    /// Get the root hash, or `None` for the empty tree
    pub fn root_hash(&self) -> Option<D::Output> {
        self.root.as_ref().map(|root| root.exposed_hash())
    }

    pub fn root(&self) -> Option<&Node<D>> {
        self.root.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of nodes currently in the tree
    pub fn len_nodes(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.count_nodes())
    }

    /// Number of leaf nodes currently in the tree
    pub fn leaf_count(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.count_leaves())
    }

    /// Remove the bottom layer of leaves.
    ///
    /// Parents keep their children's hashes in their preimage, so the root
    /// hash is unchanged. Typically done before serializing when only the
    /// internal hashes are needed. A tree made of a single leaf is left as is.
    pub fn trim_leaves(&mut self) {
        if let Some(root) = self.root.as_mut() {
            root.trim_leaves();
        }
    }
}

impl<D: Digest> Default for Tree<D> {
    fn default() -> Self {
        Tree::empty()
    }
}

impl<D: Digest> fmt::Display for Tree<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root() {
            Some(root) => root.fmt_depth(0, f),
            None => write!(f, "Empty tree"),
        }
    }
}
