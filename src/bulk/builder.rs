//! Bottom-up tree reduction

use super::LeafArray;
use crate::digest::Digest;
use crate::tree::{Node, Tree};

/// Reduces a finished leaf array into a [`Tree`]
///
/// Each round pairs neighbours left to right. When a round has an odd
/// number of nodes the last one is carried up unchanged rather than paired
/// with a copy of itself, so every node traces back to a real chunk.
#[derive(Clone, Copy, Debug, Default)]
pub struct BulkBuilder;

impl BulkBuilder {
    /// Build from a hashed leaf array
    pub fn build<D: Digest>(leaves: LeafArray<D>) -> Tree<D> {
        Self::from_digests(leaves.into_vec())
    }

    /// Build from leaf digests in order
    pub fn from_digests<D: Digest>(digests: impl IntoIterator<Item = D::Output>) -> Tree<D> {
        let mut level: Vec<Box<Node<D>>> = digests
            .into_iter()
            .map(|digest| Box::new(Node::leaf(digest)))
            .collect();
        let leaves = level.len();
        let mut rounds = 0;

        while level.len() > 1 {
            let mut next = Vec::with_capacity(level.len().div_ceil(2));
            let mut nodes = level.into_iter();
            while let Some(left) = nodes.next() {
                match nodes.next() {
                    Some(right) => next.push(Box::new(Node::join(left, right))),
                    None => next.push(left),
                }
            }
            level = next;
            rounds += 1;
        }

        log::debug!("reduced {} leaves in {} rounds", leaves, rounds);
        Tree::from_boxed(level.pop())
    }
}
