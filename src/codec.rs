//! Flat array encoding of trees
//!
//! A serialized tree is a sequence of fixed-width records, `2 * WIDTH` bytes
//! each, in breadth-first order starting at the root. A record holds the
//! node's stored payload: the preimage for internal nodes, the digest
//! right-padded with zeros for leaves. Every encoded node is followed (in BFS
//! order) by one record per child slot; an absent child is written as an
//! all-zero record and contributes nothing further.
//!
//! There is no header. The reader must know the digest width.
//!
//! Decoding rule for node kinds: a node with at least one child is internal.
//! A childless node whose upper half is all zero is a leaf; any other
//! childless node is an internal node whose leaves were trimmed away. Both
//! keep the root hash intact.
//!
//! Known limitation: a node whose record is all zero (a leaf whose digest
//! happens to be zero) is indistinguishable from an absent child. It is
//! written as a plain sentinel with no child slots and is dropped on decode;
//! the parent's preimage still carries its hash. A trimmed internal node
//! whose right child hash is zero decodes as a leaf.

use crate::digest::Digest;
use crate::tree::{Node, Payload, Tree};
use crate::{Error, Result};
use std::collections::VecDeque;

/// Bytes per record for digest `D`
pub fn record_width<D: Digest>() -> usize {
    D::record_width()
}

/// Encode a tree. The empty tree encodes to an empty buffer.
pub fn serialize<D: Digest>(tree: &Tree<D>) -> Vec<u8> {
    let width = D::record_width();
    let mut out = Vec::with_capacity(tree.len_nodes() * width * 2);
    let Some(root) = tree.root() else {
        return out;
    };

    let mut queue: VecDeque<Option<&Node<D>>> = VecDeque::from([Some(root)]);
    while let Some(entry) = queue.pop_front() {
        match entry {
            Some(node) => {
                let start = out.len();
                node.write_record(&mut out);
                // An all-zero record reads back as an absent child, so its
                // subtree must not be encoded either
                if is_sentinel(&out[start..]) {
                    continue;
                }
                queue.push_back(node.left());
                queue.push_back(node.right());
            }
            None => out.resize(out.len() + width, 0),
        }
    }
    out
}

/// Decoded record before it is turned into an owned node
struct Slot<'a> {
    record: &'a [u8],
    left: Option<usize>,
    right: Option<usize>,
}

impl<'a> Slot<'a> {
    fn new(record: &'a [u8]) -> Self {
        Slot {
            record,
            left: None,
            right: None,
        }
    }
}

/// Decode a tree produced by [`serialize`]
pub fn deserialize<D: Digest>(bytes: &[u8]) -> Result<Tree<D>> {
    let width = D::record_width();
    if bytes.is_empty() || bytes.len() % width != 0 {
        return Err(Error::Format(format!(
            "length must be a non-zero multiple of {} bytes, got {}",
            width,
            bytes.len()
        )));
    }
    let records: Vec<&[u8]> = bytes.chunks_exact(width).collect();

    // First pass: link records by index in BFS order
    let mut slots = vec![Slot::new(records[0])];
    let mut queue = VecDeque::from([0usize]);
    let mut next = 1;
    while next < records.len() {
        let parent = queue.pop_front().ok_or_else(|| {
            Error::Format(format!(
                "{} records left over after the last node",
                records.len() - next
            ))
        })?;

        for is_left in [true, false] {
            let Some(record) = records.get(next) else {
                break;
            };
            next += 1;
            if is_sentinel(record) {
                continue;
            }
            let index = slots.len();
            slots.push(Slot::new(record));
            queue.push_back(index);
            if is_left {
                slots[parent].left = Some(index);
            } else {
                slots[parent].right = Some(index);
            }
        }
    }

    // Second pass: children always come after their parent, so build
    // back to front and move each finished child into place.
    let mut nodes: Vec<Option<Node<D>>> = Vec::with_capacity(slots.len());
    nodes.resize_with(slots.len(), || None);
    for (index, slot) in slots.iter().enumerate().rev() {
        let childless = slot.left.is_none() && slot.right.is_none();
        let mut node = Node::from_payload(decode_payload::<D>(slot.record, childless));
        if let Some(child) = slot.left.and_then(|i| nodes[i].take()) {
            node.set_left(child);
        }
        if let Some(child) = slot.right.and_then(|i| nodes[i].take()) {
            node.set_right(child);
        }
        nodes[index] = Some(node);
    }

    let root = nodes.into_iter().next().flatten();
    log::debug!("decoded {} records into {} nodes", records.len(), slots.len());
    Ok(Tree::from_boxed(root.map(Box::new)))
}

fn is_sentinel(record: &[u8]) -> bool {
    record.iter().all(|b| *b == 0)
}

fn decode_payload<D: Digest>(record: &[u8], childless: bool) -> Payload<D> {
    if childless && is_sentinel(&record[D::WIDTH..]) {
        Payload::Leaf(D::output_from_prefix(record))
    } else {
        Payload::Internal(record.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bulk::BulkBuilder;
    use crate::digest::{Sha256Digest, Xxh3Digest};
    use crate::tree::IncrementalTree;

    fn incremental(n: u32) -> Tree<Sha256Digest> {
        let mut tree = IncrementalTree::new();
        for i in 0..n {
            tree.insert(&i.to_le_bytes());
        }
        tree.into_tree()
    }

    #[test]
    fn test_single_leaf_layout() {
        let digest = Sha256Digest::digest(b"a");
        let tree = Tree::<Sha256Digest>::new(Node::leaf(digest));
        let bytes = serialize(&tree);
        // root record, then two absent-child sentinels
        assert_eq!(bytes.len(), 3 * 64);
        assert_eq!(&bytes[..32], &digest);
        assert!(bytes[32..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_two_leaf_layout() {
        let tree = incremental(2);
        let bytes = serialize(&tree);
        // root, two leaves, four sentinels
        assert_eq!(bytes.len(), 7 * 64);
        let root = tree.root().unwrap();
        match root.payload() {
            Payload::Internal(preimage) => assert_eq!(&bytes[..64], preimage.as_slice()),
            Payload::Leaf(_) => panic!("root should be internal"),
        }
        assert_eq!(&bytes[64..96], &root.left().unwrap().exposed_hash());
        assert_eq!(&bytes[128..160], &root.right().unwrap().exposed_hash());
    }

    #[test]
    fn test_roundtrip_preserves_structure() {
        for n in [1, 2, 3, 5, 8, 13] {
            let tree = incremental(n);
            let decoded = deserialize::<Sha256Digest>(&serialize(&tree)).unwrap();
            assert_eq!(decoded.root_hash(), tree.root_hash(), "n = {}", n);
            assert_eq!(decoded, tree, "n = {}", n);
        }
    }

    #[test]
    fn test_roundtrip_trimmed_keeps_root_hash() {
        for n in [2, 3, 7, 16, 33] {
            let mut tree = incremental(n);
            let root_hash = tree.root_hash();
            let full_len = serialize(&tree).len();

            tree.trim_leaves();
            let bytes = serialize(&tree);
            assert!(bytes.len() < full_len);

            let decoded = deserialize::<Sha256Digest>(&bytes).unwrap();
            assert_eq!(decoded.root_hash(), root_hash, "n = {}", n);
            assert_eq!(decoded.leaf_count(), 0);
        }
    }

    #[test]
    fn test_roundtrip_bulk_tree() {
        let digests: Vec<_> = (0..11u8).map(|i| Xxh3Digest::digest(&[i])).collect();
        let tree = BulkBuilder::from_digests::<Xxh3Digest>(digests);
        let bytes = serialize(&tree);
        assert_eq!(bytes.len() % 16, 0);
        let decoded = deserialize::<Xxh3Digest>(&bytes).unwrap();
        assert_eq!(decoded, tree);
    }

    #[test]
    fn test_rejects_bad_lengths() {
        assert!(matches!(
            deserialize::<Sha256Digest>(&[]),
            Err(Error::Format(_))
        ));
        assert!(matches!(
            deserialize::<Sha256Digest>(&[1u8; 65]),
            Err(Error::Format(_))
        ));
        assert!(matches!(
            deserialize::<Xxh3Digest>(&[1u8; 20]),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn test_rejects_trailing_records() {
        // A leaf root followed by two sentinels, then a stray record
        let mut bytes = serialize(&incremental(1));
        bytes.extend_from_slice(&[5u8; 64]);
        assert!(matches!(
            deserialize::<Sha256Digest>(&bytes),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn test_root_only_record() {
        let digest = Sha256Digest::digest(b"x");
        let mut record = digest.to_vec();
        record.resize(64, 0);
        let tree = deserialize::<Sha256Digest>(&record).unwrap();
        assert_eq!(tree.root_hash(), Some(digest));
        assert!(tree.root().unwrap().is_leaf());
    }

    #[test]
    fn test_empty_tree_encodes_to_nothing() {
        assert!(serialize(&Tree::<Sha256Digest>::empty()).is_empty());
    }

    /// Digest that maps the empty input to all zeros
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    struct ZeroOnEmpty;

    impl Digest for ZeroOnEmpty {
        type Output = [u8; 8];
        const WIDTH: usize = 8;
        const NAME: &'static str = "zero-on-empty";

        fn digest(data: &[u8]) -> [u8; 8] {
            if data.is_empty() {
                [0u8; 8]
            } else {
                Xxh3Digest::digest(data)
            }
        }
    }

    #[test]
    fn test_zero_digest_collides_with_sentinel() {
        let mut inc = IncrementalTree::<ZeroOnEmpty>::new();
        inc.insert(b"a");
        inc.insert(b"");
        let tree = inc.into_tree();
        assert_eq!(tree.leaf_count(), 2);

        let bytes = serialize(&tree);
        // root, leaf "a", zero leaf written as a bare sentinel, then the two
        // child slots of "a"; the zero leaf gets no child slots of its own
        assert_eq!(bytes.len(), 5 * 16);
        assert!(bytes[32..48].iter().all(|b| *b == 0));

        let decoded = deserialize::<ZeroOnEmpty>(&bytes).unwrap();
        // The zero leaf reads back as an absent child
        assert_eq!(decoded.leaf_count(), 1);
        assert_ne!(decoded, tree);
        // The parent still carries the zero hash in its preimage
        assert_eq!(decoded.root_hash(), tree.root_hash());
    }

    #[test]
    fn test_zero_digest_deep_in_tree() {
        let mut inc = IncrementalTree::<ZeroOnEmpty>::new();
        for chunk in [&b"a"[..], b"b", b"", b"c", b"d", b"e"] {
            inc.insert(chunk);
        }
        let tree = inc.into_tree();

        let decoded = deserialize::<ZeroOnEmpty>(&serialize(&tree)).unwrap();
        assert_eq!(decoded.leaf_count(), 5);
        assert_eq!(decoded.root_hash(), tree.root_hash());
    }

    #[test]
    fn test_zero_digest_root_leaf() {
        let mut inc = IncrementalTree::<ZeroOnEmpty>::new();
        inc.insert(b"");
        let tree = inc.into_tree();

        let bytes = serialize(&tree);
        assert_eq!(bytes.len(), 16);
        let decoded = deserialize::<ZeroOnEmpty>(&bytes).unwrap();
        assert_eq!(decoded, tree);
        assert_eq!(decoded.root_hash(), Some([0u8; 8]));
    }
}
