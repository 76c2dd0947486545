//! Tree node types

use crate::digest::{concat, to_hex, write_halves, Digest};
use std::fmt;

/// What a node stores
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload<D: Digest> {
    /// Digest of one input chunk; exposed as-is
    Leaf(D::Output),
    /// Preimage `left.exposed_hash() ‖ right.exposed_hash()`, `2 * WIDTH` bytes
    Internal(Vec<u8>),
}

/// A vertex of the hash tree
///
/// Internal nodes keep the concatenation of their children's hashes rather
/// than their own hash. The exposed hash is recomputed on every call, so it
/// can never go stale while the right spine is being rewritten.
///
/// `height` is the balance marker: 0 until the node is known to root a
/// perfect subtree, then the height of that subtree. A marked subtree is
/// never modified again.
#[derive(Clone, Debug)]
pub struct Node<D: Digest> {
    payload: Payload<D>,
    left: Option<Box<Node<D>>>,
    right: Option<Box<Node<D>>>,
    height: u32,
}

impl<D: Digest> Node<D> {
    /// Create a leaf holding a chunk digest
    pub fn leaf(digest: D::Output) -> Self {
        Node {
            payload: Payload::Leaf(digest),
            left: None,
            right: None,
            height: 1,
        }
    }

    /// Combine two subtrees under a new parent.
    ///
    /// The parent is marked balanced when both children are marked with the
    /// same height.
    pub fn join(left: Box<Node<D>>, right: Box<Node<D>>) -> Self {
        let payload = concat::<D>(left.exposed_hash().as_ref(), right.exposed_hash().as_ref());
        let height = if left.height != 0 && left.height == right.height {
            left.height + 1
        } else {
            0
        };
        Node {
            payload: Payload::Internal(payload),
            left: Some(left),
            right: Some(right),
            height,
        }
    }

    /// Node rebuilt from a serialized record; balance is unknown
    pub(crate) fn from_payload(payload: Payload<D>) -> Self {
        Node {
            payload,
            left: None,
            right: None,
            height: 0,
        }
    }

    /// The hash this node presents to its parent
    pub fn exposed_hash(&self) -> D::Output {
        match &self.payload {
            Payload::Leaf(digest) => *digest,
            Payload::Internal(preimage) => D::digest(preimage),
        }
    }

    pub fn payload(&self) -> &Payload<D> {
        &self.payload
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.payload, Payload::Leaf(_))
    }

    pub fn left(&self) -> Option<&Node<D>> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&Node<D>> {
        self.right.as_deref()
    }

    /// Height of the perfect subtree rooted here, if already established
    pub fn height(&self) -> Option<u32> {
        (self.height != 0).then_some(self.height)
    }

    pub(crate) fn set_left(&mut self, child: Node<D>) {
        self.left = Some(Box::new(child));
    }

    pub(crate) fn set_right(&mut self, child: Node<D>) {
        self.right = Some(Box::new(child));
    }

    /// Append the fixed-width record for this node to `out`
    pub(crate) fn write_record(&self, out: &mut Vec<u8>) {
        let width = D::record_width();
        let bytes: &[u8] = match &self.payload {
            Payload::Leaf(digest) => digest.as_ref(),
            Payload::Internal(preimage) => preimage,
        };
        let n = bytes.len().min(width);
        out.extend_from_slice(&bytes[..n]);
        out.resize(out.len() + (width - n), 0);
    }

    /// Append a leaf digest below this node.
    ///
    /// Consumes the node and returns whatever must occupy its slot: either
    /// the same node (the leaf went further down the right spine) or a new
    /// parent with this node on the left and the leaf on the right.
    pub(crate) fn add(mut self: Box<Self>, digest: D::Output) -> Box<Self> {
        if self.is_balanced() {
            return Box::new(Self::wrap(self, digest));
        }
        match self.right.take() {
            Some(right) => {
                self.right = Some(right.add(digest));
                self.refresh_payload();
                self
            }
            // Unbalanced nodes always have a right child when grown by `add`
            None => Box::new(Self::wrap(self, digest)),
        }
    }

    fn wrap(left: Box<Self>, digest: D::Output) -> Self {
        let payload = concat::<D>(left.exposed_hash().as_ref(), digest.as_ref());
        let height = if left.height == 1 { 2 } else { 0 };
        Node {
            payload: Payload::Internal(payload),
            left: Some(left),
            right: Some(Box::new(Node::leaf(digest))),
            height,
        }
    }

    /// Rewrite the stored preimage from the current children
    fn refresh_payload(&mut self) {
        let (Some(left), Some(right)) = (self.left.as_deref(), self.right.as_deref()) else {
            return;
        };
        let l = left.exposed_hash();
        let r = right.exposed_hash();
        match &mut self.payload {
            Payload::Internal(preimage) if preimage.len() == D::record_width() => {
                write_halves::<D>(preimage, l.as_ref(), r.as_ref());
            }
            payload => *payload = Payload::Internal(concat::<D>(l.as_ref(), r.as_ref())),
        }
    }

    /// Whether this node roots a perfect subtree; memoizes the answer
    fn is_balanced(&mut self) -> bool {
        self.depth_balance().is_some()
    }

    /// Walk the right spine to find out whether this subtree is perfect,
    /// marking every node proven balanced along the way.
    fn depth_balance(&mut self) -> Option<u32> {
        if self.height != 0 {
            return Some(self.height);
        }
        let right = self.right.as_mut()?.depth_balance()?;
        let left = self.left.as_mut()?.depth_balance()?;
        if left == right {
            self.height = right + 1;
            Some(self.height)
        } else {
            None
        }
    }

    /// Detach every leaf child below this node
    pub(crate) fn trim_leaves(&mut self) {
        for slot in [&mut self.left, &mut self.right] {
            if slot.as_ref().is_some_and(|child| child.is_leaf()) {
                *slot = None;
            } else if let Some(child) = slot {
                child.trim_leaves();
            }
        }
    }

    pub(crate) fn count_nodes(&self) -> usize {
        1 + self.left().map_or(0, Node::count_nodes) + self.right().map_or(0, Node::count_nodes)
    }

    pub(crate) fn count_leaves(&self) -> usize {
        if self.is_leaf() {
            return 1;
        }
        self.left().map_or(0, Node::count_leaves) + self.right().map_or(0, Node::count_leaves)
    }

    /// Depth-first dump, one node per line
    pub(crate) fn fmt_depth(&self, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match &self.payload {
            Payload::Leaf(digest) => write!(f, "{}leaf [{}]", indent, to_hex(digest))?,
            Payload::Internal(preimage) => {
                let (l, r) = preimage.split_at(preimage.len() / 2);
                write!(f, "{}node [{}|{}]", indent, to_hex(l), to_hex(r))?
            }
        }
        for child in [self.left(), self.right()].into_iter().flatten() {
            writeln!(f)?;
            child.fmt_depth(depth + 1, f)?;
        }
        Ok(())
    }
}

/// Structural equality: same payloads in the same shape.
/// The balance marker is a cache and does not take part.
impl<D: Digest> PartialEq for Node<D> {
    fn eq(&self, other: &Self) -> bool {
        self.payload == other.payload && self.left == other.left && self.right == other.right
    }
}

impl<D: Digest> Eq for Node<D> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::Sha256Digest;

    type N = Node<Sha256Digest>;

    fn h(data: &[u8]) -> [u8; 32] {
        Sha256Digest::digest(data)
    }

    #[test]
    fn test_leaf_exposes_digest() {
        let leaf = N::leaf(h(b"a"));
        assert_eq!(leaf.exposed_hash(), h(b"a"));
        assert!(leaf.is_leaf());
        assert_eq!(leaf.height(), Some(1));
    }

    #[test]
    fn test_join_hashes_preimage() {
        let parent = N::join(Box::new(N::leaf(h(b"a"))), Box::new(N::leaf(h(b"b"))));
        let expected = h(&[h(b"a"), h(b"b")].concat());
        assert_eq!(parent.exposed_hash(), expected);
        assert_eq!(parent.height(), Some(2));
        assert!(!parent.is_leaf());
    }

    #[test]
    fn test_join_unequal_heights_unmarked() {
        let pair = N::join(Box::new(N::leaf(h(b"a"))), Box::new(N::leaf(h(b"b"))));
        let parent = N::join(Box::new(pair), Box::new(N::leaf(h(b"c"))));
        assert_eq!(parent.height(), None);
    }

    #[test]
    fn test_add_to_leaf_creates_parent() {
        let leaf = Box::new(N::leaf(h(b"a")));
        let parent = leaf.add(h(b"b"));
        assert_eq!(parent.height(), Some(2));
        assert_eq!(parent.left().unwrap().exposed_hash(), h(b"a"));
        assert_eq!(parent.right().unwrap().exposed_hash(), h(b"b"));
    }

    #[test]
    fn test_add_descends_right_spine() {
        let root = Box::new(N::leaf(h(b"a"))).add(h(b"b")).add(h(b"c"));
        // Perfect pair on the left, lone leaf on the right
        assert_eq!(root.height(), None);
        assert_eq!(root.left().unwrap().height(), Some(2));

        let root = root.add(h(b"d"));
        let right = root.right().unwrap();
        assert_eq!(right.height(), Some(2));
        assert_eq!(right.left().unwrap().exposed_hash(), h(b"c"));
        assert_eq!(right.right().unwrap().exposed_hash(), h(b"d"));

        let ab = h(&[h(b"a"), h(b"b")].concat());
        let cd = h(&[h(b"c"), h(b"d")].concat());
        assert_eq!(root.exposed_hash(), h(&[ab, cd].concat()));
    }

    #[test]
    fn test_trim_leaves_keeps_hash() {
        let mut root = Box::new(N::leaf(h(b"a"))).add(h(b"b")).add(h(b"c"));
        let before = root.exposed_hash();
        root.trim_leaves();
        assert_eq!(root.exposed_hash(), before);
        assert_eq!(root.count_nodes(), 2);
        assert_eq!(root.count_leaves(), 0);
    }

    #[test]
    fn test_equality_ignores_marker() {
        let a = N::leaf(h(b"a"));
        let b = N::from_payload(Payload::Leaf(h(b"a")));
        assert_eq!(a.height(), Some(1));
        assert_eq!(b.height(), None);
        assert_eq!(a, b);
    }

    /// Height of the perfect subtree rooted at `node`, computed from shape alone
    fn perfect_height(node: &N) -> Option<u32> {
        match (node.left(), node.right()) {
            (None, None) if node.is_leaf() => Some(1),
            (Some(l), Some(r)) => {
                let hl = perfect_height(l)?;
                (Some(hl) == perfect_height(r)).then_some(hl + 1)
            }
            _ => None,
        }
    }

    fn check_markers(node: &N) {
        if let Some(height) = node.height() {
            assert_eq!(perfect_height(node), Some(height), "marker on imperfect subtree");
        }
        for child in [node.left(), node.right()].into_iter().flatten() {
            check_markers(child);
        }
    }

    fn check_spine(root: &N) {
        let mut above: Option<u32> = None;
        let mut cur = Some(root);
        while let Some(node) = cur {
            if let Some(parent) = above {
                assert_eq!(
                    node.height(),
                    Some(parent - 1),
                    "spine node below a marked node is unmarked"
                );
            }
            above = node.height();
            cur = node.right();
        }
    }

    #[test]
    fn test_markers_sound_while_growing() {
        let mut root = Box::new(N::leaf(h(&0u32.to_le_bytes())));
        for i in 1..300u32 {
            root = root.add(h(&i.to_le_bytes()));
            check_markers(&root);
            check_spine(&root);
            if (i + 1).is_power_of_two() {
                assert_eq!(perfect_height(&root), Some((i + 1).trailing_zeros() + 1));
            }
        }
    }

    #[test]
    fn test_write_record_pads_leaf() {
        let mut out = Vec::new();
        N::leaf(h(b"a")).write_record(&mut out);
        assert_eq!(out.len(), 64);
        assert_eq!(&out[..32], &h(b"a"));
        assert!(out[32..].iter().all(|b| *b == 0));
    }
}
