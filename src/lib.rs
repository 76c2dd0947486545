//! # chunktree
//!
//! Content-addressed Merkle trees over chunked data.
//!
//! A source is split into fixed-size chunks, each chunk is hashed into a
//! leaf, and the leaves are combined into a binary hash tree whose root
//! commits to every chunk and to their order.
//!
//! ## Core Concepts
//!
//! - **Digests**: pluggable fixed-width hash functions (SHA-256, BLAKE3, XXH3)
//! - **Incremental trees**: append-only, one leaf at a time, earlier roots stay auditable
//! - **Bulk builds**: leaves hashed by a worker pool, then reduced bottom-up
//! - **Codec**: a flat breadth-first array form for storage or transfer
//!
//! ## Example
//!
//! ```
//! use chunktree::{codec, IncrementalTree, Sha256Digest};
//!
//! let mut tree = IncrementalTree::<Sha256Digest>::new();
//! tree.insert(b"a");
//! tree.insert(b"b");
//!
//! let tree = tree.into_tree();
//! let bytes = codec::serialize(&tree);
//! let decoded = codec::deserialize::<Sha256Digest>(&bytes).unwrap();
//! assert_eq!(decoded.root_hash(), tree.root_hash());
//! ```

pub mod bulk;
pub mod codec;
pub mod config;
pub mod digest;
pub mod source;
pub mod tree;
pub mod verify;

mod error;

pub use bulk::{BulkBuilder, ConcurrentLeafHasher, LeafArray};
pub use config::{BuildMode, TreeConfig};
pub use digest::{Blake3Digest, DefaultDigest, Digest, DigestKind, Sha256Digest, Xxh3Digest};
pub use error::{Error, Result};
pub use source::{ByteRange, ChunkReader};
pub use tree::{IncrementalTree, Node, Payload, Tree};
pub use verify::Verification;
