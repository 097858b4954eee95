//! Storage layer for memdb
//!
//! This crate provides the persistent building blocks the transaction layer
//! composes:
//! - IndexTree / TreeTxn: immutable ordered trees with copy-on-write
//!   mutation contexts (backed by `im::OrdMap`)
//! - Entry / Bucket: records stored under an index key, unique or not
//! - index_path: placement of each (table, index) tree inside the root tree

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bucket;
pub mod path;
pub mod tree;

pub use bucket::{put_entry, remove_entry, Bucket, Entry};
pub use path::{decode_index_path, index_path};
pub use tree::{IndexTree, TreeTxn};
