//! Core types and traits for memdb
//!
//! This crate defines the foundational types used throughout the system:
//! - Error: Error type hierarchy (store errors and indexer errors)
//! - Value: Typed query arguments
//! - Indexer: Key extraction capability attached to every index
//! - Built-in indexers: string, integer, bool, UUID and compound keys
//! - Schema: Tables, indexes and schema validation

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod indexers;
pub mod schema;
pub mod traits;
pub mod value;

// Re-export commonly used types and traits
pub use error::{Error, IndexError, Result};
pub use indexers::{
    BoolFieldIndex, CompoundIndex, IntFieldIndex, StringFieldIndex, UintFieldIndex,
    UuidFieldIndex,
};
pub use schema::{DbSchema, IndexSchema, TableSchema, ID_INDEX};
pub use traits::Indexer;
pub use value::Value;
