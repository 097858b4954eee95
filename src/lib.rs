//! memdb - Embedded, schema-driven, in-memory transactional store
//!
//! Records of one Rust type live in named tables. Every table carries a set
//! of named indexes; each index turns a record into a byte key. Every
//! committed state is an immutable version, so readers never block and
//! always see one consistent snapshot while a single writer at a time builds
//! the next version.
//!
//! # Quick Start
//!
//! ```
//! use memdb::{Database, DbSchema, IndexSchema, StringFieldIndex, TableSchema, UintFieldIndex};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Person {
//!     email: String,
//!     age: u64,
//! }
//!
//! let schema = DbSchema::new().table(
//!     TableSchema::new("person")
//!         .index(
//!             IndexSchema::new("id", StringFieldIndex::new(|p: &Person| Some(p.email.clone())))
//!                 .unique(),
//!         )
//!         .index(IndexSchema::new("age", UintFieldIndex::new(|p: &Person| Some(p.age)))),
//! );
//! let db = Database::new(schema)?;
//!
//! db.update(|txn| {
//!     txn.insert("person", Person { email: "joe@aol.com".into(), age: 30 })
//! })?;
//!
//! let joe = db.view(|txn| txn.first("person", "id", &["joe@aol.com".into()]))?;
//! assert_eq!(joe.map(|p| p.age), Some(30));
//! # Ok::<(), memdb::Error>(())
//! ```
//!
//! # Architecture
//!
//! - `memdb-core`: errors, query values, indexers and schema
//! - `memdb-storage`: persistent ordered trees and index buckets
//! - `memdb-concurrency`: root store, transactions and result iterators
//! - `memdb-engine`: the `Database` handle and its configuration

pub use memdb_engine::*;
