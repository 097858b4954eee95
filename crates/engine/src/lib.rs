//! Database engine for memdb
//!
//! This crate ties the lower layers together behind one handle:
//! - Database: shared handle with the `view` / `update` closure API
//! - DatabaseConfig: `memdb.toml` configuration
//!
//! It also re-exports the schema, indexer and transaction types callers
//! need, so depending on this crate alone is enough.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod database;

pub use database::{Database, DatabaseConfig, CONFIG_FILE_NAME};

pub use memdb_concurrency::{
    Change, ResultIterator, RootStore, Transaction, TransactionState, TxnStats,
};
pub use memdb_core::{
    BoolFieldIndex, CompoundIndex, DbSchema, Error, IndexError, IndexSchema, Indexer,
    IntFieldIndex, Result, StringFieldIndex, TableSchema, UintFieldIndex, UuidFieldIndex, Value,
    ID_INDEX,
};
