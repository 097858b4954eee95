//! Concurrency layer for memdb
//!
//! This crate implements the transaction model on top of the storage trees:
//! - RootStore: current root version, single-writer lock, counters
//! - Transaction: snapshot-isolated reads, buffered writes, commit/abort
//! - ResultIterator: lazy ordered scans over one index version
//! - Change: object-level change records for write transactions
//!
//! Readers capture the root once and never block. Writers are serialized by
//! a single mutex and publish a new root on commit.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod changes;
pub mod iterator;
pub mod metrics;
pub mod store;
pub mod transaction;

pub use changes::Change;
pub use iterator::ResultIterator;
pub use metrics::{TxnMetrics, TxnStats};
pub use store::{RecordTree, RootStore, RootTree};
pub use transaction::{Transaction, TransactionState};
