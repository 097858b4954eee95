//! Root store: the current database version and the writer lock
//!
//! The root tree maps each index path to that index's tree. A committed
//! write replaces the whole root handle; the previous handle stays valid for
//! every transaction that captured it.
//!
//! # Locking
//!
//! - `writer` (Mutex): held by the single active write transaction from
//!   `begin_write` until commit or abort. Writers are fully serialized.
//! - `root` (RwLock): held only long enough to clone the root handle (O(1))
//!   or to replace it on commit. Readers never wait on a writer's work.

use crate::metrics::{TxnMetrics, TxnStats};
use crate::transaction::Transaction;
use memdb_core::error::Result;
use memdb_core::schema::DbSchema;
use memdb_storage::{decode_index_path, index_path, Bucket, IndexTree};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Tree of one index: index key to records
pub type RecordTree<T> = IndexTree<Bucket<T>>;

/// Tree of all indexes: index path to index tree
pub type RootTree<T> = IndexTree<RecordTree<T>>;

/// Database handle owning the current root version
pub struct RootStore<T> {
    schema: Arc<DbSchema<T>>,
    root: RwLock<RootTree<T>>,
    writer: Mutex<()>,
    metrics: TxnMetrics,
}

impl<T> RootStore<T> {
    /// Validate `schema` and create a store with an empty tree per index
    pub fn new(schema: DbSchema<T>) -> Result<Self> {
        Self::from_shared(Arc::new(schema))
    }

    /// Like [`new`](Self::new) for a schema that is already shared
    pub fn from_shared(schema: Arc<DbSchema<T>>) -> Result<Self> {
        schema.validate()?;
        let mut root = RootTree::new().txn();
        for table in schema.tables() {
            for index in table.indexes() {
                root.insert(index_path(table.name(), index.name()), RecordTree::new());
            }
        }
        Ok(Self::with_root(schema, root.commit()))
    }

    fn with_root(schema: Arc<DbSchema<T>>, root: RootTree<T>) -> Self {
        RootStore {
            schema,
            root: RwLock::new(root),
            writer: Mutex::new(()),
            metrics: TxnMetrics::new(),
        }
    }

    /// The schema this store was built from
    pub fn schema(&self) -> &DbSchema<T> {
        &self.schema
    }

    /// The current root version
    pub fn current_root(&self) -> RootTree<T> {
        self.root.read().clone()
    }

    // Callers must hold the writer lock.
    pub(crate) fn publish(&self, root: RootTree<T>) {
        *self.root.write() = root;
    }

    pub(crate) fn metrics(&self) -> &TxnMetrics {
        &self.metrics
    }

    /// Begin a read transaction on the current version
    ///
    /// Never blocks on writers.
    pub fn begin_read(&self) -> Transaction<'_, T> {
        self.metrics.record_read();
        Transaction::read(self, self.current_root())
    }

    /// Begin a write transaction
    ///
    /// Blocks until no other write transaction is active, then captures the
    /// root as of lock acquisition.
    pub fn begin_write(&self) -> Transaction<'_, T> {
        let guard = self.writer.lock();
        self.metrics.record_write();
        debug!(target: "memdb::txn", "Write transaction started");
        Transaction::write(self, self.current_root(), guard)
    }

    /// Begin a write transaction, waiting at most `timeout` for the lock
    ///
    /// Returns `None` if the lock could not be acquired in time; nothing is
    /// captured or counted in that case.
    pub fn try_begin_write_for(&self, timeout: Duration) -> Option<Transaction<'_, T>> {
        let guard = self.writer.try_lock_for(timeout)?;
        self.metrics.record_write();
        debug!(target: "memdb::txn", "Write transaction started");
        Some(Transaction::write(self, self.current_root(), guard))
    }

    /// An independent store starting from the current version
    ///
    /// O(1). Writes to either store are never visible in the other.
    pub fn snapshot(&self) -> RootStore<T> {
        Self::with_root(Arc::clone(&self.schema), self.current_root())
    }

    /// Transaction counters
    pub fn stats(&self) -> TxnStats {
        self.metrics.snapshot()
    }
}

impl<T> fmt::Debug for RootStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indexes: Vec<String> = self
            .current_root()
            .iter()
            .filter_map(|(path, _)| decode_index_path(path))
            .map(|(table, index)| format!("{}.{}", table, index))
            .collect();
        f.debug_struct("RootStore")
            .field("indexes", &indexes)
            .finish()
    }
}
