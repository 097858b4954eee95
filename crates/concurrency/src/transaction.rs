//! Transactions over a root store
//!
//! A transaction captures the store's root version once, at creation, and
//! reads only from it. Write transactions additionally hold the store's
//! writer lock and keep one open mutation context per (table, index) they
//! touch. Contexts are created lazily on first touch and reused for every
//! later read or write of the same index, so a writer sees its own
//! uncommitted changes.
//!
//! # Lifecycle
//!
//! ```text
//! Active ──commit()──> Committed
//!    └────abort()───> Aborted
//! ```
//!
//! - `commit` folds every open context into a new root version, publishes
//!   it, then releases the writer lock.
//! - `abort` discards the contexts and releases the writer lock.
//! - Both are no-ops once the transaction has left `Active`. Dropping an
//!   active write transaction aborts it.
//! - Any other operation on a transaction that has left `Active` fails with
//!   `TransactionNotActive`.
//!
//! # Per-call atomicity
//!
//! `insert`, `upsert`, `delete` and `delete_all` compute every index key they
//! need before touching any index tree. If any key cannot be computed the
//! call fails and the transaction's working set is exactly as it was.

use crate::changes::Change;
use crate::iterator::{ResultIterator, Scan};
use crate::store::{RecordTree, RootStore, RootTree};
use memdb_core::error::{Error, Result};
use memdb_core::schema::{IndexSchema, TableSchema, ID_INDEX};
use memdb_core::value::Value;
use memdb_storage::{index_path, put_entry, remove_entry, Bucket, Entry, TreeTxn};
use parking_lot::MutexGuard;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Status of a transaction in its lifecycle
///
/// Terminal states (no transitions allowed):
/// - `Committed`
/// - `Aborted`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Transaction can read (and write, if it is a write transaction)
    Active,
    /// Transaction committed
    Committed,
    /// Transaction was aborted
    Aborted,
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionState::Active => write!(f, "active"),
            TransactionState::Committed => write!(f, "committed"),
            TransactionState::Aborted => write!(f, "aborted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TableIndex {
    table: String,
    index: String,
}

impl TableIndex {
    fn new(table: &str, index: &str) -> Self {
        TableIndex {
            table: table.to_string(),
            index: index.to_string(),
        }
    }
}

/// Every key an object has, computed before any mutation
struct IndexKeys<'db, T> {
    id: Vec<u8>,
    keys: Vec<(&'db IndexSchema<T>, Vec<u8>)>,
}

/// A read or write transaction against a [`RootStore`]
pub struct Transaction<'db, T> {
    store: &'db RootStore<T>,
    write: bool,
    state: TransactionState,
    root: RootTree<T>,
    modified: FxHashMap<TableIndex, TreeTxn<Bucket<T>>>,
    writer: Option<MutexGuard<'db, ()>>,
    changes: Option<Vec<Change<T>>>,
    after: Vec<Box<dyn FnOnce() + 'db>>,
}

impl<'db, T> Transaction<'db, T> {
    pub(crate) fn read(store: &'db RootStore<T>, root: RootTree<T>) -> Self {
        trace!(target: "memdb::txn", "Read transaction started");
        Transaction {
            store,
            write: false,
            state: TransactionState::Active,
            root,
            modified: FxHashMap::default(),
            writer: None,
            changes: None,
            after: Vec::new(),
        }
    }

    pub(crate) fn write(
        store: &'db RootStore<T>,
        root: RootTree<T>,
        guard: MutexGuard<'db, ()>,
    ) -> Self {
        Transaction {
            store,
            write: true,
            state: TransactionState::Active,
            root,
            modified: FxHashMap::default(),
            writer: Some(guard),
            changes: None,
            after: Vec::new(),
        }
    }

    /// Whether this is a write transaction
    pub fn is_write(&self) -> bool {
        self.write
    }

    /// Current lifecycle state
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Whether the transaction can still be used
    pub fn is_active(&self) -> bool {
        self.state == TransactionState::Active
    }

    // ========================================================================
    // Preconditions and schema resolution
    // ========================================================================

    fn check_active(&self) -> Result<()> {
        if self.state != TransactionState::Active {
            return Err(Error::TransactionNotActive {
                state: self.state.to_string(),
            });
        }
        Ok(())
    }

    fn check_writable(&self, operation: &'static str) -> Result<()> {
        if !self.write {
            return Err(Error::ReadOnlyViolation { operation });
        }
        self.check_active()
    }

    fn table_schema(&self, table: &str) -> Result<&'db TableSchema<T>> {
        let store: &'db RootStore<T> = self.store;
        store
            .schema()
            .get_table(table)
            .ok_or_else(|| Error::UnknownTable(table.to_string()))
    }

    fn index_schema(&self, table: &str, index: &str) -> Result<&'db IndexSchema<T>> {
        self.table_schema(table)?
            .get_index(index)
            .ok_or_else(|| Error::unknown_index(table, index))
    }

    fn encode_args(&self, table: &str, index: &str, args: &[Value], prefix: bool) -> Result<Vec<u8>> {
        self.check_active()?;
        let indexer = self.index_schema(table, index)?.indexer();
        let encoded = if prefix {
            indexer.prefix_from_args(args)
        } else {
            indexer.from_args(args)
        };
        encoded.map_err(|source| Error::IndexArgs {
            index: index.to_string(),
            source,
        })
    }

    fn identity(table: &TableSchema<T>, obj: &T) -> Result<Vec<u8>> {
        table
            .id_index()?
            .indexer()
            .from_object(obj)
            .map_err(|source| Error::IndexCompute {
                index: ID_INDEX.to_string(),
                source,
            })?
            .ok_or_else(|| Error::MissingIndexValue {
                index: ID_INDEX.to_string(),
            })
    }

    fn index_keys(table: &'db TableSchema<T>, obj: &T) -> Result<IndexKeys<'db, T>> {
        let mut id = None;
        let mut keys = Vec::new();
        for index in table.indexes() {
            let key = index
                .indexer()
                .from_object(obj)
                .map_err(|source| Error::IndexCompute {
                    index: index.name().to_string(),
                    source,
                })?;
            match key {
                Some(key) => {
                    if index.name() == ID_INDEX {
                        id = Some(key.clone());
                    }
                    keys.push((index, key));
                }
                None if index.is_allow_missing() => continue,
                None => {
                    return Err(Error::MissingIndexValue {
                        index: index.name().to_string(),
                    })
                }
            }
        }
        let id = id.ok_or_else(|| Error::MissingIndexValue {
            index: ID_INDEX.to_string(),
        })?;
        Ok(IndexKeys { id, keys })
    }

    // ========================================================================
    // Index resolution
    // ========================================================================

    fn first_entry(&self, table: &str, index: &str, key: &[u8]) -> Option<Arc<T>> {
        let bucket = if self.modified.is_empty() {
            None
        } else {
            self.modified
                .get(&TableIndex::new(table, index))
                .map(|tree| tree.get(key))
        };
        let bucket = match bucket {
            Some(found) => found,
            None => self
                .root
                .get(&index_path(table, index))
                .and_then(|tree| tree.get(key)),
        };
        bucket
            .and_then(|b| b.front())
            .map(|entry| Arc::clone(entry.object()))
    }

    fn readable_index(&self, table: &str, index: &str) -> RecordTree<T> {
        if let Some(tree) = self.modified.get(&TableIndex::new(table, index)) {
            return tree.snapshot();
        }
        self.root
            .get(&index_path(table, index))
            .cloned()
            .unwrap_or_default()
    }

    fn writable_index(&mut self, table: &str, index: &str) -> &mut TreeTxn<Bucket<T>> {
        let root = &self.root;
        self.modified
            .entry(TableIndex::new(table, index))
            .or_insert_with(|| {
                root.get(&index_path(table, index))
                    .map(|tree| tree.txn())
                    .unwrap_or_else(|| RecordTree::new().txn())
            })
    }

    fn apply_insert(&mut self, table: &str, keys: &IndexKeys<'db, T>, obj: &Arc<T>) {
        let entry = Entry::new(keys.id.clone(), Arc::clone(obj));
        for (index, key) in &keys.keys {
            let tree = self.writable_index(table, index.name());
            put_entry(tree, key.clone(), entry.clone(), index.is_unique());
        }
    }

    fn apply_remove(&mut self, table: &str, keys: &IndexKeys<'db, T>) {
        for (index, key) in &keys.keys {
            let tree = self.writable_index(table, index.name());
            remove_entry(tree, key, &keys.id);
        }
    }

    fn record_change(&mut self, table: &str, before: Option<Arc<T>>, after: Option<Arc<T>>) {
        if let Some(changes) = self.changes.as_mut() {
            changes.push(Change {
                table: table.to_string(),
                before,
                after,
            });
        }
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Add `obj` to every index of `table`
    ///
    /// Unique indexes keep the newest record per key. Non-unique indexes keep
    /// every record per key in insertion order. Entries for an older version
    /// of the same object under keys it no longer has are not removed; use
    /// [`upsert`](Self::upsert) to replace an object.
    pub fn insert(&mut self, table: &str, obj: T) -> Result<()> {
        self.check_writable("insert")?;
        let schema = self.table_schema(table)?;
        let obj = Arc::new(obj);
        let keys = Self::index_keys(schema, &obj)?;
        let before = if self.changes.is_some() {
            self.first_entry(table, ID_INDEX, &keys.id)
        } else {
            None
        };
        self.apply_insert(table, &keys, &obj);
        self.record_change(table, before, Some(obj));
        Ok(())
    }

    /// Replace the object with the same identity, or insert it
    ///
    /// The stored object's entries are removed from every index before the
    /// new ones are added, so no stale entries remain.
    pub fn upsert(&mut self, table: &str, obj: T) -> Result<()> {
        self.check_writable("upsert")?;
        let schema = self.table_schema(table)?;
        let obj = Arc::new(obj);
        let keys = Self::index_keys(schema, &obj)?;
        let existing = self.first_entry(table, ID_INDEX, &keys.id);
        if let Some(existing) = &existing {
            let old_keys = Self::index_keys(schema, existing)?;
            self.apply_remove(table, &old_keys);
        }
        self.apply_insert(table, &keys, &obj);
        self.record_change(table, existing, Some(obj));
        Ok(())
    }

    /// Remove the object with the same identity as `obj` from every index
    ///
    /// Keys are recomputed from the stored form, not from `obj`, so only the
    /// identity fields of `obj` matter.
    pub fn delete(&mut self, table: &str, obj: &T) -> Result<()> {
        self.check_writable("delete")?;
        let schema = self.table_schema(table)?;
        let id = Self::identity(schema, obj)?;
        let existing = self
            .first_entry(table, ID_INDEX, &id)
            .ok_or_else(|| Error::NotFound {
                table: table.to_string(),
            })?;
        let keys = Self::index_keys(schema, &existing)?;
        self.apply_remove(table, &keys);
        self.record_change(table, Some(existing), None);
        Ok(())
    }

    /// Delete every object matched by [`get`](Self::get)
    ///
    /// Returns the number of objects deleted.
    pub fn delete_all(&mut self, table: &str, index: &str, args: &[Value]) -> Result<usize> {
        self.check_writable("delete")?;
        let schema = self.table_schema(table)?;
        let matched: Vec<Arc<T>> = self.get(table, index, args)?.collect();

        let mut seen = FxHashSet::default();
        let mut targets = Vec::new();
        for obj in matched {
            let id = Self::identity(schema, &obj)?;
            if !seen.insert(id.clone()) {
                continue;
            }
            let Some(stored) = self.first_entry(table, ID_INDEX, &id) else {
                continue;
            };
            let keys = Self::index_keys(schema, &stored)?;
            targets.push((stored, keys));
        }

        for (_, keys) in &targets {
            self.apply_remove(table, keys);
        }
        let deleted = targets.len();
        for (stored, _) in targets {
            self.record_change(table, Some(stored), None);
        }
        Ok(deleted)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Exact-match lookup of a single record
    ///
    /// For a non-unique index this is the earliest inserted record at the
    /// key. Absence is `Ok(None)`, not an error.
    pub fn first(&self, table: &str, index: &str, args: &[Value]) -> Result<Option<Arc<T>>> {
        let key = self.encode_args(table, index, args, false)?;
        Ok(self.first_entry(table, index, &key))
    }

    /// All records whose key equals the encoded `args`
    pub fn get(&self, table: &str, index: &str, args: &[Value]) -> Result<ResultIterator<T>> {
        let key = self.encode_args(table, index, args, false)?;
        Ok(ResultIterator::new(
            self.readable_index(table, index),
            Scan::Exact(key),
        ))
    }

    /// All records whose key starts with the prefix encoding of `args`
    pub fn get_prefix(
        &self,
        table: &str,
        index: &str,
        args: &[Value],
    ) -> Result<ResultIterator<T>> {
        let prefix = self.encode_args(table, index, args, true)?;
        Ok(ResultIterator::new(
            self.readable_index(table, index),
            Scan::Prefix(prefix),
        ))
    }

    /// All records whose key is at or after the encoded `args`, in key order
    pub fn lower_bound(
        &self,
        table: &str,
        index: &str,
        args: &[Value],
    ) -> Result<ResultIterator<T>> {
        let key = self.encode_args(table, index, args, false)?;
        Ok(ResultIterator::new(
            self.readable_index(table, index),
            Scan::From(key),
        ))
    }

    /// Every record in the table, in identity order
    pub fn iter_table(&self, table: &str) -> Result<ResultIterator<T>> {
        self.check_active()?;
        self.table_schema(table)?;
        Ok(ResultIterator::new(
            self.readable_index(table, ID_INDEX),
            Scan::Prefix(Vec::new()),
        ))
    }

    // ========================================================================
    // Change tracking and hooks
    // ========================================================================

    /// Record object-level changes from now on (write transactions only)
    pub fn track_changes(&mut self) {
        if self.write && self.changes.is_none() {
            self.changes = Some(Vec::new());
        }
    }

    /// Changes recorded so far, oldest first
    ///
    /// Empty if tracking is off or the transaction was aborted.
    pub fn changes(&self) -> Vec<Change<T>> {
        self.changes.clone().unwrap_or_default()
    }

    /// Run `f` after a successful commit, once the writer lock is released
    ///
    /// Hooks run in reverse registration order. They are dropped without
    /// running if the transaction aborts. Ignored on read transactions.
    pub fn defer<F>(&mut self, f: F)
    where
        F: FnOnce() + 'db,
    {
        if self.write && self.is_active() {
            self.after.push(Box::new(f));
        }
    }

    // ========================================================================
    // Termination
    // ========================================================================

    /// Publish every change made by this transaction
    ///
    /// No-op for read transactions and for transactions that already
    /// committed or aborted.
    pub fn commit(&mut self) {
        if self.state != TransactionState::Active {
            return;
        }
        self.state = TransactionState::Committed;
        if !self.write {
            return;
        }

        let touched = self.modified.len();
        let mut root = self.root.txn();
        for (key, tree) in self.modified.drain() {
            root.insert(index_path(&key.table, &key.index), tree.commit());
        }
        self.store.publish(root.commit());
        self.root = RootTree::new();
        self.writer = None;
        self.store.metrics().record_commit();
        debug!(target: "memdb::txn", indexes = touched, "Write transaction committed");

        for f in self.after.drain(..).rev() {
            f();
        }
    }

    /// Discard every change made by this transaction
    ///
    /// No-op for read transactions and for transactions that already
    /// committed or aborted.
    pub fn abort(&mut self) {
        if self.state != TransactionState::Active {
            return;
        }
        self.state = TransactionState::Aborted;
        if !self.write {
            return;
        }

        self.modified.clear();
        self.root = RootTree::new();
        if let Some(changes) = self.changes.as_mut() {
            changes.clear();
        }
        self.after.clear();
        self.writer = None;
        self.store.metrics().record_abort();
        debug!(target: "memdb::txn", "Write transaction aborted");
    }
}

impl<T> Drop for Transaction<'_, T> {
    fn drop(&mut self) {
        if self.write && self.state == TransactionState::Active {
            debug!(target: "memdb::txn", "Write transaction dropped while active");
            self.abort();
        }
    }
}

impl<T> fmt::Debug for Transaction<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("write", &self.write)
            .field("state", &self.state)
            .field("modified", &self.modified.len())
            .finish()
    }
}
