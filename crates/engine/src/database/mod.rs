//! Database handle
//!
//! [`Database`] wraps a [`RootStore`] with its configuration and adds the
//! closure API:
//!
//! 1. **Closure API** (recommended): `db.update(|txn| { ... })`
//!    - Commit on `Ok`, abort on `Err`
//!    - Returns the closure's return value
//!
//! 2. **Manual API**: `begin_write()` + `commit()` / `abort()`
//!    - For cases requiring external control over commit timing
//!
//! Handles are cheap to clone; clones share the same store.

pub mod config;

pub use config::{DatabaseConfig, CONFIG_FILE_NAME};

use memdb_concurrency::{RootStore, Transaction, TxnStats};
use memdb_core::error::Result;
use memdb_core::schema::DbSchema;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Shared handle to an in-memory database
pub struct Database<T> {
    store: Arc<RootStore<T>>,
    config: Arc<DatabaseConfig>,
}

impl<T> Database<T> {
    /// Open a database over `schema` with the default configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSchema` if the schema fails validation.
    pub fn new(schema: DbSchema<T>) -> Result<Self> {
        Self::with_config(schema, DatabaseConfig::default())
    }

    /// Open a database over `schema` with `config`
    pub fn with_config(schema: DbSchema<T>, config: DatabaseConfig) -> Result<Self> {
        let store = RootStore::new(schema)?;
        info!(
            target: "memdb::db",
            name = %config.name,
            tables = store.schema().tables().count(),
            track_changes = config.track_changes,
            "Database opened"
        );
        Ok(Database {
            store: Arc::new(store),
            config: Arc::new(config),
        })
    }

    /// Begin a read transaction on the current version
    pub fn begin_read(&self) -> Transaction<'_, T> {
        self.store.begin_read()
    }

    /// Begin a write transaction, blocking until the writer lock is free
    ///
    /// Change tracking is enabled when the configuration asks for it.
    pub fn begin_write(&self) -> Transaction<'_, T> {
        let mut txn = self.store.begin_write();
        if self.config.track_changes {
            txn.track_changes();
        }
        txn
    }

    /// Begin a write transaction, waiting at most `timeout` for the lock
    pub fn try_begin_write_for(&self, timeout: Duration) -> Option<Transaction<'_, T>> {
        let mut txn = self.store.try_begin_write_for(timeout)?;
        if self.config.track_changes {
            txn.track_changes();
        }
        Some(txn)
    }

    /// Run `f` in a read transaction
    ///
    /// # Example
    /// ```text
    /// let count = db.view(|txn| Ok(txn.get("person", "age", &[30u64.into()])?.count()))?;
    /// ```
    pub fn view<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction<'_, T>) -> Result<R>,
    {
        let mut txn = self.begin_read();
        let result = f(&txn);
        txn.abort();
        result
    }

    /// Run `f` in a write transaction
    ///
    /// Commits if `f` returns `Ok`, aborts if it returns `Err`.
    ///
    /// # Example
    /// ```text
    /// db.update(|txn| {
    ///     txn.insert("person", person)?;
    ///     Ok(())
    /// })?;
    /// ```
    pub fn update<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Transaction<'_, T>) -> Result<R>,
    {
        let mut txn = self.begin_write();
        match f(&mut txn) {
            Ok(value) => {
                let start = Instant::now();
                txn.commit();
                let elapsed = start.elapsed();
                if self.config.slow_commit_ms > 0
                    && elapsed >= Duration::from_millis(self.config.slow_commit_ms)
                {
                    warn!(
                        target: "memdb::db",
                        name = %self.config.name,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Slow commit"
                    );
                }
                Ok(value)
            }
            Err(e) => {
                txn.abort();
                Err(e)
            }
        }
    }

    /// An independent database starting from the current version
    ///
    /// Shares this handle's configuration. Writes to either database are
    /// never visible in the other.
    pub fn snapshot(&self) -> Database<T> {
        Database {
            store: Arc::new(self.store.snapshot()),
            config: Arc::clone(&self.config),
        }
    }

    /// The schema this database was opened with
    pub fn schema(&self) -> &DbSchema<T> {
        self.store.schema()
    }

    /// Transaction counters
    pub fn stats(&self) -> TxnStats {
        self.store.stats()
    }

    /// The configuration this database was opened with
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// The underlying root store
    pub fn store(&self) -> &RootStore<T> {
        &self.store
    }
}

impl<T> Clone for Database<T> {
    fn clone(&self) -> Self {
        Database {
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
        }
    }
}

impl<T> fmt::Debug for Database<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .field("store", &self.store)
            .finish()
    }
}
