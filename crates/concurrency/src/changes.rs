//! Change records for write transactions
//!
//! When a write transaction has change tracking enabled, every successful
//! insert, upsert or delete appends one [`Change`]. `before` is the stored
//! form the transaction saw under the same identity; `after` is the new one.

use std::fmt;
use std::sync::Arc;

/// One object-level change made by a write transaction
pub struct Change<T> {
    /// Table the change was made in
    pub table: String,
    /// Object stored under the same identity before the change
    pub before: Option<Arc<T>>,
    /// Object stored after the change
    pub after: Option<Arc<T>>,
}

impl<T> Change<T> {
    /// The object did not exist before
    pub fn created(&self) -> bool {
        self.before.is_none() && self.after.is_some()
    }

    /// An existing object was replaced
    pub fn updated(&self) -> bool {
        self.before.is_some() && self.after.is_some()
    }

    /// The object was removed
    pub fn deleted(&self) -> bool {
        self.before.is_some() && self.after.is_none()
    }
}

impl<T> Clone for Change<T> {
    fn clone(&self) -> Self {
        Change {
            table: self.table.clone(),
            before: self.before.clone(),
            after: self.after.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Change<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Change")
            .field("table", &self.table)
            .field("before", &self.before)
            .field("after", &self.after)
            .finish()
    }
}
