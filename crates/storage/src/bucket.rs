//! Record buckets stored under index keys
//!
//! Every index tree maps an index key to a [`Bucket`]: the records that share
//! that key, in insertion order. Each [`Entry`] carries the record's identity
//! (its key in the table's identity index) so a single record can be removed
//! from a bucket without disturbing the others.
//!
//! - Unique index: the bucket holds exactly one entry. Inserting at an
//!   occupied key replaces the whole bucket.
//! - Non-unique index: entries accumulate. Inserting an entry whose identity
//!   is already in the bucket replaces that entry where it stands.

use crate::tree::TreeTxn;
use im::Vector;
use std::fmt;
use std::sync::Arc;

/// A stored record together with its identity key
pub struct Entry<T> {
    id: Arc<[u8]>,
    object: Arc<T>,
}

impl<T> Entry<T> {
    /// Create an entry
    pub fn new(id: impl Into<Arc<[u8]>>, object: Arc<T>) -> Self {
        Entry {
            id: id.into(),
            object,
        }
    }

    /// Identity key
    pub fn id(&self) -> &[u8] {
        &self.id
    }

    /// Stored object
    pub fn object(&self) -> &Arc<T> {
        &self.object
    }
}

// Manual impl: cloning an entry never requires `T: Clone`.
impl<T> Clone for Entry<T> {
    fn clone(&self) -> Self {
        Entry {
            id: Arc::clone(&self.id),
            object: Arc::clone(&self.object),
        }
    }
}

impl<T> fmt::Debug for Entry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry").field("id", &self.id).finish()
    }
}

/// Records sharing one index key, in insertion order
pub type Bucket<T> = Vector<Entry<T>>;

/// Add `entry` under `key`
///
/// Returns the entry it displaced, if any.
pub fn put_entry<T>(
    tree: &mut TreeTxn<Bucket<T>>,
    key: Vec<u8>,
    entry: Entry<T>,
    unique: bool,
) -> Option<Entry<T>> {
    if unique {
        let previous = tree.insert(key, Vector::unit(entry));
        return previous.and_then(|bucket| bucket.front().cloned());
    }

    match tree.get_mut(&key) {
        Some(bucket) => match bucket.iter().position(|e| e.id() == entry.id()) {
            Some(pos) => Some(bucket.set(pos, entry)),
            None => {
                bucket.push_back(entry);
                None
            }
        },
        None => {
            tree.insert(key, Vector::unit(entry));
            None
        }
    }
}

/// Remove the entry with identity `id` from the bucket under `key`
///
/// Other entries under the same key are kept. The key itself is dropped
/// once its bucket is empty. Returns the removed entry.
pub fn remove_entry<T>(tree: &mut TreeTxn<Bucket<T>>, key: &[u8], id: &[u8]) -> Option<Entry<T>> {
    let bucket = tree.get_mut(key)?;
    let pos = bucket.iter().position(|e| e.id() == id)?;
    let removed = bucket.remove(pos);
    if bucket.is_empty() {
        tree.remove(key);
    }
    Some(removed)
}
