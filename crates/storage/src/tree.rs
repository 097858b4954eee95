//! Persistent ordered trees
//!
//! [`IndexTree`] is an immutable, structurally shared ordered map from byte
//! keys to values. Cloning one is O(1) and the clone is a snapshot: nothing
//! done through any other handle can change what it sees.
//!
//! [`TreeTxn`] is a mutation context opened on a tree. Edits are copy-on-write
//! against the nodes shared with the source tree, so the source stays valid
//! for every reader holding it. [`TreeTxn::commit`] consumes the context and
//! yields the new immutable version.
//!
//! ```
//! use memdb_storage::tree::IndexTree;
//!
//! let base: IndexTree<u32> = IndexTree::new();
//! let mut txn = base.txn();
//! txn.insert(b"a".to_vec(), 1);
//! let next = txn.commit();
//!
//! assert!(base.get(b"a").is_none());
//! assert_eq!(next.get(b"a"), Some(&1));
//! ```

use im::OrdMap;
use std::fmt;
use std::ops::Bound;

fn seek_from<V: Clone>(
    map: &OrdMap<Vec<u8>, V>,
    from: Bound<&[u8]>,
) -> Option<(Vec<u8>, V)> {
    map.range::<_, [u8]>((from, Bound::Unbounded))
        .next()
        .map(|(k, v)| (k.clone(), v.clone()))
}

/// Immutable handle to one version of a persistent tree
#[derive(Clone)]
pub struct IndexTree<V> {
    map: OrdMap<Vec<u8>, V>,
}

impl<V: Clone> IndexTree<V> {
    /// Create an empty tree
    pub fn new() -> Self {
        IndexTree { map: OrdMap::new() }
    }

    /// Number of keys in the tree
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the tree is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Exact lookup
    pub fn get(&self, key: &[u8]) -> Option<&V> {
        self.map.get(key)
    }

    /// First entry whose key satisfies the lower bound
    ///
    /// Returns owned copies so callers can hold a position in the tree
    /// without borrowing it.
    pub fn seek(&self, from: Bound<&[u8]>) -> Option<(Vec<u8>, V)> {
        seek_from(&self.map, from)
    }

    /// Iterate all entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&Vec<u8>, &V)> {
        self.map.iter()
    }

    /// Open a mutation context on this version
    pub fn txn(&self) -> TreeTxn<V> {
        TreeTxn {
            map: self.map.clone(),
        }
    }
}

impl<V: Clone> Default for IndexTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for IndexTree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexTree")
            .field("len", &self.map.len())
            .finish()
    }
}

/// Mutation context on a persistent tree
///
/// Owned exclusively by whoever opened it. Reads see the context's own
/// uncommitted edits.
pub struct TreeTxn<V> {
    map: OrdMap<Vec<u8>, V>,
}

impl<V: Clone> TreeTxn<V> {
    /// Insert or replace the value at `key`, returning the previous value
    pub fn insert(&mut self, key: Vec<u8>, value: V) -> Option<V> {
        self.map.insert(key, value)
    }

    /// Remove the value at `key`, returning it
    pub fn remove(&mut self, key: &[u8]) -> Option<V> {
        self.map.remove(key)
    }

    /// Exact lookup including uncommitted edits
    pub fn get(&self, key: &[u8]) -> Option<&V> {
        self.map.get(key)
    }

    /// Mutable access to the value at `key`
    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut V> {
        self.map.get_mut(key)
    }

    /// Number of keys including uncommitted edits
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the tree is empty including uncommitted edits
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Immutable view of the current edits
    ///
    /// The context stays open; later edits through it are not visible in the
    /// returned tree.
    pub fn snapshot(&self) -> IndexTree<V> {
        IndexTree {
            map: self.map.clone(),
        }
    }

    /// Finalize the edits into a new immutable version
    pub fn commit(self) -> IndexTree<V> {
        IndexTree { map: self.map }
    }
}

impl<V> fmt::Debug for TreeTxn<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeTxn")
            .field("len", &self.map.len())
            .finish()
    }
}
