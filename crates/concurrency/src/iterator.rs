//! Lazy result iteration over one index
//!
//! A [`ResultIterator`] owns a snapshot of the index tree it walks, so it is
//! unaffected by anything that happens after it was created, including later
//! writes by the transaction that created it.
//!
//! Each step re-seeks the tree from the last visited key. That keeps the
//! iterator free of borrows (it can outlive the transaction) at the cost of
//! one O(log n) descent per distinct key.

use memdb_storage::{Bucket, IndexTree};
use std::iter::FusedIterator;
use std::ops::Bound;
use std::sync::Arc;

/// Which keys a scan visits
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Scan {
    /// Only the bucket stored at exactly this key
    Exact(Vec<u8>),
    /// Every key starting with this prefix
    Prefix(Vec<u8>),
    /// Every key greater than or equal to this one
    From(Vec<u8>),
}

impl Scan {
    fn start(&self) -> &[u8] {
        match self {
            Scan::Exact(k) | Scan::Prefix(k) | Scan::From(k) => k,
        }
    }

    fn matches(&self, key: &[u8]) -> bool {
        match self {
            Scan::Exact(k) => key == k.as_slice(),
            Scan::Prefix(p) => key.starts_with(p),
            Scan::From(_) => true,
        }
    }
}

fn as_slice_bound(bound: &Bound<Vec<u8>>) -> Bound<&[u8]> {
    match bound {
        Bound::Included(k) => Bound::Included(k.as_slice()),
        Bound::Excluded(k) => Bound::Excluded(k.as_slice()),
        Bound::Unbounded => Bound::Unbounded,
    }
}

/// Ordered, one-shot sequence of records from one index
///
/// Records come out in index key order; records sharing a key in a
/// non-unique index come out in insertion order.
pub struct ResultIterator<T> {
    tree: IndexTree<Bucket<T>>,
    scan: Scan,
    // None once the scan has passed its last matching key
    cursor: Option<Bound<Vec<u8>>>,
    bucket: Option<(Bucket<T>, usize)>,
}

impl<T> ResultIterator<T> {
    pub(crate) fn new(tree: IndexTree<Bucket<T>>, scan: Scan) -> Self {
        let cursor = Some(Bound::Included(scan.start().to_vec()));
        ResultIterator {
            tree,
            scan,
            cursor,
            bucket: None,
        }
    }

    fn next_bucket(&mut self) -> Option<Bucket<T>> {
        let cursor = self.cursor.take()?;
        let (key, bucket) = self.tree.seek(as_slice_bound(&cursor))?;
        if !self.scan.matches(&key) {
            return None;
        }
        if !matches!(self.scan, Scan::Exact(_)) {
            self.cursor = Some(Bound::Excluded(key));
        }
        Some(bucket)
    }
}

impl<T> Iterator for ResultIterator<T> {
    type Item = Arc<T>;

    fn next(&mut self) -> Option<Arc<T>> {
        loop {
            if let Some((bucket, pos)) = self.bucket.as_mut() {
                if let Some(entry) = bucket.get(*pos) {
                    *pos += 1;
                    return Some(Arc::clone(entry.object()));
                }
            }
            let bucket = self.next_bucket()?;
            self.bucket = Some((bucket, 0));
        }
    }
}

impl<T> FusedIterator for ResultIterator<T> {}
