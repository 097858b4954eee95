//! Core traits for index key extraction
//!
//! An [`Indexer`] turns either a stored object or a list of query arguments
//! into key bytes in the same ordered key space. The transaction layer never
//! looks inside objects; everything it knows about them comes through this
//! trait.

use crate::error::IndexError;
use crate::value::Value;

/// Key extraction capability attached to every declared index
///
/// Thread safety: schemas are shared by all transactions, so indexers must
/// be `Send + Sync`.
///
/// # Contract
///
/// For any object `o` and arguments `a` that describe the same field value,
/// `from_object(o) == Ok(Some(from_args(a)?))`. Key bytes are compared
/// lexicographically, so encodings must preserve the intended ordering.
pub trait Indexer<T>: Send + Sync {
    /// Extract this index's key from an object
    ///
    /// Returns `Ok(None)` when the object has no value for the index. Whether
    /// that is acceptable is decided by the index's `allow_missing` flag, not
    /// by the indexer.
    fn from_object(&self, obj: &T) -> Result<Option<Vec<u8>>, IndexError>;

    /// Encode query arguments into an exact-match key
    fn from_args(&self, args: &[Value]) -> Result<Vec<u8>, IndexError>;

    /// Encode query arguments into a key prefix
    ///
    /// The default returns the exact key, which is correct for fixed-width
    /// encodings. Variable-width encodings that terminate their keys must
    /// override this to drop the terminator.
    fn prefix_from_args(&self, args: &[Value]) -> Result<Vec<u8>, IndexError> {
        self.from_args(args)
    }
}

/// Check that exactly `expected` arguments were supplied
pub fn expect_args(args: &[Value], expected: usize) -> Result<(), IndexError> {
    if args.len() != expected {
        return Err(IndexError::ArgCount {
            expected,
            got: args.len(),
        });
    }
    Ok(())
}
