//! Index path codec
//!
//! The root tree stores one index tree per (table, index) pair under a path
//! key. The path is the table name prefixed by its length, followed by the
//! index name:
//!
//! ```text
//! +----------------+-----------------+-----------------+
//! | table_len (u32 |  table (UTF-8)  |  index (UTF-8)  |
//! |  big-endian)   |                 |                 |
//! +----------------+-----------------+-----------------+
//! ```
//!
//! The length prefix fixes where the table name ends, so two distinct pairs
//! can never produce the same path.

use byteorder::{BigEndian, ByteOrder};

const LEN_PREFIX: usize = 4;

/// Encode the root-tree path of an index
pub fn index_path(table: &str, index: &str) -> Vec<u8> {
    let mut path = vec![0u8; LEN_PREFIX];
    BigEndian::write_u32(&mut path, table.len() as u32);
    path.reserve(table.len() + index.len());
    path.extend_from_slice(table.as_bytes());
    path.extend_from_slice(index.as_bytes());
    path
}

/// Split a path back into (table, index)
///
/// Returns `None` if the bytes are not a well-formed path.
pub fn decode_index_path(path: &[u8]) -> Option<(String, String)> {
    if path.len() < LEN_PREFIX {
        return None;
    }
    let table_len = BigEndian::read_u32(&path[..LEN_PREFIX]) as usize;
    let rest = &path[LEN_PREFIX..];
    if rest.len() < table_len {
        return None;
    }
    let (table, index) = rest.split_at(table_len);
    let table = std::str::from_utf8(table).ok()?;
    let index = std::str::from_utf8(index).ok()?;
    Some((table.to_string(), index.to_string()))
}
