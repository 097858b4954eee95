//! Built-in indexers
//!
//! Each field indexer is built from an accessor closure that reads the field
//! from the object. Returning `None` from the accessor means the object has no
//! value for this index.
//!
//! Key encodings are chosen so that byte order matches value order:
//!
//! | Indexer            | Encoding                                   |
//! |--------------------|--------------------------------------------|
//! | `StringFieldIndex` | UTF-8 bytes + `0x00` terminator (no NULs)  |
//! | `UintFieldIndex`   | 8 bytes big-endian                         |
//! | `IntFieldIndex`    | 8 bytes big-endian, sign bit flipped       |
//! | `BoolFieldIndex`   | 1 byte (`0` or `1`)                        |
//! | `UuidFieldIndex`   | 16 raw bytes                               |
//! | `CompoundIndex`    | concatenation of the sub-indexer keys      |

use crate::error::IndexError;
use crate::traits::{expect_args, Indexer};
use crate::value::Value;
use byteorder::{BigEndian, ByteOrder};
use std::sync::Arc;
use uuid::Uuid;

type Accessor<T, V> = Arc<dyn Fn(&T) -> Option<V> + Send + Sync>;

fn arg_type(position: usize, expected: &'static str, got: &Value) -> IndexError {
    IndexError::ArgType {
        position,
        expected,
        got: got.type_name(),
    }
}

fn encode_u64(v: u64) -> Vec<u8> {
    let mut buf = [0u8; 8];
    BigEndian::write_u64(&mut buf, v);
    buf.to_vec()
}

// ============================================================================
// String
// ============================================================================

/// Index over a string field
///
/// Empty strings count as missing. With [`lowercase`](Self::lowercase) both
/// stored values and query arguments are folded to lowercase.
///
/// Strings containing `\0` are rejected: the terminator must be the only
/// NUL in the key, or compound keys built from string parts could collide.
pub struct StringFieldIndex<T> {
    field: Accessor<T, String>,
    lowercase: bool,
}

impl<T> StringFieldIndex<T> {
    /// Create an index reading the field through `field`
    pub fn new<F>(field: F) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        StringFieldIndex {
            field: Arc::new(field),
            lowercase: false,
        }
    }

    /// Fold values to lowercase before encoding
    pub fn lowercase(mut self) -> Self {
        self.lowercase = true;
        self
    }

    fn encode(&self, s: &str, terminate: bool) -> Vec<u8> {
        let mut key = if self.lowercase {
            s.to_lowercase().into_bytes()
        } else {
            s.as_bytes().to_vec()
        };
        if terminate {
            key.push(0);
        }
        key
    }

    fn string_arg<'a>(&self, args: &'a [Value]) -> Result<&'a str, IndexError> {
        expect_args(args, 1)?;
        let s = args[0]
            .as_str()
            .ok_or_else(|| arg_type(0, "String", &args[0]))?;
        if s.contains('\0') {
            return Err(IndexError::InvalidArg(
                "string argument contains a NUL byte".to_string(),
            ));
        }
        Ok(s)
    }
}

impl<T> Indexer<T> for StringFieldIndex<T> {
    fn from_object(&self, obj: &T) -> Result<Option<Vec<u8>>, IndexError> {
        match (self.field)(obj) {
            Some(s) if s.contains('\0') => Err(IndexError::Extract(
                "string value contains a NUL byte".to_string(),
            )),
            Some(s) if !s.is_empty() => Ok(Some(self.encode(&s, true))),
            _ => Ok(None),
        }
    }

    fn from_args(&self, args: &[Value]) -> Result<Vec<u8>, IndexError> {
        let s = self.string_arg(args)?;
        Ok(self.encode(s, true))
    }

    fn prefix_from_args(&self, args: &[Value]) -> Result<Vec<u8>, IndexError> {
        let s = self.string_arg(args)?;
        Ok(self.encode(s, false))
    }
}

// ============================================================================
// Integers
// ============================================================================

/// Index over an unsigned integer field
pub struct UintFieldIndex<T> {
    field: Accessor<T, u64>,
}

impl<T> UintFieldIndex<T> {
    /// Create an index reading the field through `field`
    pub fn new<F>(field: F) -> Self
    where
        F: Fn(&T) -> Option<u64> + Send + Sync + 'static,
    {
        UintFieldIndex {
            field: Arc::new(field),
        }
    }
}

impl<T> Indexer<T> for UintFieldIndex<T> {
    fn from_object(&self, obj: &T) -> Result<Option<Vec<u8>>, IndexError> {
        Ok((self.field)(obj).map(encode_u64))
    }

    fn from_args(&self, args: &[Value]) -> Result<Vec<u8>, IndexError> {
        expect_args(args, 1)?;
        match &args[0] {
            Value::Uint(v) => Ok(encode_u64(*v)),
            Value::Int(v) => u64::try_from(*v).map(encode_u64).map_err(|_| {
                IndexError::InvalidArg(format!("negative value {} for unsigned index", v))
            }),
            other => Err(arg_type(0, "Uint", other)),
        }
    }
}

/// Index over a signed integer field
pub struct IntFieldIndex<T> {
    field: Accessor<T, i64>,
}

impl<T> IntFieldIndex<T> {
    /// Create an index reading the field through `field`
    pub fn new<F>(field: F) -> Self
    where
        F: Fn(&T) -> Option<i64> + Send + Sync + 'static,
    {
        IntFieldIndex {
            field: Arc::new(field),
        }
    }

    // Flip the sign bit so negatives sort below positives.
    fn encode(v: i64) -> Vec<u8> {
        encode_u64((v as u64) ^ (1 << 63))
    }
}

impl<T> Indexer<T> for IntFieldIndex<T> {
    fn from_object(&self, obj: &T) -> Result<Option<Vec<u8>>, IndexError> {
        Ok((self.field)(obj).map(Self::encode))
    }

    fn from_args(&self, args: &[Value]) -> Result<Vec<u8>, IndexError> {
        expect_args(args, 1)?;
        match &args[0] {
            Value::Int(v) => Ok(Self::encode(*v)),
            Value::Uint(v) => i64::try_from(*v).map(Self::encode).map_err(|_| {
                IndexError::InvalidArg(format!("value {} out of range for signed index", v))
            }),
            other => Err(arg_type(0, "Int", other)),
        }
    }
}

// ============================================================================
// Bool
// ============================================================================

/// Index over a boolean field
pub struct BoolFieldIndex<T> {
    field: Accessor<T, bool>,
}

impl<T> BoolFieldIndex<T> {
    /// Create an index reading the field through `field`
    pub fn new<F>(field: F) -> Self
    where
        F: Fn(&T) -> Option<bool> + Send + Sync + 'static,
    {
        BoolFieldIndex {
            field: Arc::new(field),
        }
    }
}

impl<T> Indexer<T> for BoolFieldIndex<T> {
    fn from_object(&self, obj: &T) -> Result<Option<Vec<u8>>, IndexError> {
        Ok((self.field)(obj).map(|b| vec![u8::from(b)]))
    }

    fn from_args(&self, args: &[Value]) -> Result<Vec<u8>, IndexError> {
        expect_args(args, 1)?;
        args[0]
            .as_bool()
            .map(|b| vec![u8::from(b)])
            .ok_or_else(|| arg_type(0, "Bool", &args[0]))
    }
}

// ============================================================================
// UUID
// ============================================================================

/// Index over a UUID field
///
/// Query arguments may be a `Value::Uuid`, a hyphenated string, or 16 raw
/// bytes.
pub struct UuidFieldIndex<T> {
    field: Accessor<T, Uuid>,
}

impl<T> UuidFieldIndex<T> {
    /// Create an index reading the field through `field`
    pub fn new<F>(field: F) -> Self
    where
        F: Fn(&T) -> Option<Uuid> + Send + Sync + 'static,
    {
        UuidFieldIndex {
            field: Arc::new(field),
        }
    }
}

impl<T> Indexer<T> for UuidFieldIndex<T> {
    fn from_object(&self, obj: &T) -> Result<Option<Vec<u8>>, IndexError> {
        Ok((self.field)(obj).map(|u| u.as_bytes().to_vec()))
    }

    fn from_args(&self, args: &[Value]) -> Result<Vec<u8>, IndexError> {
        expect_args(args, 1)?;
        let uuid = match &args[0] {
            Value::Uuid(u) => *u,
            Value::String(s) => Uuid::parse_str(s)
                .map_err(|e| IndexError::InvalidArg(format!("invalid UUID '{}': {}", s, e)))?,
            Value::Bytes(b) => Uuid::from_slice(b)
                .map_err(|e| IndexError::InvalidArg(format!("invalid UUID bytes: {}", e)))?,
            other => return Err(arg_type(0, "Uuid", other)),
        };
        Ok(uuid.as_bytes().to_vec())
    }
}

// ============================================================================
// Compound
// ============================================================================

/// Index over several fields at once
///
/// The key is the concatenation of every sub-indexer's key, so ordering is
/// by the first field, then the second, and so on. Exact queries take one
/// argument per sub-indexer. Prefix queries may take fewer; the last supplied
/// argument is itself encoded as a prefix.
pub struct CompoundIndex<T> {
    indexes: Vec<Arc<dyn Indexer<T>>>,
    allow_missing: bool,
}

impl<T> CompoundIndex<T> {
    /// Create an empty compound index
    pub fn new() -> Self {
        CompoundIndex {
            indexes: Vec::new(),
            allow_missing: false,
        }
    }

    /// Append a sub-indexer
    pub fn with<I>(mut self, indexer: I) -> Self
    where
        I: Indexer<T> + 'static,
    {
        self.indexes.push(Arc::new(indexer));
        self
    }

    /// Build keys from the leading present fields when later ones are missing
    ///
    /// The first field is always required.
    pub fn allow_missing(mut self) -> Self {
        self.allow_missing = true;
        self
    }

    fn reposition(err: IndexError, position: usize) -> IndexError {
        match err {
            IndexError::ArgType { expected, got, .. } => IndexError::ArgType {
                position,
                expected,
                got,
            },
            other => other,
        }
    }
}

impl<T> Default for CompoundIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Indexer<T> for CompoundIndex<T> {
    fn from_object(&self, obj: &T) -> Result<Option<Vec<u8>>, IndexError> {
        let mut key = Vec::new();
        for (i, indexer) in self.indexes.iter().enumerate() {
            match indexer.from_object(obj)? {
                Some(part) => key.extend_from_slice(&part),
                None if self.allow_missing && i > 0 => return Ok(Some(key)),
                None => return Ok(None),
            }
        }
        if self.indexes.is_empty() {
            return Ok(None);
        }
        Ok(Some(key))
    }

    fn from_args(&self, args: &[Value]) -> Result<Vec<u8>, IndexError> {
        expect_args(args, self.indexes.len())?;
        let mut key = Vec::new();
        for (i, (indexer, arg)) in self.indexes.iter().zip(args).enumerate() {
            let part = indexer
                .from_args(std::slice::from_ref(arg))
                .map_err(|e| Self::reposition(e, i))?;
            key.extend_from_slice(&part);
        }
        Ok(key)
    }

    fn prefix_from_args(&self, args: &[Value]) -> Result<Vec<u8>, IndexError> {
        if args.is_empty() || args.len() > self.indexes.len() {
            return Err(IndexError::ArgCount {
                expected: self.indexes.len(),
                got: args.len(),
            });
        }
        let last = args.len() - 1;
        let mut key = Vec::new();
        for (i, (indexer, arg)) in self.indexes.iter().zip(args).enumerate() {
            let arg = std::slice::from_ref(arg);
            let part = if i == last {
                indexer.prefix_from_args(arg)
            } else {
                indexer.from_args(arg)
            }
            .map_err(|e| Self::reposition(e, i))?;
            key.extend_from_slice(&part);
        }
        Ok(key)
    }
}
