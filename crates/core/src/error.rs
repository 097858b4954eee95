//! Error types for memdb
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Two layers exist:
//! - [`IndexError`]: raised by an [`Indexer`](crate::traits::Indexer) while
//!   turning an object or query arguments into key bytes. It knows nothing
//!   about tables or index names.
//! - [`Error`]: raised by transactions and schema handling. Indexer failures
//!   are wrapped with the failing index name attached.

use thiserror::Error;

/// Result type alias for memdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the memdb store
#[derive(Debug, Error)]
pub enum Error {
    /// Mutation attempted on a read-only transaction
    #[error("cannot {operation} in read-only transaction")]
    ReadOnlyViolation {
        /// Operation that was attempted
        operation: &'static str,
    },

    /// Table is not declared in the schema
    #[error("invalid table '{0}'")]
    UnknownTable(String),

    /// Index is not declared on the table
    #[error("invalid index '{index}' on table '{table}'")]
    UnknownIndex {
        /// Table name
        table: String,
        /// Index name
        index: String,
    },

    /// A required index could not extract a value from the object
    #[error("missing value for index '{index}'")]
    MissingIndexValue {
        /// Index name
        index: String,
    },

    /// The indexer failed while extracting a key from an object
    #[error("failed to build index '{index}': {source}")]
    IndexCompute {
        /// Index name
        index: String,
        /// Underlying indexer failure
        #[source]
        source: IndexError,
    },

    /// The indexer rejected the query arguments
    #[error("index error on '{index}': {source}")]
    IndexArgs {
        /// Index name
        index: String,
        /// Underlying indexer failure
        #[source]
        source: IndexError,
    },

    /// Delete target is not present in the table
    #[error("object not found in table '{table}'")]
    NotFound {
        /// Table name
        table: String,
    },

    /// Transaction was used after it was committed or aborted
    #[error("transaction is not active (state: {state})")]
    TransactionNotActive {
        /// Current transaction state
        state: String,
    },

    /// Schema failed validation
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// Configuration could not be read or parsed
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create an UnknownIndex error
    pub fn unknown_index(table: impl Into<String>, index: impl Into<String>) -> Self {
        Error::UnknownIndex {
            table: table.into(),
            index: index.into(),
        }
    }

    /// Create an InvalidSchema error
    pub fn invalid_schema(reason: impl Into<String>) -> Self {
        Error::InvalidSchema(reason.into())
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

/// Errors raised by indexers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// Wrong number of query arguments
    #[error("expected {expected} argument(s), got {got}")]
    ArgCount {
        /// Number of arguments the indexer needs
        expected: usize,
        /// Number of arguments supplied
        got: usize,
    },

    /// Argument has the wrong type
    #[error("argument {position} must be {expected}, got {got}")]
    ArgType {
        /// Zero-based argument position
        position: usize,
        /// Expected type name
        expected: &'static str,
        /// Supplied type name
        got: &'static str,
    },

    /// Argument has the right type but an unusable value
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Extraction from the object failed
    #[error("{0}")]
    Extract(String),
}
