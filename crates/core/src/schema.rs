//! Schema description for tables and their indexes
//!
//! A schema is fixed once a store is built from it. Tables and indexes are
//! kept in `BTreeMap`s so that every walk over them (initialization, insert,
//! delete) happens in the same name order on every run.
//!
//! # Identity index
//!
//! Every table must declare an index named [`ID_INDEX`] that is unique and
//! never missing. Deletes and upserts locate the stored form of an object
//! through it.
//!
//! # Example
//!
//! ```
//! use memdb_core::indexers::{StringFieldIndex, UintFieldIndex};
//! use memdb_core::schema::{DbSchema, IndexSchema, TableSchema};
//!
//! struct Person {
//!     id: String,
//!     age: u64,
//! }
//!
//! let schema = DbSchema::new().table(
//!     TableSchema::new("person")
//!         .index(IndexSchema::new("id", StringFieldIndex::new(|p: &Person| Some(p.id.clone()))).unique())
//!         .index(IndexSchema::new("age", UintFieldIndex::new(|p: &Person| Some(p.age)))),
//! );
//! assert!(schema.validate().is_ok());
//! ```

use crate::error::{Error, Result};
use crate::traits::Indexer;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Name of the identity index every table must declare
pub const ID_INDEX: &str = "id";

/// Schema of a single index
pub struct IndexSchema<T> {
    name: String,
    indexer: Arc<dyn Indexer<T>>,
    unique: bool,
    allow_missing: bool,
}

impl<T> IndexSchema<T> {
    /// Create a non-unique index that requires a value on every object
    pub fn new<I>(name: impl Into<String>, indexer: I) -> Self
    where
        I: Indexer<T> + 'static,
    {
        IndexSchema {
            name: name.into(),
            indexer: Arc::new(indexer),
            unique: false,
            allow_missing: false,
        }
    }

    /// Store at most one record per key
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Skip objects that have no value for this index instead of failing
    pub fn allow_missing(mut self) -> Self {
        self.allow_missing = true;
        self
    }

    /// Index name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key extraction capability
    pub fn indexer(&self) -> &dyn Indexer<T> {
        self.indexer.as_ref()
    }

    /// Whether the index stores at most one record per key
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Whether objects may lack a value for this index
    pub fn is_allow_missing(&self) -> bool {
        self.allow_missing
    }
}

impl<T> fmt::Debug for IndexSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexSchema")
            .field("name", &self.name)
            .field("unique", &self.unique)
            .field("allow_missing", &self.allow_missing)
            .finish_non_exhaustive()
    }
}

/// Schema of a table: its indexes by name
pub struct TableSchema<T> {
    name: String,
    indexes: BTreeMap<String, IndexSchema<T>>,
}

impl<T> TableSchema<T> {
    /// Create a table with no indexes
    pub fn new(name: impl Into<String>) -> Self {
        TableSchema {
            name: name.into(),
            indexes: BTreeMap::new(),
        }
    }

    /// Declare an index, replacing any earlier one with the same name
    pub fn index(mut self, index: IndexSchema<T>) -> Self {
        self.indexes.insert(index.name.clone(), index);
        self
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up an index by name
    pub fn get_index(&self, name: &str) -> Option<&IndexSchema<T>> {
        self.indexes.get(name)
    }

    /// Iterate indexes in name order
    pub fn indexes(&self) -> impl Iterator<Item = &IndexSchema<T>> {
        self.indexes.values()
    }

    /// The identity index
    pub fn id_index(&self) -> Result<&IndexSchema<T>> {
        self.get_index(ID_INDEX)
            .ok_or_else(|| Error::unknown_index(self.name.clone(), ID_INDEX))
    }

    /// Check this table's invariants
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::invalid_schema("missing table name"));
        }
        if self.indexes.is_empty() {
            return Err(Error::invalid_schema(format!(
                "table '{}' declares no indexes",
                self.name
            )));
        }
        for name in self.indexes.keys() {
            if name.is_empty() {
                return Err(Error::invalid_schema(format!(
                    "table '{}' has an index with no name",
                    self.name
                )));
            }
        }
        let id = self.get_index(ID_INDEX).ok_or_else(|| {
            Error::invalid_schema(format!(
                "table '{}' must have an '{}' index",
                self.name, ID_INDEX
            ))
        })?;
        if !id.unique {
            return Err(Error::invalid_schema(format!(
                "'{}' index on table '{}' must be unique",
                ID_INDEX, self.name
            )));
        }
        if id.allow_missing {
            return Err(Error::invalid_schema(format!(
                "'{}' index on table '{}' must not allow missing values",
                ID_INDEX, self.name
            )));
        }
        Ok(())
    }
}

impl<T> fmt::Debug for TableSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableSchema")
            .field("name", &self.name)
            .field("indexes", &self.indexes.values().collect::<Vec<_>>())
            .finish()
    }
}

/// Schema of a whole database: its tables by name
pub struct DbSchema<T> {
    tables: BTreeMap<String, TableSchema<T>>,
}

impl<T> DbSchema<T> {
    /// Create a schema with no tables
    pub fn new() -> Self {
        DbSchema {
            tables: BTreeMap::new(),
        }
    }

    /// Declare a table, replacing any earlier one with the same name
    pub fn table(mut self, table: TableSchema<T>) -> Self {
        self.tables.insert(table.name.clone(), table);
        self
    }

    /// Look up a table by name
    pub fn get_table(&self, name: &str) -> Option<&TableSchema<T>> {
        self.tables.get(name)
    }

    /// Iterate tables in name order
    pub fn tables(&self) -> impl Iterator<Item = &TableSchema<T>> {
        self.tables.values()
    }

    /// Check every table's invariants
    pub fn validate(&self) -> Result<()> {
        if self.tables.is_empty() {
            return Err(Error::invalid_schema("schema has no tables"));
        }
        for table in self.tables.values() {
            table.validate()?;
        }
        Ok(())
    }
}

impl<T> Default for DbSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for DbSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbSchema")
            .field("tables", &self.tables.values().collect::<Vec<_>>())
            .finish()
    }
}
