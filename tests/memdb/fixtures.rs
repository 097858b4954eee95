//! Shared schema and records for the integration tests

use memdb::{
    CompoundIndex, Database, DbSchema, IndexSchema, StringFieldIndex, TableSchema,
    UintFieldIndex,
};

pub const PERSON: &str = "person";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub age: u64,
    pub email: Option<String>,
    pub city: Option<String>,
}

pub fn person(id: &str, age: u64) -> Person {
    Person {
        id: id.to_string(),
        name: id.to_uppercase(),
        age,
        email: Some(format!("{}@example.com", id)),
        city: None,
    }
}

/// Indexes:
/// - `id`: unique, required
/// - `age`: non-unique, required
/// - `email`: unique, required
/// - `city`: non-unique, lowercase, optional
/// - `age_name`: compound (age, name), required
pub fn person_schema() -> DbSchema<Person> {
    DbSchema::new().table(
        TableSchema::new(PERSON)
            .index(
                IndexSchema::new("id", StringFieldIndex::new(|p: &Person| Some(p.id.clone())))
                    .unique(),
            )
            .index(IndexSchema::new(
                "age",
                UintFieldIndex::new(|p: &Person| Some(p.age)),
            ))
            .index(
                IndexSchema::new(
                    "email",
                    StringFieldIndex::new(|p: &Person| p.email.clone()),
                )
                .unique(),
            )
            .index(
                IndexSchema::new(
                    "city",
                    StringFieldIndex::new(|p: &Person| p.city.clone()).lowercase(),
                )
                .allow_missing(),
            )
            .index(IndexSchema::new(
                "age_name",
                CompoundIndex::new()
                    .with(UintFieldIndex::new(|p: &Person| Some(p.age)))
                    .with(StringFieldIndex::new(|p: &Person| Some(p.name.clone()))),
            )),
    )
}

pub fn person_db() -> Database<Person> {
    Database::new(person_schema()).unwrap()
}

pub fn ids<I>(iter: I) -> Vec<String>
where
    I: IntoIterator<Item = std::sync::Arc<Person>>,
{
    iter.into_iter().map(|p| p.id.clone()).collect()
}
