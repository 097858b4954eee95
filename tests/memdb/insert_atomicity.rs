//! A failed call leaves the transaction's working set untouched

use crate::fixtures::*;
use memdb::{Error, Transaction, Value};
use std::sync::Arc;

/// First result on every index for a fixed set of probes
fn probe(txn: &Transaction<'_, Person>) -> Vec<Option<Arc<Person>>> {
    let probes: [(&str, Vec<Value>); 5] = [
        ("id", vec!["a".into()]),
        ("id", vec!["b".into()]),
        ("age", vec![30u64.into()]),
        ("email", vec!["a@example.com".into()]),
        ("age_name", vec![30u64.into(), "A".into()]),
    ];
    probes
        .iter()
        .map(|(index, args)| txn.first(PERSON, index, args).unwrap())
        .collect()
}

#[test]
fn missing_required_field_changes_nothing() {
    let db = person_db();
    let mut txn = db.begin_write();
    txn.insert(PERSON, person("a", 30)).unwrap();
    let before = probe(&txn);

    let mut bad = person("b", 30);
    bad.email = None;
    let err = txn.insert(PERSON, bad).unwrap_err();
    assert!(matches!(err, Error::MissingIndexValue { ref index } if index == "email"));

    assert_eq!(probe(&txn), before);
    assert_eq!(ids(txn.get(PERSON, "age", &[30u64.into()]).unwrap()), vec!["a"]);
    txn.commit();

    let read = db.begin_read();
    assert_eq!(probe(&read), before);
}

#[test]
fn failed_upsert_keeps_previous_version() {
    let db = person_db();
    db.update(|txn| txn.insert(PERSON, person("a", 30))).unwrap();

    let mut txn = db.begin_write();
    let before = probe(&txn);
    let mut bad = person("a", 99);
    bad.email = None;
    assert!(txn.upsert(PERSON, bad).is_err());
    assert_eq!(probe(&txn), before);
}

#[test]
fn failed_update_closure_commits_nothing() {
    let db = person_db();
    let result = db.update(|txn| {
        txn.insert(PERSON, person("a", 30))?;
        let mut bad = person("b", 30);
        bad.email = None;
        txn.insert(PERSON, bad)
    });
    assert!(result.is_err());
    assert!(db.begin_read().iter_table(PERSON).unwrap().next().is_none());
}

#[test]
fn optional_index_may_be_absent() {
    let db = person_db();
    let mut txn = db.begin_write();
    txn.insert(PERSON, person("a", 30)).unwrap();
    assert!(txn.get_prefix(PERSON, "city", &["".into()]).unwrap().next().is_none());

    let mut with_city = person("b", 31);
    with_city.city = Some("Lima".to_string());
    txn.insert(PERSON, with_city).unwrap();
    assert_eq!(
        ids(txn.get_prefix(PERSON, "city", &["".into()]).unwrap()),
        vec!["b"]
    );
}

#[test]
fn delete_of_absent_object_is_not_found() {
    let db = person_db();
    let mut txn = db.begin_write();
    txn.insert(PERSON, person("a", 30)).unwrap();
    let before = probe(&txn);

    let err = txn.delete(PERSON, &person("zzz", 30)).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(probe(&txn), before);
}
