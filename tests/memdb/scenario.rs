//! End-to-end usage of a person table

use crate::fixtures::*;
use memdb::Value;

#[test]
fn insert_commit_then_query() {
    let db = person_db();
    let mut txn = db.begin_write();
    txn.insert(PERSON, person("a", 30)).unwrap();
    txn.insert(PERSON, person("b", 30)).unwrap();
    txn.commit();

    let read = db.begin_read();
    assert_eq!(ids(read.get(PERSON, "age", &[30u64.into()]).unwrap()), vec!["a", "b"]);

    let a = read.first(PERSON, "id", &["a".into()]).unwrap().unwrap();
    assert_eq!(*a, person("a", 30));

    assert!(read.first(PERSON, "id", &["c".into()]).unwrap().is_none());
}

#[test]
fn lookup_by_every_index() {
    let db = person_db();
    let mut ann = person("ann", 41);
    ann.city = Some("Berlin".to_string());
    db.update(|txn| txn.insert(PERSON, ann.clone())).unwrap();

    let read = db.begin_read();
    let by = |index: &str, args: &[Value]| read.first(PERSON, index, args).unwrap();

    assert_eq!(by("id", &["ann".into()]).as_deref(), Some(&ann));
    assert_eq!(by("age", &[41u64.into()]).as_deref(), Some(&ann));
    assert_eq!(by("email", &["ann@example.com".into()]).as_deref(), Some(&ann));
    // city is folded to lowercase on both sides
    assert_eq!(by("city", &["BERLIN".into()]).as_deref(), Some(&ann));
    assert_eq!(
        by("age_name", &[41u64.into(), "ANN".into()]).as_deref(),
        Some(&ann)
    );
}

#[test]
fn range_and_prefix_scans() {
    let db = person_db();
    db.update(|txn| {
        for (id, age) in [("al", 20), ("bo", 35), ("cy", 35), ("di", 50)] {
            txn.insert(PERSON, person(id, age))?;
        }
        Ok(())
    })
    .unwrap();

    let read = db.begin_read();
    assert_eq!(
        ids(read.lower_bound(PERSON, "age", &[30u64.into()]).unwrap()),
        vec!["bo", "cy", "di"]
    );
    // Compound prefix on the first component only
    assert_eq!(
        ids(read.get_prefix(PERSON, "age_name", &[35u64.into()]).unwrap()),
        vec!["bo", "cy"]
    );
    // Compound prefix with a partial second component
    assert_eq!(
        ids(read.get_prefix(PERSON, "age_name", &[35u64.into(), "C".into()]).unwrap()),
        vec!["cy"]
    );
    assert_eq!(
        ids(read.get_prefix(PERSON, "id", &["b".into()]).unwrap()),
        vec!["bo"]
    );
}

#[test]
fn delete_removes_from_every_index() {
    let db = person_db();
    let mut obj = person("a", 30);
    obj.city = Some("Oslo".to_string());
    db.update(|txn| txn.insert(PERSON, obj.clone())).unwrap();
    db.update(|txn| txn.delete(PERSON, &obj)).unwrap();

    let read = db.begin_read();
    for (index, args) in [
        ("id", vec![Value::from("a")]),
        ("age", vec![Value::from(30u64)]),
        ("email", vec![Value::from("a@example.com")]),
        ("city", vec![Value::from("oslo")]),
        ("age_name", vec![Value::from(30u64), Value::from("A")]),
    ] {
        assert!(
            read.first(PERSON, index, &args).unwrap().is_none(),
            "still present in index {}",
            index
        );
    }
}

#[test]
fn upsert_moves_secondary_keys() {
    let db = person_db();
    db.update(|txn| txn.insert(PERSON, person("a", 30))).unwrap();
    db.update(|txn| txn.upsert(PERSON, person("a", 31))).unwrap();

    let read = db.begin_read();
    assert!(read.get(PERSON, "age", &[30u64.into()]).unwrap().next().is_none());
    assert_eq!(ids(read.get(PERSON, "age", &[31u64.into()]).unwrap()), vec!["a"]);
}

#[test]
fn change_tracking_reports_committed_changes() {
    let db = person_db();
    let mut txn = db.begin_write();
    txn.track_changes();
    txn.insert(PERSON, person("a", 1)).unwrap();
    txn.upsert(PERSON, person("a", 2)).unwrap();
    txn.commit();

    let changes = txn.changes();
    assert_eq!(changes.len(), 2);
    assert!(changes[0].created());
    assert!(changes[1].updated());
    assert_eq!(changes[1].after.as_ref().map(|p| p.age), Some(2));
}
