//! Transaction state machine

use crate::fixtures::*;
use memdb::{Error, TransactionState};
use std::cell::Cell;

#[test]
fn commit_twice_publishes_once() {
    let db = person_db();
    let mut txn = db.begin_write();
    txn.insert(PERSON, person("a", 1)).unwrap();
    txn.commit();
    let root = db.store().current_root();
    txn.commit();
    txn.abort();

    assert_eq!(txn.state(), TransactionState::Committed);
    let stats = db.stats();
    assert_eq!((stats.commits, stats.aborts), (1, 0));
    // Nothing republished by the repeated calls
    assert_eq!(db.store().current_root().len(), root.len());
    assert!(db.begin_read().first(PERSON, "id", &["a".into()]).unwrap().is_some());

    // The lock is free exactly once
    let mut next = db.begin_write();
    next.commit();
}

#[test]
fn abort_twice_is_harmless() {
    let db = person_db();
    let mut txn = db.begin_write();
    txn.abort();
    txn.abort();
    txn.commit();
    assert_eq!(txn.state(), TransactionState::Aborted);
    assert_eq!(db.stats().aborts, 1);
    drop(db.begin_write());
}

#[test]
fn read_transaction_terminates_repeatedly() {
    let db = person_db();
    let mut read = db.begin_read();
    assert!(!read.is_write());
    read.commit();
    read.abort();
    read.commit();
    assert_eq!(read.state(), TransactionState::Committed);
}

#[test]
fn writes_rejected_on_read_transaction() {
    let db = person_db();
    let mut read = db.begin_read();
    assert!(matches!(
        read.insert(PERSON, person("a", 1)),
        Err(Error::ReadOnlyViolation { .. })
    ));
    assert!(matches!(
        read.delete_all(PERSON, "age", &[1u64.into()]),
        Err(Error::ReadOnlyViolation { .. })
    ));
}

#[test]
fn operations_after_termination_are_precondition_errors() {
    let db = person_db();
    let mut txn = db.begin_write();
    txn.abort();
    let err = txn.insert(PERSON, person("a", 1)).unwrap_err();
    assert!(matches!(err, Error::TransactionNotActive { ref state } if state == "aborted"));
    assert!(txn.get(PERSON, "age", &[1u64.into()]).is_err());
}

#[test]
fn dropped_writer_aborts() {
    let db = person_db();
    {
        let mut txn = db.begin_write();
        txn.insert(PERSON, person("a", 1)).unwrap();
    }
    assert!(db.begin_read().first(PERSON, "id", &["a".into()]).unwrap().is_none());
    assert_eq!(db.stats().aborts, 1);
    assert_eq!(db.stats().active_writes(), 0);
}

#[test]
fn deferred_hooks_run_after_lock_release() {
    let db = person_db();
    let lock_free = Cell::new(false);
    {
        let mut txn = db.begin_write();
        txn.insert(PERSON, person("a", 1)).unwrap();
        txn.defer(|| {
            let probe = db.try_begin_write_for(std::time::Duration::from_millis(0));
            lock_free.set(probe.is_some());
        });
        txn.commit();
    }
    assert!(lock_free.get());
}

#[test]
fn unknown_names_are_reported() {
    let db = person_db();
    let read = db.begin_read();
    assert!(matches!(
        read.first("pet", "id", &["a".into()]),
        Err(Error::UnknownTable(ref t)) if t == "pet"
    ));
    assert!(matches!(
        read.first(PERSON, "height", &[1u64.into()]),
        Err(Error::UnknownIndex { ref index, .. }) if index == "height"
    ));
    assert!(matches!(
        read.first(PERSON, "age", &["old".into()]),
        Err(Error::IndexArgs { ref index, .. }) if index == "age"
    ));
}
