//! Random operation sequences checked against a BTreeMap model

use crate::fixtures::*;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
enum Op {
    Upsert(u8, u64),
    Delete(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u8..8, 0u64..4).prop_map(|(id, age)| Op::Upsert(id, age)),
        1 => (0u8..8).prop_map(Op::Delete),
    ]
}

fn batch_strategy() -> impl Strategy<Value = (Vec<Op>, bool)> {
    (prop::collection::vec(op_strategy(), 0..12), prop::bool::weighted(0.8))
}

fn key(id: u8) -> String {
    format!("k{}", id)
}

fn check_against_model(db: &memdb::Database<Person>, model: &BTreeMap<String, u64>) {
    let read = db.begin_read();

    let stored = ids(read.iter_table(PERSON).unwrap());
    let expected: Vec<String> = model.keys().cloned().collect();
    assert_eq!(stored, expected);

    for (id, age) in model {
        let found = read.first(PERSON, "id", &[id.as_str().into()]).unwrap().unwrap();
        assert_eq!(found.age, *age);
    }

    for age in 0..4u64 {
        let got: BTreeSet<String> = ids(read.get(PERSON, "age", &[age.into()]).unwrap())
            .into_iter()
            .collect();
        let want: BTreeSet<String> = model
            .iter()
            .filter(|(_, a)| **a == age)
            .map(|(id, _)| id.clone())
            .collect();
        assert_eq!(got, want, "age index mismatch at {}", age);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn committed_state_matches_model(batches in prop::collection::vec(batch_strategy(), 1..8)) {
        let db = person_db();
        let mut model: BTreeMap<String, u64> = BTreeMap::new();

        for (ops, commit) in batches {
            let mut pending = model.clone();
            let mut txn = db.begin_write();
            for op in ops {
                match op {
                    Op::Upsert(id, age) => {
                        txn.upsert(PERSON, person(&key(id), age)).unwrap();
                        pending.insert(key(id), age);
                    }
                    Op::Delete(id) => match txn.delete(PERSON, &person(&key(id), 0)) {
                        Ok(()) => {
                            pending.remove(&key(id));
                        }
                        Err(e) => prop_assert!(e.is_not_found()),
                    },
                }
            }
            if commit {
                txn.commit();
                model = pending;
            } else {
                txn.abort();
            }
            check_against_model(&db, &model);
        }
    }

    #[test]
    fn snapshot_taken_mid_sequence_is_frozen(
        first in prop::collection::vec((0u8..8, 0u64..4), 1..10),
        second in prop::collection::vec((0u8..8, 0u64..4), 1..10),
    ) {
        let db = person_db();
        let mut model = BTreeMap::new();
        db.update(|txn| {
            for (id, age) in &first {
                txn.upsert(PERSON, person(&key(*id), *age))?;
                model.insert(key(*id), *age);
            }
            Ok(())
        }).unwrap();

        let frozen = db.snapshot();
        db.update(|txn| {
            for (id, age) in &second {
                txn.upsert(PERSON, person(&key(*id), *age))?;
            }
            Ok(())
        }).unwrap();

        check_against_model(&frozen, &model);
    }
}
