//! Write transactions never overlap

use crate::fixtures::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Barrier;
use std::thread;
use std::time::Duration;

#[test]
fn second_begin_write_waits_for_commit() {
    let db = person_db();
    let committed = AtomicBool::new(false);

    let mut first = db.begin_write();
    thread::scope(|s| {
        let waiter = s.spawn(|| {
            let mut second = db.begin_write();
            let saw_commit = committed.load(Ordering::SeqCst);
            // The first writer's insert is already published
            let seen = second.first(PERSON, "id", &["a".into()]).unwrap().is_some();
            second.abort();
            saw_commit && seen
        });

        thread::sleep(Duration::from_millis(50));
        first.insert(PERSON, person("a", 1)).unwrap();
        committed.store(true, Ordering::SeqCst);
        first.commit();

        assert!(waiter.join().unwrap());
    });
}

#[test]
fn second_begin_write_waits_for_abort() {
    let db = person_db();
    let aborted = AtomicBool::new(false);

    let mut first = db.begin_write();
    thread::scope(|s| {
        let waiter = s.spawn(|| {
            let second = db.begin_write();
            aborted.load(Ordering::SeqCst) && second.is_active()
        });

        thread::sleep(Duration::from_millis(50));
        aborted.store(true, Ordering::SeqCst);
        first.abort();

        assert!(waiter.join().unwrap());
    });
}

#[test]
fn try_begin_write_times_out_then_succeeds() {
    let db = person_db();
    let mut holder = db.begin_write();
    assert!(db.try_begin_write_for(Duration::from_millis(20)).is_none());
    holder.commit();
    assert!(db.try_begin_write_for(Duration::from_millis(20)).is_some());
}

#[test]
fn writers_from_many_threads_are_exclusive() {
    const THREADS: usize = 6;
    const PER_THREAD: usize = 30;

    let db = person_db();
    let inside = AtomicUsize::new(0);
    let overlapped = AtomicBool::new(false);
    let barrier = Barrier::new(THREADS);

    thread::scope(|s| {
        for t in 0..THREADS {
            let (db, inside, overlapped, barrier) = (&db, &inside, &overlapped, &barrier);
            s.spawn(move || {
                barrier.wait();
                for i in 0..PER_THREAD {
                    db.update(|txn| {
                        if inside.fetch_add(1, Ordering::SeqCst) != 0 {
                            overlapped.store(true, Ordering::SeqCst);
                        }
                        let res = txn.insert(PERSON, person(&format!("t{}-{}", t, i), i as u64));
                        inside.fetch_sub(1, Ordering::SeqCst);
                        res
                    })
                    .unwrap();
                }
            });
        }
    });

    assert!(!overlapped.load(Ordering::SeqCst));
    let stats = db.stats();
    assert_eq!(stats.commits, (THREADS * PER_THREAD) as u64);
    assert_eq!(stats.active_writes(), 0);
    assert_eq!(
        db.begin_read().iter_table(PERSON).unwrap().count(),
        THREADS * PER_THREAD
    );
}
