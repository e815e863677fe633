//! Unit tests for environment guards.

use std::sync::{Arc, Barrier};
use std::thread;

use super::{lock, remove_var, scope_with, set_var};

fn current(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[test]
fn set_var_restores_absent_key() {
    let key = "STRATA_HELPERS_ABSENT";
    {
        let _guard = set_var(key, "tmp");
        assert_eq!(current(key).as_deref(), Some("tmp"));
    }
    assert_eq!(current(key), None);
}

#[test]
fn remove_var_restores_previous_value() {
    let key = "STRATA_HELPERS_REMOVE";
    let _outer = set_var(key, "before");
    {
        let _guard = remove_var(key);
        assert_eq!(current(key), None);
    }
    assert_eq!(current(key).as_deref(), Some("before"));
}

#[test]
fn stacked_guards_unwind_in_lifo_order() {
    let key = "STRATA_HELPERS_STACK";
    let first = set_var(key, "v1");
    let second = set_var(key, "v2");
    assert_eq!(current(key).as_deref(), Some("v2"));
    drop(second);
    assert_eq!(current(key).as_deref(), Some("v1"));
    drop(first);
    assert_eq!(current(key), None);
}

#[test]
fn scopes_restore_every_guard() {
    let keys = ["STRATA_HELPERS_SCOPE_A", "STRATA_HELPERS_SCOPE_B"];
    {
        let _scope = scope_with(|held| keys.iter().map(|k| held.set_var(*k, "x")).collect());
        for key in keys {
            assert_eq!(current(key).as_deref(), Some("x"));
        }
    }
    for key in keys {
        assert_eq!(current(key), None);
    }
}

#[test]
fn lock_is_reentrant() {
    let held = lock();
    let _guard = set_var("STRATA_HELPERS_REENTRANT", "1");
    let _inner = held.set_var("STRATA_HELPERS_REENTRANT_INNER", "2");
    assert_eq!(current("STRATA_HELPERS_REENTRANT").as_deref(), Some("1"));
}

#[test]
fn concurrent_writers_restore_their_keys() {
    const THREADS: usize = 4;
    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|n| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let key = format!("STRATA_HELPERS_THREAD_{n}");
                barrier.wait();
                for round in 0..8 {
                    let value = format!("{n}-{round}");
                    let guard = set_var(key.as_str(), &value);
                    assert_eq!(current(&key), Some(value));
                    drop(guard);
                    assert_eq!(current(&key), None);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker thread panicked");
    }
}
