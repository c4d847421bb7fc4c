use keylock::{KeyedLocker, Span};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_sequential_cycles_leave_no_entry() {
    let locker = KeyedLocker::new().unwrap();

    for _ in 0..100 {
        let lock = locker.acquire_lock("shared", Span::Infinite).unwrap();
        assert_eq!(locker.reference_count("shared"), 1);
        drop(lock);
    }

    assert_eq!(locker.reference_count("shared"), 0);
    assert_eq!(locker.tracked_keys(), 0);
}

#[test]
fn test_timed_out_wait_returns_reference() {
    let locker = KeyedLocker::new().unwrap();
    let held = locker.acquire_lock("x", Span::Infinite).unwrap();

    assert!(locker
        .try_acquire_lock("x", Duration::from_millis(50), Span::Infinite)
        .is_none());
    assert!(locker.try_acquire_lock("x", Span::ZERO, Span::Infinite).is_none());
    assert_eq!(locker.reference_count("x"), 1);

    drop(held);
    assert_eq!(locker.tracked_keys(), 0);
}

#[test]
fn test_waiters_are_counted() {
    let locker = Arc::new(KeyedLocker::new().unwrap());
    let held = locker.acquire_lock("x", Span::Infinite).unwrap();

    let waiter = {
        let locker = locker.clone();
        thread::spawn(move || {
            let _lock = locker.acquire_lock("x", Span::Infinite).unwrap();
        })
    };

    let mut waited = 0;
    while locker.reference_count("x") < 2 && waited < 100 {
        thread::sleep(Duration::from_millis(10));
        waited += 1;
    }
    assert_eq!(locker.reference_count("x"), 2);

    drop(held);
    waiter.join().unwrap();
    assert_eq!(locker.tracked_keys(), 0);
}

#[test]
fn test_double_release_is_idempotent() {
    let locker = KeyedLocker::new().unwrap();
    let first = locker.acquire_lock("x", Span::Infinite).unwrap();
    let other = locker.acquire_lock("y", Span::Infinite).unwrap();

    first.release();
    first.release();
    assert!(first.is_released());

    assert_eq!(locker.reference_count("x"), 0);
    assert_eq!(locker.reference_count("y"), 1);
    drop(first);
    drop(other);
    assert_eq!(locker.tracked_keys(), 0);
}

#[test]
fn test_concurrent_release_signals_once() {
    let locker = Arc::new(KeyedLocker::new().unwrap());
    let lock = Arc::new(locker.acquire_lock("x", Span::Infinite).unwrap());

    // A waiter keeps the entry alive, so a duplicate signal would leave a spare permit
    let waiter = {
        let locker = locker.clone();
        thread::spawn(move || locker.try_acquire_lock("x", Duration::from_secs(5), Span::Infinite))
    };
    let mut waited = 0;
    while locker.reference_count("x") < 2 && waited < 100 {
        thread::sleep(Duration::from_millis(10));
        waited += 1;
    }

    let releasers: Vec<_> = (0..8)
        .map(|_| {
            let lock = lock.clone();
            thread::spawn(move || lock.release())
        })
        .collect();
    for releaser in releasers {
        releaser.join().unwrap();
    }
    assert!(lock.is_released());

    let next = waiter.join().unwrap();
    assert!(next.is_some());
    assert!(locker.try_acquire_lock("x", Span::ZERO, Span::Infinite).is_none());
    assert_eq!(locker.reference_count("x"), 1);

    drop(next);
    assert_eq!(locker.tracked_keys(), 0);
}

#[test]
fn test_release_racing_expiration() {
    let locker = KeyedLocker::new().unwrap();

    for _ in 0..50 {
        let lock = locker.acquire_lock("race", Duration::from_millis(1)).unwrap();
        thread::sleep(Duration::from_millis(1));
        lock.release();
        assert!(lock.is_released());
    }

    assert_eq!(locker.tracked_keys(), 0);
}
