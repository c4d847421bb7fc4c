use keylock::{KeyedLocker, Span};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_expiration_releases_handle() {
    let locker = KeyedLocker::new().unwrap();

    let lock = locker.acquire_lock("x", Duration::from_millis(200)).unwrap();
    assert!(!lock.is_released());
    assert!(locker.is_lock_acquired("x"));

    thread::sleep(Duration::from_millis(500));
    assert!(lock.is_released(), "Lock should have expired");
    assert!(!locker.is_lock_acquired("x"));
    assert_eq!(locker.tracked_keys(), 0);

    // Releasing an expired handle is a no-op
    lock.release();
    assert_eq!(locker.tracked_keys(), 0);
}

#[test]
fn test_expiration_unblocks_waiter() {
    let locker = Arc::new(KeyedLocker::new().unwrap());

    let holder = locker.acquire_lock("x", Duration::from_millis(500)).unwrap();

    let start = Instant::now();
    let waiter = locker.try_acquire_lock("x", Duration::from_secs(3), Span::Infinite);
    let elapsed = start.elapsed();

    assert!(waiter.is_some());
    assert!(holder.is_released());
    assert!(elapsed >= Duration::from_millis(400));
    assert!(elapsed < Duration::from_millis(2000));
}

#[test]
fn test_explicit_release_cancels_expiration() {
    let locker = KeyedLocker::new().unwrap();

    let first = locker.acquire_lock("x", Duration::from_millis(200)).unwrap();
    first.release();

    // A later holder must not be released by the first handle's timer
    let second = locker.acquire_lock("x", Span::Infinite).unwrap();
    thread::sleep(Duration::from_millis(400));

    assert!(!second.is_released());
    assert!(locker.is_lock_acquired("x"));
}

#[test]
fn test_infinite_expiration_never_fires() {
    let locker = KeyedLocker::new().unwrap();

    let lock = locker.acquire_lock("x", Span::Infinite).unwrap();
    thread::sleep(Duration::from_millis(200));
    assert!(!lock.is_released());
}

#[test]
fn test_dropping_locker_keeps_handles_releasable() {
    let locker = KeyedLocker::new().unwrap();
    let lock = locker.acquire_lock("x", Duration::from_secs(60)).unwrap();

    drop(locker);
    lock.release();
    assert!(lock.is_released());
}
