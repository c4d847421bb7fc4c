use keylock::{KeyedLocker, LockError, Span};
use std::time::{Duration, Instant};

#[test]
fn test_lock_acquire_and_release() {
    let locker = KeyedLocker::new().unwrap();
    assert!(!locker.is_lock_acquired("file1"));

    let lock = locker.acquire_lock("file1", Span::Infinite).unwrap();
    assert!(locker.is_lock_acquired("file1"));
    assert_eq!(lock.key(), "file1");
    assert!(!lock.is_released());

    drop(lock);
    assert!(!locker.is_lock_acquired("file1"));
    assert_eq!(locker.tracked_keys(), 0);
}

#[test]
fn test_explicit_release_marks_handle() {
    let locker = KeyedLocker::new().unwrap();

    let lock = locker.acquire_lock("file1", Span::Infinite).unwrap();
    lock.release();

    assert!(lock.is_released());
    assert!(!locker.is_lock_acquired("file1"));
}

#[test]
fn test_blank_key_rejected() {
    let locker = KeyedLocker::new().unwrap();

    for key in ["", "   ", "\t\n"] {
        let err = locker.acquire_lock(key, Span::Infinite).unwrap_err();
        assert!(matches!(err, LockError::InvalidKey(_)), "got: {}", err);
        assert!(locker.try_acquire_lock(key, Span::ZERO, Span::Infinite).is_none());
        assert!(!locker.is_lock_acquired(key));
    }
    assert_eq!(locker.tracked_keys(), 0);
}

#[test]
fn test_try_acquire_unused_key_succeeds_immediately() {
    let locker = KeyedLocker::new().unwrap();

    let start = Instant::now();
    let lock = locker.try_acquire_lock("unused", Span::ZERO, Span::Infinite);
    assert!(lock.is_some());
    assert!(start.elapsed() < Duration::from_millis(100));
}

#[test]
fn test_keys_are_case_sensitive() {
    let locker = KeyedLocker::new().unwrap();

    let _lower = locker.acquire_lock("file", Span::Infinite).unwrap();
    assert!(!locker.is_lock_acquired("FILE"));

    let upper = locker.try_acquire_lock("FILE", Span::ZERO, Span::Infinite);
    assert!(upper.is_some());
}

#[test]
fn test_global_locker_is_shared() {
    let a = KeyedLocker::global().unwrap();
    let b = KeyedLocker::global().unwrap();
    assert!(std::ptr::eq(a, b));

    let lock = a.acquire_lock("global-test-key", Duration::from_secs(30)).unwrap();
    assert!(b.is_lock_acquired("global-test-key"));
    drop(lock);
    assert!(!b.is_lock_acquired("global-test-key"));
}

#[test]
fn test_custom_config() {
    use keylock::LockerConfig;

    let config = LockerConfig::new()
        .with_timer_threads(0)
        .with_timer_thread_name("custom-timer");
    assert_eq!(config.timer_threads, 1);

    let locker = KeyedLocker::with_config(config).unwrap();
    let lock = locker.acquire_lock("cfg", Duration::from_millis(50)).unwrap();
    std::thread::sleep(Duration::from_millis(300));
    assert!(lock.is_released());
}
