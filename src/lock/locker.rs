use crate::error::Result;
use crate::lock::{KeyedLocker, LockHandle, Span};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Blocking lock capability.
pub trait Locker {
    /// Block until `key` is acquired. Errors on a blank key.
    fn acquire_lock(&self, key: &str, expiration: Span) -> Result<LockHandle>;

    /// Block for at most `timeout`; `None` on timeout or blank key.
    fn try_acquire_lock(&self, key: &str, timeout: Span, expiration: Span) -> Option<LockHandle>;

    fn is_lock_acquired(&self, key: &str) -> bool;
}

/// Cooperative (non-thread-blocking) lock capability.
pub trait AsyncLocker {
    fn acquire_lock_async<'a>(
        &'a self,
        key: &'a str,
        expiration: Span,
        cancel: &'a CancellationToken,
    ) -> impl Future<Output = Result<LockHandle>> + Send + 'a;

    fn try_acquire_lock_async<'a>(
        &'a self,
        key: &'a str,
        timeout: Span,
        expiration: Span,
        cancel: &'a CancellationToken,
    ) -> impl Future<Output = Result<Option<LockHandle>>> + Send + 'a;

    fn is_lock_acquired(&self, key: &str) -> bool;
}

impl Locker for KeyedLocker {
    fn acquire_lock(&self, key: &str, expiration: Span) -> Result<LockHandle> {
        KeyedLocker::acquire_lock(self, key, expiration)
    }

    fn try_acquire_lock(&self, key: &str, timeout: Span, expiration: Span) -> Option<LockHandle> {
        KeyedLocker::try_acquire_lock(self, key, timeout, expiration)
    }

    fn is_lock_acquired(&self, key: &str) -> bool {
        KeyedLocker::is_lock_acquired(self, key)
    }
}

impl AsyncLocker for KeyedLocker {
    fn acquire_lock_async<'a>(
        &'a self,
        key: &'a str,
        expiration: Span,
        cancel: &'a CancellationToken,
    ) -> impl Future<Output = Result<LockHandle>> + Send + 'a {
        KeyedLocker::acquire_lock_async(self, key, expiration, cancel)
    }

    fn try_acquire_lock_async<'a>(
        &'a self,
        key: &'a str,
        timeout: Span,
        expiration: Span,
        cancel: &'a CancellationToken,
    ) -> impl Future<Output = Result<Option<LockHandle>>> + Send + 'a {
        KeyedLocker::try_acquire_lock_async(self, key, timeout, expiration, cancel)
    }

    fn is_lock_acquired(&self, key: &str) -> bool {
        KeyedLocker::is_lock_acquired(self, key)
    }
}
