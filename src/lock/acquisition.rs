use crate::error::{LockError, Result};
use crate::lock::handle::LockHandle;
use crate::lock::registry::{EntryRef, Registry, Released};
use crate::lock::timer::TimerRuntime;
use crate::lock::{LockerConfig, Span};
use std::sync::{Arc, OnceLock};
use tokio::sync::{SemaphorePermit, TryAcquireError};
use tokio_util::sync::CancellationToken;
use tracing::debug;

static GLOBAL: OnceLock<KeyedLocker> = OnceLock::new();

/// Check if a key is usable (non-empty and not only whitespace)
fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

fn closed_while_referenced(key: &str) -> ! {
    panic!("lock registry invariant violated: semaphore for key {key:?} closed while referenced")
}

enum Wait {
    Acquired,
    TimedOut,
    Cancelled,
}

/// A reference taken by resolution that has not yet turned into a held lock.
///
/// Dropping it hands the reference back, so timeouts, cancellations and
/// dropped futures leave the registry as if resolution never happened.
struct PendingRef<'a> {
    registry: &'a Registry,
    entry: EntryRef,
    armed: bool,
}

impl<'a> PendingRef<'a> {
    fn resolve(registry: &'a Registry, key: &str) -> Self {
        Self {
            registry,
            entry: registry.resolve(key),
            armed: true,
        }
    }

    fn entry(&self) -> &EntryRef {
        &self.entry
    }

    /// Keep the reference; it now belongs to a lock handle
    fn commit(mut self) -> EntryRef {
        self.armed = false;
        self.entry.clone()
    }
}

impl Drop for PendingRef<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        // No permit was taken, so nothing to signal
        if let Released::Removed(semaphore) = self.registry.release(&self.entry) {
            semaphore.close();
        }
    }
}

/// Keyed, reference-counted lock manager.
///
/// Entries are created on first use of a key and removed once no holder or
/// waiter references them. Blocking and async callers share the same entries.
#[derive(Debug)]
pub struct KeyedLocker {
    registry: Arc<Registry>,
    timers: TimerRuntime,
}

impl KeyedLocker {
    pub fn new() -> Result<Self> {
        Self::with_config(LockerConfig::default())
    }

    pub fn with_config(config: LockerConfig) -> Result<Self> {
        Ok(Self {
            registry: Arc::new(Registry::new()),
            timers: TimerRuntime::start(&config)?,
        })
    }

    /// Process-wide locker, created on first use
    pub fn global() -> Result<&'static KeyedLocker> {
        if let Some(locker) = GLOBAL.get() {
            return Ok(locker);
        }
        let locker = KeyedLocker::new()?;
        Ok(GLOBAL.get_or_init(|| locker))
    }

    /// Acquire the lock for `key`, blocking the calling thread until it is free.
    ///
    /// A finite `expiration` releases the lock automatically once it elapses.
    /// Do not call this from inside an async task; use
    /// [`KeyedLocker::acquire_lock_async`] there.
    pub fn acquire_lock(&self, key: &str, expiration: impl Into<Span>) -> Result<LockHandle> {
        if !is_valid_key(key) {
            return Err(LockError::invalid_key(key));
        }

        let acquired = futures::executor::block_on(self.acquire(
            key,
            Span::Infinite,
            expiration.into(),
            None,
        ))?;
        match acquired {
            Some(handle) => Ok(handle),
            None => unreachable!("unbounded wait cannot time out"),
        }
    }

    /// Acquire the lock for `key`, blocking for at most `timeout`.
    ///
    /// Returns `None` on timeout or when `key` is blank.
    pub fn try_acquire_lock(
        &self,
        key: &str,
        timeout: impl Into<Span>,
        expiration: impl Into<Span>,
    ) -> Option<LockHandle> {
        if !is_valid_key(key) {
            debug!("Ignoring try-acquire for blank key {:?}", key);
            return None;
        }

        futures::executor::block_on(self.acquire(key, timeout.into(), expiration.into(), None))
            .ok()
            .flatten()
    }

    /// Acquire the lock for `key`, suspending the current task until it is free.
    ///
    /// Fails with [`LockError::Cancelled`] if `cancel` fires first.
    pub async fn acquire_lock_async(
        &self,
        key: &str,
        expiration: impl Into<Span>,
        cancel: &CancellationToken,
    ) -> Result<LockHandle> {
        if !is_valid_key(key) {
            return Err(LockError::invalid_key(key));
        }

        match self
            .acquire(key, Span::Infinite, expiration.into(), Some(cancel))
            .await?
        {
            Some(handle) => Ok(handle),
            None => unreachable!("unbounded wait cannot time out"),
        }
    }

    /// Acquire the lock for `key`, suspending for at most `timeout`.
    ///
    /// `Ok(None)` on timeout or blank key, [`LockError::Cancelled`] if `cancel` fires first.
    pub async fn try_acquire_lock_async(
        &self,
        key: &str,
        timeout: impl Into<Span>,
        expiration: impl Into<Span>,
        cancel: &CancellationToken,
    ) -> Result<Option<LockHandle>> {
        if !is_valid_key(key) {
            debug!("Ignoring try-acquire for blank key {:?}", key);
            return Ok(None);
        }

        self.acquire(key, timeout.into(), expiration.into(), Some(cancel))
            .await
    }

    /// Whether `key` is currently held.
    ///
    /// Never blocks. Reports only that the lock is taken, not whether anyone is waiting.
    pub fn is_lock_acquired(&self, key: &str) -> bool {
        is_valid_key(key) && self.registry.is_held(key)
    }

    /// Number of holders and waiters currently referencing `key`
    pub fn reference_count(&self, key: &str) -> usize {
        self.registry.reference_count(key)
    }

    /// Number of keys with a live entry
    pub fn tracked_keys(&self) -> usize {
        self.registry.len()
    }

    async fn acquire(
        &self,
        key: &str,
        timeout: Span,
        expiration: Span,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<LockHandle>> {
        debug!(
            "Acquiring lock: {} (timeout: {}, expiration: {})",
            key, timeout, expiration
        );

        let pending = PendingRef::resolve(&self.registry, key);
        let outcome = self.wait(pending.entry(), timeout, cancel).await;

        match outcome {
            Wait::Acquired => {
                let handle = LockHandle::new(pending.commit(), Arc::clone(&self.registry));
                if let Span::Finite(after) = expiration {
                    handle.arm_expiration(&self.timers, after);
                }
                debug!("Lock acquired: {}", key);
                Ok(Some(handle))
            }
            Wait::TimedOut => {
                debug!("Lock wait timed out: {} (after {})", key, timeout);
                Ok(None)
            }
            Wait::Cancelled => {
                debug!("Lock wait cancelled: {}", key);
                Err(LockError::cancelled(key))
            }
        }
    }

    /// The single suspension point: wait for the entry's permit and keep it
    async fn wait(
        &self,
        entry: &EntryRef,
        timeout: Span,
        cancel: Option<&CancellationToken>,
    ) -> Wait {
        if cancel.is_some_and(|token| token.is_cancelled()) {
            return Wait::Cancelled;
        }

        let key = entry.key();
        let semaphore = entry.semaphore();

        let permit = async {
            match timeout {
                Span::Finite(duration) if duration.is_zero() => match semaphore.try_acquire() {
                    Ok(permit) => Some(permit),
                    Err(TryAcquireError::NoPermits) => None,
                    Err(TryAcquireError::Closed) => closed_while_referenced(key),
                },
                Span::Finite(duration) => {
                    match self.timers.timeout(duration, semaphore.acquire()).await {
                        Ok(acquired) => {
                            Some(acquired.unwrap_or_else(|_| closed_while_referenced(key)))
                        }
                        Err(_elapsed) => None,
                    }
                }
                Span::Infinite => Some(
                    semaphore
                        .acquire()
                        .await
                        .unwrap_or_else(|_| closed_while_referenced(key)),
                ),
            }
        };

        let permit: Option<SemaphorePermit<'_>> = match cancel {
            None => permit.await,
            Some(token) => tokio::select! {
                biased;
                permit = permit => permit,
                _ = token.cancelled() => return Wait::Cancelled,
            },
        };

        match permit {
            Some(permit) => {
                // Released manually by the handle, exactly once
                permit.forget();
                Wait::Acquired
            }
            None => Wait::TimedOut,
        }
    }
}
