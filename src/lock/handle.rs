use crate::lock::registry::{EntryRef, Registry, Released};
use crate::lock::timer::TimerRuntime;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

struct HandleState {
    entry: EntryRef,
    registry: Arc<Registry>,
    released: AtomicBool,
    expiration: Mutex<Option<JoinHandle<()>>>,
}

impl HandleState {
    /// Runs at most once per handle, whichever of release/drop/expiry gets here first
    fn release(&self) -> bool {
        if self
            .released
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        if let Some(timer) = self.expiration.lock().take() {
            timer.abort();
        }

        let released = self.registry.release(&self.entry);

        // Signal before disposal so the semaphore is left with its full count
        self.entry.semaphore().add_permits(1);
        if let Released::Removed(semaphore) = released {
            semaphore.close();
        }

        debug!("Lock released: {}", self.entry.key());
        true
    }
}

/// Proof of exclusive ownership of a key.
///
/// The lock is released by [`LockHandle::release`], by dropping the handle, or
/// by its expiration timer, whichever happens first. Later releases are no-ops.
pub struct LockHandle {
    state: Arc<HandleState>,
}

impl LockHandle {
    pub(crate) fn new(entry: EntryRef, registry: Arc<Registry>) -> Self {
        Self {
            state: Arc::new(HandleState {
                entry,
                registry,
                released: AtomicBool::new(false),
                expiration: Mutex::new(None),
            }),
        }
    }

    /// Arm an expiration timer that releases the lock after `after`
    pub(crate) fn arm_expiration(&self, timers: &TimerRuntime, after: Duration) {
        let state: Weak<HandleState> = Arc::downgrade(&self.state);
        let timer = timers.schedule(after, move || {
            if let Some(state) = state.upgrade() {
                if state.release() {
                    debug!("Lock expired: {} (after {:?})", state.entry.key(), after);
                }
            }
        });

        let mut slot = self.state.expiration.lock();
        if self.is_released() {
            // Released between spawning and arming
            timer.abort();
        } else {
            *slot = Some(timer);
        }
    }

    /// The key this handle locks
    pub fn key(&self) -> &str {
        self.state.entry.key()
    }

    pub fn is_released(&self) -> bool {
        self.state.released.load(Ordering::Acquire)
    }

    /// Release the lock. Safe to call any number of times from any thread.
    pub fn release(&self) {
        self.state.release();
    }
}

impl fmt::Debug for LockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockHandle")
            .field("key", &self.key())
            .field("released", &self.is_released())
            .finish()
    }
}

impl Drop for LockHandle {
    fn drop(&mut self) {
        self.state.release();
    }
}
