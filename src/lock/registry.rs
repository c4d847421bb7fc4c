use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::trace;

/// Registry-side record for a key: the binary semaphore and the number of
/// callers (holders and in-flight waiters) referencing it.
#[derive(Debug)]
struct Slot {
    key: Arc<str>,
    semaphore: Arc<Semaphore>,
    refs: usize,
}

/// A caller's reference to a registry entry, obtained from [`Registry::resolve`].
#[derive(Debug, Clone)]
pub(crate) struct EntryRef {
    key: Arc<str>,
    semaphore: Arc<Semaphore>,
}

impl EntryRef {
    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn semaphore(&self) -> &Semaphore {
        &self.semaphore
    }
}

/// Outcome of dropping a reference.
#[derive(Debug)]
pub(crate) enum Released {
    Retained,
    /// The count reached zero and the mapping is gone; the caller disposes of the semaphore
    Removed(Arc<Semaphore>),
}

/// Key → entry map. All structural changes and count updates happen under one mutex.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    entries: Mutex<HashMap<Arc<str>, Slot>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Take a reference on `key`, creating its entry if none exists
    pub(crate) fn resolve(&self, key: &str) -> EntryRef {
        let mut entries = self.entries.lock();

        if let Some(slot) = entries.get_mut(key) {
            slot.refs += 1;
            trace!("Lock entry resolved: {} (refs: {})", key, slot.refs);
            return EntryRef {
                key: Arc::clone(&slot.key),
                semaphore: Arc::clone(&slot.semaphore),
            };
        }

        let key: Arc<str> = Arc::from(key);
        let semaphore = Arc::new(Semaphore::new(1));
        entries.insert(
            Arc::clone(&key),
            Slot {
                key: Arc::clone(&key),
                semaphore: Arc::clone(&semaphore),
                refs: 1,
            },
        );
        trace!("Lock entry created: {}", key);

        EntryRef { key, semaphore }
    }

    /// Drop one reference on the entry.
    ///
    /// Panics if the entry is not tracked: that can only happen when the
    /// reference counting itself is broken.
    pub(crate) fn release(&self, entry: &EntryRef) -> Released {
        let mut entries = self.entries.lock();

        let Some(slot) = entries.get_mut(entry.key()) else {
            panic!(
                "lock registry invariant violated: release of untracked key {:?}",
                entry.key()
            );
        };
        assert!(
            Arc::ptr_eq(&slot.semaphore, &entry.semaphore),
            "lock registry invariant violated: stale entry for key {:?}",
            entry.key()
        );

        slot.refs -= 1;
        if slot.refs > 0 {
            trace!("Lock entry released: {} (refs: {})", entry.key(), slot.refs);
            return Released::Retained;
        }

        match entries.remove(entry.key()) {
            Some(slot) => {
                trace!("Lock entry removed: {}", entry.key());
                Released::Removed(slot.semaphore)
            }
            None => unreachable!("entry was present under the same lock"),
        }
    }

    /// Whether an entry exists for `key` and its semaphore has no free permit
    pub(crate) fn is_held(&self, key: &str) -> bool {
        self.entries
            .lock()
            .get(key)
            .is_some_and(|slot| slot.semaphore.available_permits() == 0)
    }

    /// Number of callers currently referencing `key` (0 when untracked)
    pub(crate) fn reference_count(&self, key: &str) -> usize {
        self.entries.lock().get(key).map_or(0, |slot| slot.refs)
    }

    /// Number of tracked keys
    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }
}
