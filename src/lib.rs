//! Keyed, reference-counted mutual-exclusion locks with optional expiration.
//!
//! Locks are identified by arbitrary string keys. The synchronization state for
//! a key is created on first use and dropped once nobody holds or waits for it.
//! Blocking and async callers can contend for the same key.

pub mod error;
pub mod lock;
pub mod utils;

pub use error::{LockError, Result};
pub use lock::{AsyncLocker, KeyedLocker, LockHandle, Locker, LockerConfig, Span};
pub use tokio_util::sync::CancellationToken;
