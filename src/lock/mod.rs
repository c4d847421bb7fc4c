mod acquisition;
mod config;
mod handle;
mod locker;
mod registry;
mod span;
mod timer;

pub use acquisition::KeyedLocker;
pub use config::LockerConfig;
pub use handle::LockHandle;
pub use locker::{AsyncLocker, Locker};
pub use span::Span;
