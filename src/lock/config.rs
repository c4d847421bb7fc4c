/// Settings for a [`KeyedLocker`](crate::KeyedLocker).
#[derive(Debug, Clone)]
pub struct LockerConfig {
    /// Worker threads of the background runtime that drives expirations and bounded waits
    pub timer_threads: usize,
    pub timer_thread_name: String,
}

impl LockerConfig {
    pub fn new() -> Self {
        Self {
            timer_threads: 1,
            timer_thread_name: "keylock-timer".to_string(),
        }
    }

    pub fn with_timer_threads(mut self, threads: usize) -> Self {
        self.timer_threads = threads.max(1);
        self
    }

    pub fn with_timer_thread_name(mut self, name: impl Into<String>) -> Self {
        self.timer_thread_name = name.into();
        self
    }
}

impl Default for LockerConfig {
    fn default() -> Self {
        Self::new()
    }
}
