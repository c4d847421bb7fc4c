use crate::error::{LockError, Result};
use crate::lock::LockerConfig;
use std::future::Future;
use std::time::Duration;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tokio::time::Timeout;
use tracing::debug;

/// Background runtime owning the time driver used by expiration timers and
/// bounded waits, so that callers outside any async runtime can use them.
#[derive(Debug)]
pub(crate) struct TimerRuntime {
    runtime: Option<Runtime>,
    handle: Handle,
}

impl TimerRuntime {
    pub(crate) fn start(config: &LockerConfig) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(config.timer_threads.max(1))
            .thread_name(config.timer_thread_name.clone())
            .enable_time()
            .build()
            .map_err(LockError::TimerRuntime)?;
        let handle = runtime.handle().clone();

        debug!(
            "Timer runtime started: {} ({} thread(s))",
            config.timer_thread_name, config.timer_threads
        );

        Ok(Self {
            runtime: Some(runtime),
            handle,
        })
    }

    /// Bound `future` by `duration`, measured on this runtime's clock.
    ///
    /// The returned future may be polled from any executor or a blocking thread.
    pub(crate) fn timeout<F: Future>(&self, duration: Duration, future: F) -> Timeout<F> {
        let _guard = self.handle.enter();
        tokio::time::timeout(duration, future)
    }

    /// Run `callback` once `delay` elapses unless the returned task is aborted first
    pub(crate) fn schedule<F>(&self, delay: Duration, callback: F) -> JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        })
    }
}

impl Drop for TimerRuntime {
    fn drop(&mut self) {
        // shutdown_background never blocks, so this is safe from async contexts
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
            debug!("Timer runtime stopped");
        }
    }
}
