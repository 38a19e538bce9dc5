//! Background sweep task management

use crate::cache::ResultCache;
use std::sync::Arc;
use std::time::Duration;

impl ResultCache {
    /// Start the periodic sweep. Replaces a sweeper that is already running.
    ///
    /// Must be called from within a tokio runtime. Does nothing when the
    /// configured interval is zero.
    pub fn start_sweeper(&self) {
        let sweep_interval = self.inner.config.sweep_interval;
        if sweep_interval == Duration::ZERO {
            tracing::debug!("cache sweeper disabled");
            return;
        }

        // The task must not keep the cache alive.
        let weak = Arc::downgrade(&self.inner);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(sweep_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick completes immediately.
            interval.tick().await;

            loop {
                interval.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                ResultCache { inner }.sweep();
            }
        });

        if let Some(previous) = self.inner.sweeper.write().replace(handle) {
            previous.abort();
        }
    }

    /// Stop the periodic sweep; entries remain until read or swept manually.
    pub fn stop_sweeper(&self) {
        if let Some(handle) = self.inner.sweeper.write().take() {
            handle.abort();
            tracing::debug!("cache sweeper stopped");
        }
    }

    pub fn sweeper_running(&self) -> bool {
        self.inner
            .sweeper
            .read()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}
