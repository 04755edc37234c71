//! Trailing-edge debounce timer.
//!
//! A [`Debouncer`] holds at most one deadline. Each [`trigger`] pushes the
//! deadline out to `now + window`; [`elapsed`] resolves once a deadline
//! passes without being pushed again. It runs on tokio's clock, so tests can
//! drive it with a paused runtime.
//!
//! [`trigger`]: Debouncer::trigger
//! [`elapsed`]: Debouncer::elapsed

use std::time::Duration;

use tokio::time::{Instant, sleep_until};

#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Restart the quiet period from now.
    pub fn trigger(&mut self) {
        self.deadline = Some(Instant::now() + self.window);
    }

    /// Drop any pending deadline. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Wait for the pending deadline and consume it.
    ///
    /// Never resolves while nothing is pending. Cancel-safe: if the future is
    /// dropped early the deadline stays in place, which is what lets it sit in
    /// a `select!` next to the trigger source.
    pub async fn elapsed(&mut self) {
        match self.deadline {
            Some(deadline) => {
                sleep_until(deadline).await;
                self.deadline = None;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(1000);

    #[tokio::test(start_paused = true)]
    async fn test_retrigger_extends_deadline() {
        let mut debouncer = Debouncer::new(WINDOW);
        let started = Instant::now();
        debouncer.trigger();

        tokio::time::advance(Duration::from_millis(600)).await;
        debouncer.trigger();
        debouncer.elapsed().await;

        let waited = started.elapsed();
        assert!(waited >= Duration::from_millis(1600), "{waited:?}");
        assert!(waited < Duration::from_millis(1700), "{waited:?}");
        assert!(!debouncer.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_resolves_after_quiet_window() {
        let mut debouncer = Debouncer::new(Duration::from_millis(250));
        debouncer.trigger();
        let started = Instant::now();

        debouncer.elapsed().await;

        assert!(started.elapsed() >= Duration::from_millis(250));
        assert!(!debouncer.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_and_idle_never_fires() {
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        debouncer.trigger();
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());

        let fired = tokio::time::timeout(Duration::from_secs(60), debouncer.elapsed()).await;
        assert!(fired.is_err());
    }
}
