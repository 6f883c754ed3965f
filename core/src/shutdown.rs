//! Cooperative shutdown signal
//!
//! A shared flag plus condvar that the monitoring loops wait on between
//! ticks. Unlike a bare sleep-then-check loop, a raised signal wakes
//! waiters immediately, so every loop exits within one polling interval.

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

#[derive(Default)]
struct Inner {
    stopped: Mutex<bool>,
    condvar: Condvar,
}

/// Cloneable handle to a shared stop flag.
///
/// All clones observe the same flag; raising it through any clone stops
/// every loop waiting on it.
#[derive(Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<Inner>,
}

impl ShutdownSignal {
    /// Create a new, un-raised signal
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal and wake all waiters
    pub fn shutdown(&self) {
        if let Ok(mut stopped) = self.inner.stopped.lock() {
            *stopped = true;
        }
        self.inner.condvar.notify_all();
    }

    /// Whether the signal has been raised
    pub fn is_shutdown(&self) -> bool {
        match self.inner.stopped.lock() {
            Ok(stopped) => *stopped,
            // A poisoned flag means a holder panicked; treat as stopped.
            Err(_) => true,
        }
    }

    /// Block for at most `timeout`, returning early when the signal is
    /// raised. Returns true if shutdown was requested.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = match self.inner.stopped.lock() {
            Ok(guard) => guard,
            Err(_) => return true,
        };
        match self
            .inner
            .condvar
            .wait_timeout_while(guard, timeout, |stopped| !*stopped)
        {
            Ok((stopped, _)) => *stopped,
            Err(_) => true,
        }
    }

    /// Block until the signal is raised
    pub fn wait(&self) {
        let guard = match self.inner.stopped.lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };
        let _unused = self
            .inner
            .condvar
            .wait_while(guard, |stopped| !*stopped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_starts_unraised() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_shutdown());
    }

    #[test]
    fn test_wait_timeout_elapses_without_signal() {
        let signal = ShutdownSignal::new();
        let start = Instant::now();
        let stopped = signal.wait_timeout(Duration::from_millis(50));
        assert!(!stopped);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_shutdown_observed_by_clones() {
        let signal = ShutdownSignal::new();
        let clone = signal.clone();
        signal.shutdown();
        assert!(clone.is_shutdown());
        // Raised signal short-circuits the wait
        assert!(clone.wait_timeout(Duration::from_secs(5)));
    }

    #[test]
    fn test_shutdown_wakes_waiter_promptly() {
        let signal = ShutdownSignal::new();
        let waiter = signal.clone();

        let handle = thread::spawn(move || {
            let start = Instant::now();
            let stopped = waiter.wait_timeout(Duration::from_secs(10));
            (stopped, start.elapsed())
        });

        thread::sleep(Duration::from_millis(50));
        signal.shutdown();

        let (stopped, elapsed) = handle.join().unwrap();
        assert!(stopped);
        assert!(elapsed < Duration::from_secs(1));
    }

    #[test]
    fn test_wait_returns_after_shutdown() {
        let signal = ShutdownSignal::new();
        let waiter = signal.clone();

        let handle = thread::spawn(move || waiter.wait());
        thread::sleep(Duration::from_millis(20));
        signal.shutdown();
        handle.join().unwrap();
    }
}
