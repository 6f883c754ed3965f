//! Sentinel orchestrator
//!
//! Wires the two producers to one sink and manages their lifecycle.
//! Both loops share a single stop signal; shutdown is two-phase (signal
//! everything, then join everything) so neither loop waits on the other.

use crate::config::Config;
use crate::dispatch::{Dispatcher, EventSink};
use crate::error::Result;
use crate::exclusion::ExclusionFilter;
use crate::fswatch::FsWatcher;
use crate::process_scan::ProcessScanner;
use crate::shutdown::ShutdownSignal;

/// Lifecycle contract shared by the monitoring loops.
///
/// Implemented by [`ProcessScanner`] and [`FsWatcher`] so the sentinel
/// can drive them uniformly.
pub trait MonitorSubsystem: Send {
    /// Start the subsystem
    fn start(&mut self) -> Result<()>;
    /// Stop the subsystem, joining any internal threads
    fn stop(&mut self);
    /// Signal the subsystem to stop without blocking (for two-phase shutdown)
    fn signal_stop(&self);
    /// Check if the subsystem is currently running
    fn is_running(&self) -> bool;
}

/// The detection engine: a process scanner and a filesystem watcher
/// feeding one consumer-supplied sink.
pub struct Sentinel {
    scanner: Option<ProcessScanner>,
    watcher: Option<FsWatcher>,
    signal: ShutdownSignal,
}

impl Sentinel {
    /// Build the engine from configuration. The sink receives every
    /// event from both producers, one at a time.
    pub fn new(config: &Config, sink: Box<dyn EventSink>) -> Result<Self> {
        let filter = ExclusionFilter::from_config(&config.exclusions);
        let dispatcher = Dispatcher::new(sink);
        let signal = ShutdownSignal::new();

        let scanner = if config.monitoring.scan_processes {
            Some(ProcessScanner::new(
                filter.clone(),
                dispatcher.clone(),
                signal.clone(),
            ))
        } else {
            None
        };

        let watcher = if config.monitoring.watch_filesystem {
            let root = config.monitoring.effective_watch_root()?;
            Some(FsWatcher::new(root, filter, dispatcher, signal.clone()))
        } else {
            None
        };

        Ok(Self {
            scanner,
            watcher,
            signal,
        })
    }

    /// Start every configured subsystem
    pub fn start(&mut self) -> Result<()> {
        if let Some(scanner) = &mut self.scanner {
            scanner.start()?;
        }
        if let Some(watcher) = &mut self.watcher {
            watcher.start()?;
        }
        Ok(())
    }

    /// Raise the shared stop signal without waiting for the loops
    pub fn signal_stop(&self) {
        self.signal.shutdown();
    }

    /// Stop both loops: signal first, then join each
    pub fn stop(&mut self) {
        self.signal.shutdown();
        if let Some(scanner) = &mut self.scanner {
            scanner.stop();
        }
        if let Some(watcher) = &mut self.watcher {
            watcher.stop();
        }
    }

    /// A clone of the shared stop signal, e.g. for wiring to Ctrl+C
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.signal.clone()
    }

    /// True while at least one subsystem is running
    pub fn is_running(&self) -> bool {
        let scanner_running = self.scanner.as_ref().map_or(false, |s| s.is_running());
        let watcher_running = self.watcher.as_ref().map_or(false, |w| w.is_running());
        scanner_running || watcher_running
    }
}

impl Drop for Sentinel {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::ChannelSink;
    use crate::event::Action;
    use std::time::{Duration, Instant};

    fn test_config(root: Option<std::path::PathBuf>) -> Config {
        let mut config = Config::default();
        config.monitoring.watch_root = root;
        config
    }

    #[test]
    fn test_sentinel_with_everything_disabled() {
        let mut config = Config::default();
        config.monitoring.scan_processes = false;
        config.monitoring.watch_filesystem = false;

        let (sink, _rx) = ChannelSink::channel();
        let mut sentinel = Sentinel::new(&config, Box::new(sink)).unwrap();

        sentinel.start().unwrap();
        assert!(!sentinel.is_running());
        sentinel.stop();
    }

    #[test]
    fn test_sentinel_start_stop() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = test_config(Some(temp_dir.path().to_path_buf()));

        let (sink, _rx) = ChannelSink::channel();
        let mut sentinel = Sentinel::new(&config, Box::new(sink)).unwrap();

        sentinel.start().unwrap();
        assert!(sentinel.is_running());
        sentinel.stop();
        assert!(!sentinel.is_running());
    }

    #[test]
    fn test_signal_stop_reaches_both_loops() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = test_config(Some(temp_dir.path().to_path_buf()));

        let (sink, _rx) = ChannelSink::channel();
        let mut sentinel = Sentinel::new(&config, Box::new(sink)).unwrap();

        sentinel.start().unwrap();
        std::thread::sleep(Duration::from_millis(600));

        sentinel.signal_stop();
        assert!(!sentinel.is_running());

        let start = Instant::now();
        sentinel.stop();
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_filesystem_events_reach_the_sink() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut config = test_config(Some(temp_dir.path().to_path_buf()));
        // Keep the test focused on the watcher path.
        config.monitoring.scan_processes = false;

        let (sink, rx) = ChannelSink::channel();
        let mut sentinel = Sentinel::new(&config, Box::new(sink)).unwrap();
        sentinel.start().unwrap();
        std::thread::sleep(Duration::from_millis(200));

        std::fs::write(temp_dir.path().join("observed.txt"), "x").unwrap();

        let deadline = Instant::now() + Duration::from_secs(3);
        let mut found = false;
        while Instant::now() < deadline {
            if let Ok(event) = rx.recv_timeout(Duration::from_millis(100)) {
                if event.action == Action::FileCreated && event.detail == "observed.txt" {
                    found = true;
                    break;
                }
            }
        }
        sentinel.stop();
        assert!(found, "created file should flow through the sentinel");
    }
}
