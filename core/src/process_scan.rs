//! Process snapshot scanner for SysSentinel
//!
//! Detects process creation without kernel hooks by diffing successive
//! full-system snapshots against a monotonically growing set of known
//! PIDs. The set is seeded once at startup (baseline processes are never
//! reported) and mutated only from the scan loop itself.

use crate::dispatch::Dispatcher;
use crate::error::{CoreError, Result};
use crate::event::{normalize_actor, Event};
use crate::exclusion::ExclusionFilter;
use crate::sentinel::MonitorSubsystem;
use crate::shutdown::ShutdownSignal;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use sysinfo::{PidExt, ProcessExt, System, SystemExt, UserExt};

/// Fixed scan interval. A policy constant: one snapshot per second keeps
/// detection latency low without noticeable load.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// One enumerated process, as much metadata as the system would give us
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    /// Process ID
    pub pid: u32,
    /// Executable name
    pub name: String,
    /// Owning user, if resolvable
    pub user: Option<String>,
}

/// Periodic full-system process scanner.
///
/// Owns the known-PID set; terminated PIDs are never removed, so a
/// terminated-then-reused PID counts as already known until restart.
pub struct ProcessScanner {
    filter: ExclusionFilter,
    dispatcher: Dispatcher,
    /// Known PIDs. Single writer: only the scan loop mutates this.
    known: Arc<Mutex<HashSet<u32>>>,
    signal: ShutdownSignal,
    thread_handle: Option<JoinHandle<()>>,
}

impl ProcessScanner {
    /// Create a new scanner. The signal may be shared with other
    /// subsystems; raising it stops every loop attached to it.
    pub fn new(filter: ExclusionFilter, dispatcher: Dispatcher, signal: ShutdownSignal) -> Self {
        Self {
            filter,
            dispatcher,
            known: Arc::new(Mutex::new(HashSet::new())),
            signal,
            thread_handle: None,
        }
    }

    /// Number of PIDs currently considered known
    pub fn known_count(&self) -> usize {
        match self.known.lock() {
            Ok(known) => known.len(),
            Err(_) => 0,
        }
    }

    /// Whether a PID is already in the known set
    pub fn is_known(&self, pid: u32) -> bool {
        match self.known.lock() {
            Ok(known) => known.contains(&pid),
            Err(_) => false,
        }
    }

    /// Start the scan thread. The first enumeration seeds the baseline
    /// without emitting events.
    pub fn start(&mut self) -> Result<()> {
        if self.thread_handle.is_some() {
            return Ok(());
        }

        let known = Arc::clone(&self.known);
        let filter = self.filter.clone();
        let dispatcher = self.dispatcher.clone();
        let signal = self.signal.clone();

        let handle = thread::Builder::new()
            .name("process-scan".to_string())
            .spawn(move || {
                Self::scan_loop(known, filter, dispatcher, signal);
            })
            .map_err(|e| CoreError::ProcessScan(e.to_string()))?;

        self.thread_handle = Some(handle);
        Ok(())
    }

    /// Stop the scan thread and wait for it to finish
    pub fn stop(&mut self) {
        self.signal.shutdown();
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }

    /// Signal the scanner to stop without waiting for the thread.
    /// Used by the sentinel for two-phase shutdown.
    pub fn signal_stop(&self) {
        self.signal.shutdown();
    }

    /// Whether the scan thread is running
    pub fn is_running(&self) -> bool {
        self.thread_handle.is_some() && !self.signal.is_shutdown()
    }

    fn scan_loop(
        known: Arc<Mutex<HashSet<u32>>>,
        filter: ExclusionFilter,
        dispatcher: Dispatcher,
        signal: ShutdownSignal,
    ) {
        let mut system = System::new();
        system.refresh_users_list();

        // Baseline: everything alive at startup is pre-existing noise.
        let baseline = Self::snapshot(&mut system);
        if let Ok(mut known) = known.lock() {
            known.extend(baseline.into_iter().map(|record| record.pid));
        }

        loop {
            if signal.wait_timeout(POLL_INTERVAL) {
                break;
            }

            let snapshot = Self::snapshot(&mut system);
            let events = match known.lock() {
                Ok(mut known) => Self::diff_snapshot(&mut known, snapshot, &filter),
                Err(_) => break,
            };
            for event in events {
                dispatcher.dispatch(event);
            }
        }
    }

    /// Enumerate all running processes. Processes that exit or refuse
    /// metadata mid-enumeration simply drop out of the snapshot; a
    /// missing user resolves to `unknown` rather than failing the tick.
    fn snapshot(system: &mut System) -> Vec<ProcessRecord> {
        system.refresh_processes();
        system
            .processes()
            .iter()
            .map(|(pid, process)| {
                let user = process
                    .user_id()
                    .and_then(|uid| system.users().iter().find(|u| u.id() == uid))
                    .map(|u| u.name().to_string());
                ProcessRecord {
                    pid: pid.as_u32(),
                    name: process.name().to_string(),
                    user,
                }
            })
            .collect()
    }

    /// One scan tick: report each non-excluded process whose PID is not
    /// yet known, and remember it. Known PIDs emit nothing, so re-running
    /// against an unchanged process table is a no-op. Excluded names are
    /// left out of the set entirely, mirroring the original policy.
    fn diff_snapshot(
        known: &mut HashSet<u32>,
        snapshot: Vec<ProcessRecord>,
        filter: &ExclusionFilter,
    ) -> Vec<Event> {
        let mut events = Vec::new();
        for record in snapshot {
            if known.contains(&record.pid) {
                continue;
            }
            if filter.is_process_excluded(&record.name) {
                continue;
            }
            known.insert(record.pid);

            let actor = record
                .user
                .as_deref()
                .map(normalize_actor)
                .unwrap_or_else(|| "unknown".to_string());
            events.push(Event::process_started(record.pid, &record.name, &actor));
        }
        events
    }
}

impl Drop for ProcessScanner {
    fn drop(&mut self) {
        self.stop();
    }
}

impl MonitorSubsystem for ProcessScanner {
    fn start(&mut self) -> Result<()> {
        ProcessScanner::start(self)
    }

    fn stop(&mut self) {
        ProcessScanner::stop(self)
    }

    fn signal_stop(&self) {
        ProcessScanner::signal_stop(self)
    }

    fn is_running(&self) -> bool {
        ProcessScanner::is_running(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::ChannelSink;
    use std::time::Instant;

    fn record(pid: u32, name: &str, user: &str) -> ProcessRecord {
        ProcessRecord {
            pid,
            name: name.to_string(),
            user: Some(user.to_string()),
        }
    }

    fn scanner_parts() -> (Dispatcher, std::sync::mpsc::Receiver<Event>) {
        let (sink, rx) = ChannelSink::channel();
        (Dispatcher::new(Box::new(sink)), rx)
    }

    #[test]
    fn test_new_process_reported_exactly_once() {
        let mut known = HashSet::new();
        let filter = ExclusionFilter::default();

        let events = ProcessScanner::diff_snapshot(
            &mut known,
            vec![record(100, "nc", "alice")],
            &filter,
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].subject_id, Some(100));
        assert_eq!(events[0].detail, "nc");
        assert_eq!(events[0].actor, "alice");

        // Same table again: idempotent re-scan, nothing new.
        let events = ProcessScanner::diff_snapshot(
            &mut known,
            vec![record(100, "nc", "alice")],
            &filter,
        );
        assert!(events.is_empty());
    }

    #[test]
    fn test_baseline_never_reported() {
        let mut known = HashSet::new();
        let filter = ExclusionFilter::default();

        // Seed the baseline the way the scan loop does.
        known.extend([1u32, 2, 3]);

        let snapshot = vec![
            record(1, "init", "root"),
            record(2, "sshd", "root"),
            record(3, "bash", "alice"),
            record(4, "vim", "alice"),
        ];
        let events = ProcessScanner::diff_snapshot(&mut known, snapshot, &filter);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].subject_id, Some(4));
    }

    #[test]
    fn test_excluded_name_never_reported() {
        let mut known = HashSet::new();
        let filter = ExclusionFilter::new(vec![], vec!["svchost.exe".to_string()]);

        let snapshot = vec![record(500, "svchost.exe", "SYSTEM")];
        let events = ProcessScanner::diff_snapshot(&mut known, snapshot.clone(), &filter);
        assert!(events.is_empty());
        // Excluded PIDs stay out of the known set as well.
        assert!(!known.contains(&500));

        let events = ProcessScanner::diff_snapshot(&mut known, snapshot, &filter);
        assert!(events.is_empty());
    }

    #[test]
    fn test_actor_normalized_and_missing_user() {
        let mut known = HashSet::new();
        let filter = ExclusionFilter::default();

        let snapshot = vec![
            record(10, "cmd.exe", "CORP\\alice"),
            ProcessRecord {
                pid: 11,
                name: "ghost".to_string(),
                user: None,
            },
        ];
        let mut events = ProcessScanner::diff_snapshot(&mut known, snapshot, &filter);
        events.sort_by_key(|e| e.subject_id);

        assert_eq!(events[0].actor, "alice");
        assert_eq!(events[1].actor, "unknown");
    }

    #[test]
    fn test_scanner_start_stop_does_not_hang() {
        let (dispatcher, _rx) = scanner_parts();
        let mut scanner = ProcessScanner::new(
            ExclusionFilter::default(),
            dispatcher,
            ShutdownSignal::new(),
        );

        scanner.start().unwrap();
        assert!(scanner.is_running());
        std::thread::sleep(Duration::from_millis(50));
        scanner.stop();
        assert!(!scanner.is_running());
    }

    #[test]
    fn test_stop_within_one_interval() {
        let (dispatcher, rx) = scanner_parts();
        let mut scanner = ProcessScanner::new(
            ExclusionFilter::default(),
            dispatcher,
            ShutdownSignal::new(),
        );

        scanner.start().unwrap();
        // Let the baseline enumeration finish.
        std::thread::sleep(Duration::from_millis(600));

        let start = Instant::now();
        scanner.stop();
        assert!(start.elapsed() < POLL_INTERVAL);

        // Nothing is dispatched after the loop has exited.
        while rx.try_recv().is_ok() {}
        std::thread::sleep(Duration::from_millis(100));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_baseline_populates_known_set() {
        let (dispatcher, _rx) = scanner_parts();
        let mut scanner = ProcessScanner::new(
            ExclusionFilter::default(),
            dispatcher,
            ShutdownSignal::new(),
        );

        scanner.start().unwrap();
        std::thread::sleep(Duration::from_millis(600));
        // At minimum the test runner itself was enumerated.
        assert!(scanner.known_count() > 0);
        assert!(scanner.is_known(std::process::id()));
        scanner.stop();
    }

    #[test]
    fn test_signal_stop_is_nonblocking() {
        let (dispatcher, _rx) = scanner_parts();
        let mut scanner = ProcessScanner::new(
            ExclusionFilter::default(),
            dispatcher,
            ShutdownSignal::new(),
        );

        scanner.start().unwrap();
        scanner.signal_stop();
        assert!(!scanner.is_running());
        scanner.stop();
    }
}
