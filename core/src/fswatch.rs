//! Filesystem change watcher for SysSentinel
//!
//! Watches one root directory recursively via the platform's native
//! notification backend (through `notify`) and reports file creations
//! and renames/moves as normalized events. Directory creations are not
//! reported. Exclusion filtering happens here, before dispatch; for a
//! move only the destination path is checked (the inherited policy).

use crate::dispatch::Dispatcher;
use crate::error::{CoreError, Result};
use crate::event::{current_user, Event};
use crate::exclusion::ExclusionFilter;
use crate::sentinel::MonitorSubsystem;
use crate::shutdown::ShutdownSignal;
use log::warn;
use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Event as NotifyEvent, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How long the consumer thread blocks on the notification channel
/// before re-checking the stop signal.
const DRAIN_INTERVAL: Duration = Duration::from_millis(100);

/// A raw change already reduced to the two shapes we report
#[derive(Debug, Clone, PartialEq, Eq)]
enum Change {
    Created(PathBuf),
    Moved { source: PathBuf, dest: PathBuf },
}

/// Pairs the split rename notifications the backends produce.
///
/// Backends disagree here: inotify can deliver `From`, `To` AND a
/// synthesized `Both` for one rename, Windows delivers `From`/`To`
/// halves, FSEvents delivers per-path `Any` events. `last_pair`
/// remembers a move already emitted from paired halves so the trailing
/// `Both` does not report it a second time.
#[derive(Debug, Default)]
struct RenameTracker {
    pending: Option<PathBuf>,
    last_pair: Option<(PathBuf, PathBuf)>,
}

/// Recursive watcher over a single root directory.
///
/// Purely reactive: between `start` and `stop` it only responds to
/// backend notifications, never polls.
pub struct FsWatcher {
    root: PathBuf,
    filter: ExclusionFilter,
    dispatcher: Dispatcher,
    signal: ShutdownSignal,
    thread_handle: Option<JoinHandle<()>>,
}

impl FsWatcher {
    /// Create a watcher for `root`. The signal may be shared with other
    /// subsystems; raising it stops every loop attached to it.
    pub fn new(
        root: PathBuf,
        filter: ExclusionFilter,
        dispatcher: Dispatcher,
        signal: ShutdownSignal,
    ) -> Self {
        Self {
            root,
            filter,
            dispatcher,
            signal,
            thread_handle: None,
        }
    }

    /// The watched root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Begin recursive monitoring of the root and spawn the consumer
    /// thread. Fails only if the root itself cannot be watched;
    /// unreadable subtrees are reported by the backend as errors and
    /// skipped.
    pub fn start(&mut self) -> Result<()> {
        if self.thread_handle.is_some() {
            return Ok(());
        }

        let (tx, rx) = mpsc::channel();
        let mut watcher =
            notify::recommended_watcher(tx).map_err(|e| CoreError::Watch(e.to_string()))?;
        watcher
            .watch(&self.root, RecursiveMode::Recursive)
            .map_err(|e| CoreError::Watch(e.to_string()))?;

        let filter = self.filter.clone();
        let dispatcher = self.dispatcher.clone();
        let signal = self.signal.clone();

        let handle = thread::Builder::new()
            .name("fswatch".to_string())
            .spawn(move || {
                Self::watch_loop(watcher, rx, filter, dispatcher, signal);
            })
            .map_err(CoreError::Io)?;

        self.thread_handle = Some(handle);
        Ok(())
    }

    /// Stop watching and wait for the consumer thread
    pub fn stop(&mut self) {
        self.signal.shutdown();
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }

    /// Signal the watcher to stop without waiting for the thread.
    /// Used by the sentinel for two-phase shutdown.
    pub fn signal_stop(&self) {
        self.signal.shutdown();
    }

    /// Whether the consumer thread is running
    pub fn is_running(&self) -> bool {
        self.thread_handle.is_some() && !self.signal.is_shutdown()
    }

    fn watch_loop(
        watcher: RecommendedWatcher,
        rx: Receiver<notify::Result<NotifyEvent>>,
        filter: ExclusionFilter,
        dispatcher: Dispatcher,
        signal: ShutdownSignal,
    ) {
        let mut renames = RenameTracker::default();

        loop {
            if signal.is_shutdown() {
                break;
            }

            match rx.recv_timeout(DRAIN_INTERVAL) {
                Ok(Ok(event)) => {
                    if let Some(change) = Self::map_change(event, &mut renames) {
                        Self::handle_change(change, &filter, &dispatcher);
                    }
                }
                Ok(Err(e)) => {
                    // Localized backend failure (e.g. unreadable subtree):
                    // skip it, keep covering accessible paths.
                    warn!("filesystem watch error: {}", e);
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        // Dropping the watcher tears down the backend subscription.
        drop(watcher);
    }

    /// Reduce a backend notification to a reportable change, if any
    fn map_change(event: NotifyEvent, renames: &mut RenameTracker) -> Option<Change> {
        match event.kind {
            EventKind::Create(kind) => {
                let path = event.paths.into_iter().next()?;
                if kind == CreateKind::Folder || path.is_dir() {
                    return None;
                }
                Some(Change::Created(path))
            }
            EventKind::Modify(ModifyKind::Name(mode)) => {
                let mut paths = event.paths.into_iter();
                match mode {
                    RenameMode::Both => {
                        let source = paths.next()?;
                        let dest = paths.next()?;
                        if renames.last_pair.take() == Some((source.clone(), dest.clone())) {
                            // Already emitted from the paired halves.
                            return None;
                        }
                        Some(Change::Moved { source, dest })
                    }
                    RenameMode::From => {
                        renames.pending = paths.next();
                        None
                    }
                    RenameMode::To => {
                        let dest = paths.next()?;
                        let source = renames.pending.take()?;
                        renames.last_pair = Some((source.clone(), dest.clone()));
                        Some(Change::Moved { source, dest })
                    }
                    RenameMode::Any | RenameMode::Other => {
                        let first = paths.next()?;
                        if let Some(dest) = paths.next() {
                            return Some(Change::Moved {
                                source: first,
                                dest,
                            });
                        }
                        match renames.pending.take() {
                            Some(source) => Some(Change::Moved {
                                source,
                                dest: first,
                            }),
                            None => {
                                renames.pending = Some(first);
                                None
                            }
                        }
                    }
                }
            }
            _ => None,
        }
    }

    /// Apply exclusion filtering and dispatch
    fn handle_change(change: Change, filter: &ExclusionFilter, dispatcher: &Dispatcher) {
        let actor = current_user();
        match change {
            Change::Created(path) => {
                if filter.is_path_excluded(&path) {
                    return;
                }
                dispatcher.dispatch(Event::file_created(&path, &actor));
            }
            Change::Moved { source, dest } => {
                // Only the destination decides suppression.
                if filter.is_path_excluded(&dest) {
                    return;
                }
                dispatcher.dispatch(Event::file_moved(&source, &dest, &actor));
            }
        }
    }
}

impl Drop for FsWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

impl MonitorSubsystem for FsWatcher {
    fn start(&mut self) -> Result<()> {
        FsWatcher::start(self)
    }

    fn stop(&mut self) {
        FsWatcher::stop(self)
    }

    fn signal_stop(&self) {
        FsWatcher::signal_stop(self)
    }

    fn is_running(&self) -> bool {
        FsWatcher::is_running(self)
    }
}
