//! SysSentinel Core Library
//!
//! The detection engine of a lightweight host-activity sentinel: a
//! periodic process-set scanner and a recursive filesystem watcher feed
//! one normalized event stream that consumers subscribe to through an
//! [`EventSink`].
//!
//! # Example
//!
//! ```no_run
//! use syssentinel_core::{ChannelSink, Config, Sentinel};
//!
//! let config = Config::default();
//! let (sink, events) = ChannelSink::channel();
//! let mut sentinel = Sentinel::new(&config, Box::new(sink)).expect("build sentinel");
//! sentinel.start().expect("start monitoring");
//!
//! for event in events.iter().take(3) {
//!     println!("{} {} {}", event.time_display(), event.action, event.detail);
//! }
//! sentinel.stop();
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod exclusion;
pub mod fswatch;
pub mod logger;
pub mod process_scan;
pub mod sentinel;
pub mod shutdown;
pub mod storage;

// Re-export commonly used types
pub use config::{Config, ExclusionConfig, GeneralConfig, LoggingConfig, MonitoringConfig};
pub use dispatch::{ChannelSink, Dispatcher, EventSink, FanoutSink};
pub use error::{ConfigError, CoreError, Result, StorageError};
pub use event::{current_user, normalize_actor, Action, Event};
pub use exclusion::{default_excluded_paths, default_excluded_processes, ExclusionFilter};
pub use fswatch::FsWatcher;
pub use logger::{LogFormat, Logger, LoggerConfig};
pub use process_scan::{ProcessRecord, ProcessScanner, POLL_INTERVAL};
pub use sentinel::{MonitorSubsystem, Sentinel};
pub use shutdown::ShutdownSignal;
pub use storage::{cleanup_old_logs, EventStorage, SessionLog};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
