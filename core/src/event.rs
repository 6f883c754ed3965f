//! Event types for SysSentinel
//!
//! Defines the normalized event record emitted by the detection engine.
//! Every event is fully populated at construction time and never mutated
//! after it has been handed to the dispatcher.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Kind of detected occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// A process appeared that was not in the known set
    ProcessStarted,
    /// A file (not a directory) was created under the watch root
    FileCreated,
    /// A file or directory was renamed or moved under the watch root
    FileMoved,
}

impl Action {
    /// Returns the display label used in table-style output
    pub fn label(&self) -> &'static str {
        match self {
            Action::ProcessStarted => "PROCESS STARTED",
            Action::FileCreated => "FILE CREATED",
            Action::FileMoved => "FILE MOVED",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A detection event captured by SysSentinel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event ID
    pub id: uuid::Uuid,
    /// Wall-clock time of detection
    pub timestamp: DateTime<Local>,
    /// Owning user, normalized (domain/host prefixes stripped)
    pub actor: String,
    /// What happened
    pub action: Action,
    /// Process ID for process events; `None` for filesystem events
    pub subject_id: Option<u32>,
    /// Human-readable object description (executable name, file name,
    /// or `old -> new` for moves)
    pub detail: String,
}

impl Event {
    fn new(action: Action, actor: &str, subject_id: Option<u32>, detail: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            timestamp: Local::now(),
            actor: actor.to_string(),
            action,
            subject_id,
            detail,
        }
    }

    /// Create a process start event
    pub fn process_started(pid: u32, name: &str, actor: &str) -> Self {
        Self::new(Action::ProcessStarted, actor, Some(pid), name.to_string())
    }

    /// Create a file creation event
    pub fn file_created(path: &Path, actor: &str) -> Self {
        Self::new(Action::FileCreated, actor, None, base_name(path))
    }

    /// Create a file move/rename event, `detail` carries both base names
    pub fn file_moved(source: &Path, dest: &Path, actor: &str) -> Self {
        let detail = format!("{} -> {}", base_name(source), base_name(dest));
        Self::new(Action::FileMoved, actor, None, detail)
    }

    /// Timestamp at second resolution, for table display
    pub fn time_display(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }

    /// Subject id for display; filesystem events show `-`
    pub fn subject_display(&self) -> String {
        match self.subject_id {
            Some(pid) => pid.to_string(),
            None => "-".to_string(),
        }
    }
}

/// Strip `DOMAIN\` or `host/` prefixes from a raw account name
pub fn normalize_actor(raw: &str) -> String {
    raw.rsplit(['\\', '/']).next().unwrap_or(raw).to_string()
}

/// Best-effort name of the user running the sentinel, normalized
pub fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .map(|name| normalize_actor(&name))
        .unwrap_or_else(|_| "unknown".to_string())
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_action_labels() {
        assert_eq!(Action::ProcessStarted.label(), "PROCESS STARTED");
        assert_eq!(Action::FileCreated.label(), "FILE CREATED");
        assert_eq!(Action::FileMoved.label(), "FILE MOVED");
    }

    #[test]
    fn test_process_event_fully_populated() {
        let event = Event::process_started(4242, "nc", "alice");

        assert_eq!(event.action, Action::ProcessStarted);
        assert_eq!(event.subject_id, Some(4242));
        assert_eq!(event.detail, "nc");
        assert_eq!(event.actor, "alice");
        assert!(!event.time_display().is_empty());
    }

    #[test]
    fn test_file_created_uses_base_name() {
        let event = Event::file_created(&PathBuf::from("/home/alice/docs/report.txt"), "alice");

        assert_eq!(event.action, Action::FileCreated);
        assert_eq!(event.detail, "report.txt");
        assert_eq!(event.subject_id, None);
        assert_eq!(event.subject_display(), "-");
    }

    #[test]
    fn test_file_moved_detail_shape() {
        let event = Event::file_moved(
            &PathBuf::from("/home/alice/report.txt"),
            &PathBuf::from("/home/alice/archive/report.txt"),
            "alice",
        );

        assert_eq!(event.action, Action::FileMoved);
        assert_eq!(event.detail, "report.txt -> report.txt");
    }

    #[test]
    fn test_normalize_actor_strips_prefixes() {
        assert_eq!(normalize_actor("CORP\\alice"), "alice");
        assert_eq!(normalize_actor("host/bob"), "bob");
        assert_eq!(normalize_actor("carol"), "carol");
        assert_eq!(normalize_actor(""), "");
    }

    #[test]
    fn test_event_serialization() {
        let event = Event::file_moved(
            &PathBuf::from("a.txt"),
            &PathBuf::from("b.txt"),
            "alice",
        );

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"action\":\"file_moved\""));
        assert!(json.contains("a.txt -> b.txt"));

        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back.action, Action::FileMoved);
        assert_eq!(back.detail, event.detail);
    }

    #[test]
    fn test_subject_display_for_process() {
        let event = Event::process_started(7, "sh", "root");
        assert_eq!(event.subject_display(), "7");
    }
}
