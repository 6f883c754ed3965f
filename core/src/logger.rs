//! Event presentation for SysSentinel
//!
//! Formats detection events for terminal or machine consumption. The
//! logger doubles as an [`EventSink`], so a terminal view of the stream
//! is just another sink.

use crate::dispatch::EventSink;
use crate::event::{Action, Event};
use colored::Colorize;
use log::warn;
use std::io::{self, Write};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable table-style lines for the terminal
    #[default]
    Pretty,
    /// JSON Lines for machine processing
    JsonLines,
    /// Compact single-line format
    Compact,
}

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Output format
    pub format: LogFormat,
    /// Whether to show timestamps
    pub show_timestamps: bool,
    /// Whether to use colors (for Pretty format)
    pub use_colors: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            show_timestamps: true,
            use_colors: true,
        }
    }
}

/// Event logger
#[derive(Clone)]
pub struct Logger {
    config: LoggerConfig,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LoggerConfig::default())
    }
}

impl Logger {
    /// Create a new logger with the given configuration
    pub fn new(config: LoggerConfig) -> Self {
        Self { config }
    }

    /// Format an event according to the logger configuration
    pub fn format(&self, event: &Event) -> String {
        match self.config.format {
            LogFormat::Pretty => self.format_pretty(event),
            LogFormat::JsonLines => Self::format_json(event),
            LogFormat::Compact => Self::format_compact(event),
        }
    }

    /// Log an event to the given writer
    pub fn log<W: Write>(&self, event: &Event, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "{}", self.format(event))
    }

    /// Log an event to stdout
    pub fn log_stdout(&self, event: &Event) -> io::Result<()> {
        println!("{}", self.format(event));
        Ok(())
    }

    fn format_pretty(&self, event: &Event) -> String {
        let mut parts = Vec::new();

        if self.config.show_timestamps {
            let time = event.time_display();
            parts.push(if self.config.use_colors {
                time.dimmed().to_string()
            } else {
                time
            });
        }

        // Pad before coloring so ANSI codes don't skew the columns.
        let label = format!("{:<15}", event.action.label());
        parts.push(if self.config.use_colors {
            match event.action {
                Action::ProcessStarted => label.cyan().bold().to_string(),
                Action::FileCreated => label.green().to_string(),
                Action::FileMoved => label.yellow().to_string(),
            }
        } else {
            label
        });

        parts.push(format!("{:<12}", event.actor));
        parts.push(format!("{:>7}", event.subject_display()));
        parts.push(event.detail.clone());

        parts.join("  ")
    }

    fn format_json(event: &Event) -> String {
        serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_compact(event: &Event) -> String {
        format!(
            "[{}] {} {} {} {}",
            event.time_display(),
            event.action.label(),
            event.actor,
            event.subject_display(),
            event.detail
        )
    }
}

impl EventSink for Logger {
    fn accept(&mut self, event: Event) {
        if let Err(e) = self.log_stdout(&event) {
            warn!("failed to write event to stdout: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_logger(format: LogFormat) -> Logger {
        Logger::new(LoggerConfig {
            format,
            show_timestamps: true,
            use_colors: false,
        })
    }

    #[test]
    fn test_pretty_contains_all_columns() {
        let logger = plain_logger(LogFormat::Pretty);
        let event = Event::process_started(321, "nc", "alice");

        let line = logger.format(&event);
        assert!(line.contains("PROCESS STARTED"));
        assert!(line.contains("alice"));
        assert!(line.contains("321"));
        assert!(line.contains("nc"));
    }

    #[test]
    fn test_pretty_without_timestamps() {
        let logger = Logger::new(LoggerConfig {
            format: LogFormat::Pretty,
            show_timestamps: false,
            use_colors: false,
        });
        let event = Event::process_started(1, "init", "root");

        let line = logger.format(&event);
        assert!(!line.starts_with(&event.time_display()));
        assert!(line.starts_with("PROCESS STARTED"));
    }

    #[test]
    fn test_json_lines_round_trip() {
        let logger = plain_logger(LogFormat::JsonLines);
        let event = Event::file_created(std::path::Path::new("/tmp/a.txt"), "bob");

        let line = logger.format(&event);
        assert!(line.contains("\"action\":\"file_created\""));
        let back: Event = serde_json::from_str(&line).unwrap();
        assert_eq!(back.detail, "a.txt");
    }

    #[test]
    fn test_compact_shape() {
        let logger = plain_logger(LogFormat::Compact);
        let event = Event::file_moved(
            std::path::Path::new("a.txt"),
            std::path::Path::new("b.txt"),
            "carol",
        );

        let line = logger.format(&event);
        assert!(line.starts_with('['));
        assert!(line.contains("FILE MOVED"));
        assert!(line.contains("carol"));
        assert!(line.contains("- a.txt -> b.txt"));
    }

    #[test]
    fn test_log_writes_to_writer() {
        let logger = plain_logger(LogFormat::Compact);
        let event = Event::process_started(2, "sshd", "root");

        let mut buffer = Vec::new();
        logger.log(&event, &mut buffer).unwrap();

        let written = String::from_utf8(buffer).unwrap();
        assert!(written.ends_with('\n'));
        assert!(written.contains("sshd"));
    }
}
