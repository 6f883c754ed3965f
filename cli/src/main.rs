//! SysSentinel CLI
//!
//! Terminal consumer of the detection event stream: wires a logger (and
//! optionally a JSONL session log) to the core engine and runs until
//! interrupted.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::path::PathBuf;
use syssentinel_core::{
    cleanup_old_logs, Config, EventSink, EventStorage, FanoutSink, LogFormat, Logger, LoggerConfig,
    Sentinel, SessionLog,
};

/// SysSentinel - host activity monitoring
#[derive(Parser)]
#[command(name = "syssentinel")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output format (overrides the config's default_format)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Hide timestamps
    #[arg(long)]
    no_timestamps: bool,

    /// Directory to watch recursively (defaults to the home directory)
    #[arg(short, long)]
    watch: Option<PathBuf>,

    /// Extra path substring to suppress (can be specified multiple times)
    #[arg(long)]
    exclude_path: Vec<String>,

    /// Extra process name to suppress (can be specified multiple times)
    #[arg(long)]
    exclude_process: Vec<String>,

    /// Disable the periodic process scanner
    #[arg(long)]
    no_process_scan: bool,

    /// Disable the filesystem watcher
    #[arg(long)]
    no_fswatch: bool,

    /// Write detected events to a JSONL session log in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information
    Version,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Pretty,
    Json,
    Compact,
}

impl From<OutputFormat> for LogFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Pretty => LogFormat::Pretty,
            OutputFormat::Json => LogFormat::JsonLines,
            OutputFormat::Compact => LogFormat::Compact,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            print_version();
            Ok(())
        }
        None => run_monitor(cli),
    }
}

fn print_version() {
    println!(
        "{} v{}",
        "SysSentinel".cyan().bold(),
        syssentinel_core::VERSION
    );
    println!("Host activity sentinel - process and filesystem change detection");
    println!();
    println!("Core: {}", syssentinel_core::NAME);
}

fn run_monitor(cli: Cli) -> Result<()> {
    // Load config file if specified or use the default location
    let mut config = if let Some(ref path) = cli.config {
        Config::load_from_path(path).unwrap_or_else(|e| {
            eprintln!(
                "[syssentinel] Warning: Failed to load config from {}: {}, using defaults",
                path.display(),
                e
            );
            Config::default()
        })
    } else {
        Config::load().unwrap_or_else(|e| {
            eprintln!("[syssentinel] Warning: Failed to load config: {}, using defaults", e);
            Config::default()
        })
    };

    // Fold CLI switches into the config
    if let Some(watch) = cli.watch {
        config.monitoring.watch_root = Some(watch);
    }
    if cli.no_process_scan {
        config.monitoring.scan_processes = false;
    }
    if cli.no_fswatch {
        config.monitoring.watch_filesystem = false;
    }
    config.exclusions.excluded_paths.extend(cli.exclude_path);
    config
        .exclusions
        .excluded_processes
        .extend(cli.exclude_process);
    if let Some(log_dir) = cli.log_dir {
        config.logging.enabled = true;
        config.logging.log_dir = Some(log_dir);
    }

    let watch_root = config.monitoring.effective_watch_root()?;

    if config.general.verbose {
        eprintln!(
            "[syssentinel] Excluding {} path pattern(s) and {} process name(s)",
            config.exclusions.excluded_paths.len(),
            config.exclusions.excluded_processes.len()
        );
    }

    let format = cli
        .format
        .map(LogFormat::from)
        .unwrap_or_else(|| default_format(&config.general.default_format));

    // Terminal view of the stream, plus an optional file log
    let logger = Logger::new(LoggerConfig {
        format,
        show_timestamps: !cli.no_timestamps,
        use_colors: !cli.no_color,
    });

    let sink: Box<dyn EventSink> = if config.logging.enabled {
        let log_dir = config.logging.effective_log_dir()?;
        if config.logging.retention_days > 0 {
            if let Ok(removed) = cleanup_old_logs(&log_dir, config.logging.retention_days) {
                if removed > 0 {
                    eprintln!("[syssentinel] Removed {} expired session log(s)", removed);
                }
            }
        }
        let session_log =
            SessionLog::new(&log_dir).context("failed to create the session log")?;
        eprintln!("[syssentinel] Logging events to {}", session_log.path().display());
        Box::new(FanoutSink::new(vec![
            Box::new(logger),
            Box::new(session_log),
        ]))
    } else {
        Box::new(logger)
    };

    let mut sentinel =
        Sentinel::new(&config, sink).context("failed to build the detection engine")?;
    sentinel.start().context("failed to start monitoring")?;

    print_banner(&watch_root, &config, cli.no_color);

    // Ctrl+C / SIGTERM flips the shared stop signal
    let shutdown = sentinel.shutdown_signal();
    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("failed to install signal handlers")?;
    std::thread::spawn(move || {
        if signals.forever().next().is_some() {
            shutdown.shutdown();
        }
    });

    sentinel.shutdown_signal().wait();
    sentinel.stop();

    if cli.no_color {
        println!("Monitoring stopped.");
    } else {
        println!("{}", "Monitoring stopped.".dimmed());
    }
    Ok(())
}

fn default_format(name: &str) -> LogFormat {
    match name {
        "json" => LogFormat::JsonLines,
        "compact" => LogFormat::Compact,
        _ => LogFormat::Pretty,
    }
}

fn print_banner(watch_root: &std::path::Path, config: &Config, no_color: bool) {
    let scanning = config.monitoring.scan_processes;
    let watching = config.monitoring.watch_filesystem;
    let what = match (scanning, watching) {
        (true, true) => format!("processes and {}", watch_root.display()),
        (true, false) => "processes".to_string(),
        (false, true) => watch_root.display().to_string(),
        (false, false) => "nothing (both monitors disabled)".to_string(),
    };
    let line = format!("\u{25c9} Sentinel active - watching {}", what);

    println!();
    if no_color {
        println!("{}", line);
    } else {
        println!("{}", line.green().bold());
    }
    println!("Press Ctrl+C to stop.");
    println!();
}
