//! Logging backend for mftscope
//!
//! Every component logs through the `log` facade with a `target:` naming the
//! component. This module installs the process-wide sink: stderr by default,
//! or a log file when one is requested on the command line.

use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;
use std::time::SystemTime;

/// Global logger instance
static LOGGER: OnceLock<MftLogger> = OnceLock::new();

/// Main logger struct
pub struct MftLogger {
    file: Option<Mutex<File>>,
    level: LevelFilter,
}

impl MftLogger {
    /// Create a new logger writing to `log_file` (truncated) or stderr
    fn new(level: LevelFilter, log_file: Option<&Path>) -> std::io::Result<Self> {
        let file = match log_file {
            Some(path) => Some(Mutex::new(
                OpenOptions::new()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(path)?,
            )),
            None => None,
        };

        Ok(Self { file, level })
    }

    fn format_entry(level: Level, target: &str, args: &std::fmt::Arguments<'_>) -> String {
        let timestamp = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);

        format!("[{:013}] [{:5}] [{}] {}\n", timestamp, level, target, args)
    }
}

impl Log for MftLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = Self::format_entry(record.level(), record.target(), record.args());

        match self.file {
            Some(ref file) => {
                let _ = file.lock().write_all(entry.as_bytes());
            }
            None => {
                let _ = std::io::stderr().lock().write_all(entry.as_bytes());
            }
        }
    }

    fn flush(&self) {
        if let Some(ref file) = self.file {
            let _ = file.lock().flush();
        }
    }
}

/// Map a `-v` count to a level filter
pub fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Initialize the global logger.
///
/// Calling this twice keeps the first logger; the second call is a no-op.
pub fn init(level: LevelFilter, log_file: Option<&Path>) -> crate::Result<()> {
    if LOGGER.get().is_some() {
        return Ok(());
    }

    let _ = LOGGER.set(MftLogger::new(level, log_file)?);

    if let Some(logger) = LOGGER.get() {
        if log::set_logger(logger).is_ok() {
            log::set_max_level(logger.level);
        }
    }

    Ok(())
}

/// Flush the log sink
pub fn flush() {
    log::logger().flush();
}

/// Write a separator line for readability
pub fn separator(label: &str) {
    log::info!(target: "---", "========== {} ==========", label);
}
