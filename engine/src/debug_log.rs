//! Leveled, per-subsystem diagnostic log.
//!
//! Every emitted record goes to a console stream and is appended to a log
//! file as a single `[LEVEL] [MODULE] message` line. The file is never held
//! open between calls to [`DebugLog::log`]; [`DebugLog::batch`] keeps it open
//! for the lifetime of the returned sink instead.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Deserialize;

const UNKNOWN: &str = "UNKNOWN";

const LEVEL_LABELS: [&str; 4] = ["ERROR", "WARNING", "INFO", "DEBUG"];

const MODULE_LABELS: [&str; 6] = ["RENDER", "INPUT", "AUDIO", "PHYSICS", "FILES", "NETWORK"];

/// Severity of a record. Lower ordinals are more severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    #[serde(alias = "warn")]
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn label(self) -> &'static str {
        level_label(self as u8)
    }
}

/// Subsystem a record originates from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Module {
    Render = 0,
    Input = 1,
    Audio = 2,
    Physics = 3,
    Files = 4,
    Network = 5,
}

impl Module {
    pub fn label(self) -> &'static str {
        module_label(self as u8)
    }
}

/// Label for a level ordinal, `UNKNOWN` when out of range.
pub fn level_label(ordinal: u8) -> &'static str {
    LEVEL_LABELS
        .get(ordinal as usize)
        .copied()
        .unwrap_or(UNKNOWN)
}

/// Label for a module ordinal, `UNKNOWN` when out of range.
pub fn module_label(ordinal: u8) -> &'static str {
    MODULE_LABELS
        .get(ordinal as usize)
        .copied()
        .unwrap_or(UNKNOWN)
}

fn format_line(level: u8, module: u8, message: &str) -> String {
    format!("[{}] [{}] {}", level_label(level), module_label(module), message)
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Console + append-only file logger with a verbosity threshold.
pub struct DebugLog {
    threshold: LogLevel,
    file: PathBuf,
    console: Box<dyn Write>,
}

impl DebugLog {
    /// Logger writing to stdout and appending to `file`, threshold `Debug`.
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self::with_console(file, Box::new(io::stdout()))
    }

    pub fn with_console(file: impl Into<PathBuf>, console: Box<dyn Write>) -> Self {
        Self {
            threshold: LogLevel::Debug,
            file: file.into(),
            console,
        }
    }

    pub fn level(&self) -> LogLevel {
        self.threshold
    }

    /// Changes the threshold for all subsequent records.
    pub fn set_level(&mut self, level: LogLevel) {
        self.threshold = level;
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    fn passes(&self, ordinal: u8) -> bool {
        ordinal <= self.threshold as u8
    }

    pub fn log(&mut self, level: LogLevel, module: Module, message: impl AsRef<str>) {
        self.log_raw(level as u8, module as u8, message.as_ref());
    }

    /// Logs with untyped ordinals. Unknown ordinals are labelled `UNKNOWN`.
    pub fn log_raw(&mut self, level: u8, module: u8, message: &str) {
        if !self.passes(level) {
            return;
        }
        let line = format_line(level, module, message);
        self.write_console(&line);

        // A log file that cannot be opened only loses the file copy.
        if let Ok(mut file) = open_append(&self.file) {
            let _ = writeln!(file, "{line}");
        }
    }

    pub fn error(&mut self, module: Module, message: impl AsRef<str>) {
        self.log(LogLevel::Error, module, message);
    }

    pub fn warning(&mut self, module: Module, message: impl AsRef<str>) {
        self.log(LogLevel::Warning, module, message);
    }

    pub fn info(&mut self, module: Module, message: impl AsRef<str>) {
        self.log(LogLevel::Info, module, message);
    }

    pub fn debug(&mut self, module: Module, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, module, message);
    }

    /// Opens a sink that reuses one file handle for a run of records.
    pub fn batch(&mut self) -> LogBatch<'_> {
        LogBatch {
            log: self,
            file: BatchFile::Unopened,
        }
    }

    fn write_console(&mut self, line: &str) {
        let _ = writeln!(self.console, "{line}");
    }
}

enum BatchFile {
    Unopened,
    Open(File),
    Unavailable,
}

/// Scoped sink returned by [`DebugLog::batch`].
///
/// The log file is opened on the first emitted line, flushed after every line
/// and closed when the batch is dropped.
pub struct LogBatch<'a> {
    log: &'a mut DebugLog,
    file: BatchFile,
}

impl LogBatch<'_> {
    pub fn log(&mut self, level: LogLevel, module: Module, message: impl AsRef<str>) {
        let (level, module) = (level as u8, module as u8);
        if !self.log.passes(level) {
            return;
        }
        let line = format_line(level, module, message.as_ref());
        self.log.write_console(&line);

        if let BatchFile::Unopened = self.file {
            self.file = match open_append(&self.log.file) {
                Ok(file) => BatchFile::Open(file),
                Err(_) => BatchFile::Unavailable,
            };
        }
        if let BatchFile::Open(file) = &mut self.file {
            let _ = writeln!(file, "{line}").and_then(|_| file.flush());
        }
    }
}
