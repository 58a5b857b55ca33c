//! Leveled trace output for simulation runs.
//!
//! Every run owns its [`Tracer`]; nothing is process-wide, so independent runs
//! can execute in parallel. Lines are keyed by simulated time:
//! `[2025-01-01 12:00:00-DEBUG: t = 3: Job 2 assigned to Core 1]`.
//!
//! Verbosity levels map onto the lowest level that is written:
//! - 0: errors only
//! - 1: warnings
//! - 2: info
//! - 3: debug (every scheduling point)

use chrono::Local;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::graph::Time;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Verbosity level constants.
pub const VERBOSITY_ERRORS: u8 = 0;
pub const VERBOSITY_WARNINGS: u8 = 1;
pub const VERBOSITY_INFO: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum TraceLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl TraceLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    /// Lowest level written at the given verbosity.
    pub fn from_verbosity(verbosity: u8) -> Self {
        match verbosity {
            VERBOSITY_ERRORS => Self::Error,
            VERBOSITY_WARNINGS => Self::Warning,
            VERBOSITY_INFO => Self::Info,
            VERBOSITY_DEBUG..=u8::MAX => Self::Debug,
        }
    }
}

/// Where trace lines go.
#[derive(Debug)]
pub enum TraceSink {
    Silent,
    Stderr,
    Stdout,
    /// Appends to a file.
    File(BufWriter<File>),
    /// Keeps lines in memory; see [`Tracer::take_lines`].
    Memory(Vec<String>),
}

#[derive(Debug)]
pub struct Tracer {
    threshold: TraceLevel,
    sink: TraceSink,
}

impl Tracer {
    pub fn new(threshold: TraceLevel, sink: TraceSink) -> Self {
        Self { threshold, sink }
    }

    pub fn silent() -> Self {
        Self::new(TraceLevel::Error, TraceSink::Silent)
    }

    pub fn stderr(threshold: TraceLevel) -> Self {
        Self::new(threshold, TraceSink::Stderr)
    }

    pub fn memory(threshold: TraceLevel) -> Self {
        Self::new(threshold, TraceSink::Memory(Vec::new()))
    }

    /// Open `path` in append mode.
    pub fn file(threshold: TraceLevel, path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(threshold, TraceSink::File(BufWriter::new(file))))
    }

    #[inline]
    pub fn enabled(&self, level: TraceLevel) -> bool {
        !matches!(self.sink, TraceSink::Silent) && level >= self.threshold
    }

    /// Write one line. I/O failures are dropped; tracing never affects a run.
    pub fn emit(&mut self, level: TraceLevel, timestamp: Time, message: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        let line = format!(
            "[{}-{}: t = {}: {}]",
            Local::now().format(DATE_FORMAT),
            level.label(),
            timestamp,
            message
        );
        match &mut self.sink {
            TraceSink::Silent => {}
            TraceSink::Stderr => eprintln!("{}", line),
            TraceSink::Stdout => println!("{}", line),
            TraceSink::File(out) => {
                let _ = writeln!(out, "{}", line);
            }
            TraceSink::Memory(lines) => lines.push(line),
        }
    }

    /// Drain captured lines (memory sink only) and flush file output.
    pub fn take_lines(&mut self) -> Vec<String> {
        match &mut self.sink {
            TraceSink::Memory(lines) => std::mem::take(lines),
            TraceSink::File(out) => {
                let _ = out.flush();
                Vec::new()
            }
            _ => Vec::new(),
        }
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::stderr(TraceLevel::Error)
    }
}

/// Trace at DEBUG level.
///
/// Used for: scheduling points, queue transitions, dispatch decisions.
#[macro_export]
macro_rules! trace_debug {
    ($tracer:expr, $t:expr, $($arg:tt)*) => {
        if $tracer.enabled($crate::logging::TraceLevel::Debug) {
            $tracer.emit($crate::logging::TraceLevel::Debug, $t, format_args!($($arg)*));
        }
    };
}

/// Trace at INFO level.
#[macro_export]
macro_rules! trace_info {
    ($tracer:expr, $t:expr, $($arg:tt)*) => {
        if $tracer.enabled($crate::logging::TraceLevel::Info) {
            $tracer.emit($crate::logging::TraceLevel::Info, $t, format_args!($($arg)*));
        }
    };
}

/// Trace at WARNING level.
///
/// Used for: incomplete priority assignment in lenient mode.
#[macro_export]
macro_rules! trace_warning {
    ($tracer:expr, $t:expr, $($arg:tt)*) => {
        if $tracer.enabled($crate::logging::TraceLevel::Warning) {
            $tracer.emit($crate::logging::TraceLevel::Warning, $t, format_args!($($arg)*));
        }
    };
}

/// Trace at ERROR level.
///
/// Used for: simulation overrun.
#[macro_export]
macro_rules! trace_error {
    ($tracer:expr, $t:expr, $($arg:tt)*) => {
        if $tracer.enabled($crate::logging::TraceLevel::Error) {
            $tracer.emit($crate::logging::TraceLevel::Error, $t, format_args!($($arg)*));
        }
    };
}
