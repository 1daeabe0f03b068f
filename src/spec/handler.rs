//! Per-invocation error accumulation and reporting.

use std::cell::RefCell;
use std::io::Write;

use log::{debug, warn};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Unknown option, flag given a value, or missing option value.
    BadOption,
    NoPatternMatch,
    /// Option value failed conversion.
    BadOptionArg,
    /// Slot value failed conversion.
    BadPatternArg,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::BadOption => "bad_option",
            Self::NoPatternMatch => "no_pattern_match",
            Self::BadOptionArg => "bad_option_arg",
            Self::BadPatternArg => "bad_pattern_arg",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEntry {
    /// Argument the error refers to; equals the argument count for
    /// errors at end of input.
    pub arg_index: usize,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ErrorAccumulator {
    entries: Vec<ErrorEntry>,
}

impl ErrorAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, arg_index: usize, code: ErrorCode, message: impl Into<String>) {
        self.entries.push(ErrorEntry {
            arg_index,
            code,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries by increasing argument index, insertion order among equals.
    pub fn into_sorted(mut self) -> Vec<ErrorEntry> {
        self.entries.sort_by_key(|e| e.arg_index);
        self.entries
    }
}

/// Receives the errors of a failed invocation. `exit_status` arrives
/// pre-filled with the configured failure status and may be changed.
pub trait ErrorHandler {
    fn handle(&self, errors: &[ErrorEntry], exit_status: &mut i32);
}

impl<F> ErrorHandler for F
where
    F: Fn(&[ErrorEntry], &mut i32),
{
    fn handle(&self, errors: &[ErrorEntry], exit_status: &mut i32) {
        self(errors, exit_status)
    }
}

pub const DEFAULT_MAX_LOGGED_ERRORS: usize = 8;

/// Writes `<program>: <message>` lines, at most `max_entries` of them.
pub struct LogErrorHandler<W: Write> {
    sink: RefCell<W>,
    program: String,
    max_entries: usize,
}

impl LogErrorHandler<std::io::Stderr> {
    pub fn stderr(program: impl Into<String>) -> Self {
        Self::new(std::io::stderr(), program)
    }
}

impl<W: Write> LogErrorHandler<W> {
    pub fn new(sink: W, program: impl Into<String>) -> Self {
        Self {
            sink: RefCell::new(sink),
            program: program.into(),
            max_entries: DEFAULT_MAX_LOGGED_ERRORS,
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn into_inner(self) -> W {
        self.sink.into_inner()
    }

    fn write_all(&self, errors: &[ErrorEntry]) -> std::io::Result<()> {
        let mut sink = self.sink.borrow_mut();
        for entry in errors.iter().take(self.max_entries) {
            writeln!(sink, "{}: {}", self.program, entry.message)?;
        }
        if errors.len() > self.max_entries {
            let rest = errors.len() - self.max_entries;
            let noun = if rest == 1 { "error" } else { "errors" };
            writeln!(sink, "{}: ... and {rest} more {noun}", self.program)?;
        }
        sink.flush()
    }
}

impl<W: Write> ErrorHandler for LogErrorHandler<W> {
    fn handle(&self, errors: &[ErrorEntry], exit_status: &mut i32) {
        debug!(
            "reporting {} errors with exit status {exit_status}",
            errors.len()
        );
        if let Err(e) = self.write_all(errors) {
            warn!("could not write error report: {e}");
        }
    }
}
