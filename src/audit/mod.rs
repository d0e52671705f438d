//! Where the facade reports what it ran and what it could not decode.
//!
//! The log is handed to [`GitService`](crate::git::GitService) explicitly;
//! nothing in the executor or the parsers writes to process-global state.

pub mod logger;
pub mod trace_log;

pub use logger::AuditLogger;
pub use trace_log::TracingLog;

use crate::git::parser::DecodeSkip;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One finished invocation of the external tool
#[derive(Debug, Clone, Copy)]
pub struct CommandRecord<'a> {
    pub working_dir: &'a Path,
    pub args: &'a [&'a str],
    /// `None` when the process never exited normally (spawn failure, timeout, signal)
    pub exit_code: Option<i32>,
    pub elapsed: Duration,
}

impl CommandRecord<'_> {
    pub fn command_line(&self) -> String {
        format!("git {}", self.args.join(" "))
    }
}

/// Sink for facade events
pub trait OperationLog: Send + Sync {
    fn command_finished(&self, record: &CommandRecord<'_>);

    fn line_skipped(&self, working_dir: &Path, skip: &DecodeSkip);
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLog;

impl OperationLog for NullLog {
    fn command_finished(&self, _record: &CommandRecord<'_>) {}

    fn line_skipped(&self, _working_dir: &Path, _skip: &DecodeSkip) {}
}

/// Owned copy of an event, as kept by [`MemoryLog`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    Command {
        working_dir: PathBuf,
        args: Vec<String>,
        exit_code: Option<i32>,
    },
    Skipped {
        working_dir: PathBuf,
        skip: DecodeSkip,
    },
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct MemoryLog {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().clone()
    }

    pub fn skips(&self) -> Vec<DecodeSkip> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                LogEvent::Skipped { skip, .. } => Some(skip.clone()),
                LogEvent::Command { .. } => None,
            })
            .collect()
    }

    /// Argument lists of every command, in order
    pub fn commands(&self) -> Vec<Vec<String>> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                LogEvent::Command { args, .. } => Some(args.clone()),
                LogEvent::Skipped { .. } => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl OperationLog for MemoryLog {
    fn command_finished(&self, record: &CommandRecord<'_>) {
        self.events.lock().push(LogEvent::Command {
            working_dir: record.working_dir.to_path_buf(),
            args: record.args.iter().map(|a| a.to_string()).collect(),
            exit_code: record.exit_code,
        });
    }

    fn line_skipped(&self, working_dir: &Path, skip: &DecodeSkip) {
        self.events.lock().push(LogEvent::Skipped {
            working_dir: working_dir.to_path_buf(),
            skip: skip.clone(),
        });
    }
}
