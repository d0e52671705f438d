use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::config::settings::ConfigError;
use crate::security::validator::ValidationError;

/// Errors that can occur during git operations
#[derive(Debug, Error)]
pub enum GitError {
    #[error("Invalid argument: {0}")]
    Validation(#[from] ValidationError),

    /// The external process did not succeed. `output` is everything it wrote.
    #[error("Command 'git {command}' failed: {reason}: {}", .output.trim())]
    Execution {
        command: String,
        reason: ExecutionFailure,
        output: String,
    },

    #[error("Failed to read working copy file {}: {source}", .path.display())]
    WorkingCopy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Why an invocation of the external tool failed
#[derive(Debug, Error)]
pub enum ExecutionFailure {
    #[error("could not start process: {0}")]
    Spawn(#[source] io::Error),

    #[error("exit status {0}")]
    ExitCode(i32),

    #[error("terminated by signal")]
    Terminated,

    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    #[error("output exceeded {0} bytes")]
    OutputLimit(usize),

    #[error("I/O error while waiting for process: {0}")]
    Io(#[source] io::Error),
}

impl GitError {
    /// Captured combined output of a failed invocation
    pub fn output(&self) -> Option<&str> {
        match self {
            GitError::Execution { output, .. } => Some(output),
            _ => None,
        }
    }

    /// Exit code of a failed invocation, when the process exited normally
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            GitError::Execution {
                reason: ExecutionFailure::ExitCode(code),
                ..
            } => Some(*code),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, GitError::Validation(_))
    }
}

/// Top-level application error that wraps all module-specific errors
///
/// Hosts (GUI shell, HTTP facade) can funnel every failure into this one type
/// while keeping the specific error underneath.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for git operations
pub type GitResult<T> = std::result::Result<T, GitError>;

/// Result type for application-level operations
pub type AppResult<T> = std::result::Result<T, AppError>;
