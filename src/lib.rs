//! Runs the `git` command line tool on behalf of a front end and turns its
//! text output into typed records.
//!
//! [`GitService`] is the entry point: every method takes the repository's
//! working directory explicitly, so one service can drive any number of
//! repositories.

pub mod audit;
pub mod config;
pub mod error;
pub mod git;
pub mod security;

pub use audit::{AuditLogger, MemoryLog, NullLog, OperationLog, TracingLog};
pub use config::Config;
pub use error::{AppError, AppResult, ExecutionFailure, GitError, GitResult};
pub use git::{
    BranchScope, CommandOutput, CommandRunner, ConflictStrategy, DateStyle, GitExecutor,
    GitService,
};
