use gitrelay::config::ConfigError;
use gitrelay::error::{AppError, AppResult, ExecutionFailure, GitError};
use gitrelay::security::validator::ValidationError;
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

fn execution(reason: ExecutionFailure, output: &str) -> GitError {
    GitError::Execution {
        command: "status --porcelain".to_string(),
        reason,
        output: output.to_string(),
    }
}

/// Test that GitError converts to AppError::Git
#[test]
fn test_git_error_converts_to_app_error() {
    let app_err: AppError = execution(ExecutionFailure::ExitCode(1), "").into();
    assert!(matches!(app_err, AppError::Git(_)));
}

/// Test that ConfigError converts to AppError::Config
#[test]
fn test_config_error_converts_to_app_error() {
    let app_err: AppError = ConfigError::DirectoryNotFound.into();
    assert!(matches!(app_err, AppError::Config(_)));
}

/// Test that ValidationError converts to both GitError and AppError
#[test]
fn test_validation_error_conversions() {
    let git_err: GitError = ValidationError::Empty("branch name").into();
    assert!(git_err.is_validation());
    assert_eq!(git_err.exit_code(), None);
    assert_eq!(git_err.output(), None);

    let app_err: AppError = ValidationError::Empty("filename").into();
    assert!(matches!(app_err, AppError::Validation(_)));
}

/// Test that std::io::Error converts to AppError::Io
#[test]
fn test_io_error_converts_to_app_error() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
    let app_err: AppError = io_err.into();
    assert!(matches!(app_err, AppError::Io(_)));
}

/// The combined output of a failed command is kept and shown
#[test]
fn test_execution_error_carries_output() {
    let err = execution(ExecutionFailure::ExitCode(128), "fatal: not a git repository\n");

    assert_eq!(err.exit_code(), Some(128));
    assert_eq!(err.output(), Some("fatal: not a git repository\n"));

    let msg = err.to_string();
    assert!(msg.contains("git status --porcelain"));
    assert!(msg.contains("exit status 128"));
    assert!(msg.contains("fatal: not a git repository"));
}

/// Non-exit failures have no exit code
#[test]
fn test_execution_failure_kinds() {
    let timed_out = execution(ExecutionFailure::TimedOut(Duration::from_secs(5)), "partial");
    assert_eq!(timed_out.exit_code(), None);
    assert!(timed_out.to_string().contains("timed out"));

    let limited = execution(ExecutionFailure::OutputLimit(1024), "");
    assert!(limited.to_string().contains("1024 bytes"));

    let killed = execution(ExecutionFailure::Terminated, "");
    assert!(killed.to_string().contains("signal"));
}

/// Test that error source is preserved
#[test]
fn test_error_source_preserved() {
    let spawn = execution(
        ExecutionFailure::Spawn(std::io::Error::new(std::io::ErrorKind::NotFound, "no git")),
        "",
    );
    let app_err: AppError = spawn.into();
    assert!(app_err.source().is_some());

    let working_copy = GitError::WorkingCopy {
        path: PathBuf::from("/repo/a.txt"),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
    };
    assert!(working_copy.source().is_some());
    assert!(working_copy.to_string().contains("/repo/a.txt"));
}

/// Test AppError variants display correctly
#[test]
fn test_app_error_display() {
    let git = AppError::Git(execution(ExecutionFailure::ExitCode(1), "boom"));
    assert!(git.to_string().contains("Git error"));
    assert!(git.to_string().contains("boom"));

    let config = AppError::Config(ConfigError::InvalidValue("timeout".to_string()));
    assert!(config.to_string().contains("Configuration error"));

    let validation = AppError::Validation(ValidationError::UnsupportedStrategy("mine".to_string()));
    assert!(validation.to_string().contains("mine"));
}

/// Test that ? operator works with AppError
#[test]
fn test_question_mark_operator() {
    fn may_fail() -> Result<(), GitError> {
        Err(ValidationError::Empty("commit message").into())
    }

    fn outer() -> AppResult<()> {
        may_fail()?;
        Ok(())
    }

    let result = outer();
    assert!(matches!(result.unwrap_err(), AppError::Git(GitError::Validation(_))));
}

/// Test nested error conversion (ConfigError -> AppError)
#[test]
fn test_nested_config_error_conversion() {
    fn inner() -> Result<(), ConfigError> {
        Err(ConfigError::InvalidValue("test".to_string()))
    }

    fn outer() -> AppResult<()> {
        inner()?;
        Ok(())
    }

    assert!(matches!(outer().unwrap_err(), AppError::Config(_)));
}

/// Serialization failures surface as GitError::Serialize
#[test]
fn test_serde_error_converts() {
    let serde_err = serde_json::from_str::<u32>("not json").unwrap_err();
    let err: GitError = serde_err.into();
    assert!(matches!(err, GitError::Serialize(_)));
}
