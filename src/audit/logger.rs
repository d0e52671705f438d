use super::{CommandRecord, OperationLog};
use crate::git::parser::DecodeSkip;
use chrono::Utc;
use parking_lot::Mutex;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024; // 10MB

/// Append-only file record of every command the facade ran
pub struct AuditLogger {
    log_path: PathBuf,
    // Serializes rotate-then-append across threads sharing the logger
    write_lock: Mutex<()>,
}

impl AuditLogger {
    /// Create a new AuditLogger with the default log path
    pub fn new() -> std::io::Result<Self> {
        Self::with_path(Self::default_log_path()?)
    }

    /// Create an AuditLogger with a custom log path
    pub fn with_path<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let log_path = path.as_ref().to_path_buf();

        // Ensure directory exists
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(Self {
            log_path,
            write_lock: Mutex::new(()),
        })
    }

    /// Get the default log path: ~/.config/gitrelay/commands.log
    pub fn default_log_path() -> std::io::Result<PathBuf> {
        let home = std::env::var("HOME").map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "HOME environment variable not set",
            )
        })?;

        Ok(PathBuf::from(home)
            .join(".config")
            .join("gitrelay")
            .join("commands.log"))
    }

    /// Log a command execution
    pub fn log_command(
        &self,
        command: &str,
        repo_path: &Path,
        exit_code: Option<i32>,
    ) -> std::io::Result<()> {
        let exit = exit_code.map_or_else(|| "none".to_string(), |code| code.to_string());
        self.append(&format!(
            "[{}] [{}] [exit:{}] {}\n",
            Utc::now().to_rfc3339(),
            repo_path.display(),
            exit,
            command
        ))
    }

    /// Log a line a parser had to drop
    pub fn log_decode_skip(&self, skip: &DecodeSkip, repo_path: &Path) -> std::io::Result<()> {
        self.append(&format!(
            "[{}] [{}] [DECODE-SKIPPED] parser={} line={} text={:?} reason={:?}\n",
            Utc::now().to_rfc3339(),
            repo_path.display(),
            skip.parser,
            skip.line_number,
            skip.line,
            skip.reason
        ))
    }

    fn append(&self, entry: &str) -> std::io::Result<()> {
        let _guard = self.write_lock.lock();

        // Check and rotate log if needed
        self.rotate_if_needed()?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;

        file.write_all(entry.as_bytes())?;
        file.flush()?;

        Ok(())
    }

    /// Rotate log file if it exceeds MAX_LOG_SIZE
    fn rotate_if_needed(&self) -> std::io::Result<()> {
        if !self.log_path.exists() {
            return Ok(());
        }

        let metadata = fs::metadata(&self.log_path)?;
        if metadata.len() > MAX_LOG_SIZE {
            // Rotate: commands.log -> commands.log.1
            let backup_path = self.log_path.with_extension("log.1");
            fs::rename(&self.log_path, backup_path)?;
        }

        Ok(())
    }

    /// Get the path to the log file
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

impl OperationLog for AuditLogger {
    // A failing audit write must not fail the git operation it describes
    fn command_finished(&self, record: &CommandRecord<'_>) {
        if let Err(e) = self.log_command(&record.command_line(), record.working_dir, record.exit_code) {
            tracing::warn!(path = %self.log_path.display(), error = %e, "audit log write failed");
        }
    }

    fn line_skipped(&self, working_dir: &Path, skip: &DecodeSkip) {
        if let Err(e) = self.log_decode_skip(skip, working_dir) {
            tracing::warn!(path = %self.log_path.display(), error = %e, "audit log write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::parser::ParserKind;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_create_logger() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("nested").join("test.log");

        let logger = AuditLogger::with_path(&log_path).unwrap();
        assert_eq!(logger.log_path(), log_path);
        assert!(log_path.parent().unwrap().exists());
    }

    #[test]
    fn test_log_command() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("test.log");

        let logger = AuditLogger::with_path(&log_path).unwrap();
        let repo_path = Path::new("/test/repo");

        logger.log_command("git status", repo_path, Some(0)).unwrap();

        let content = fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("git status"));
        assert!(content.contains("/test/repo"));
        assert!(content.contains("exit:0"));
    }

    #[test]
    fn test_log_without_exit_code() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("test.log");

        let logger = AuditLogger::with_path(&log_path).unwrap();
        logger.log_command("git fetch", Path::new("/r"), None).unwrap();

        let content = fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("exit:none"));
    }

    #[test]
    fn test_multiple_log_entries() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("test.log");

        let logger = AuditLogger::with_path(&log_path).unwrap();
        let repo_path = Path::new("/test/repo");

        logger.log_command("git status", repo_path, Some(0)).unwrap();
        logger.log_command("git add .", repo_path, Some(0)).unwrap();
        logger.log_command("git commit -m test", repo_path, Some(1)).unwrap();

        let content = fs::read_to_string(&log_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].contains("exit:1"));
    }

    #[test]
    fn test_log_rotation() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("test.log");

        let logger = AuditLogger::with_path(&log_path).unwrap();
        let repo_path = Path::new("/test/repo");

        // Write a large entry to trigger rotation
        let large_command = "git ".to_string() + &"x".repeat(MAX_LOG_SIZE as usize);
        logger.log_command(&large_command, repo_path, Some(0)).unwrap();

        // Write another entry - should trigger rotation
        logger.log_command("git status", repo_path, Some(0)).unwrap();

        let backup_path = log_path.with_extension("log.1");
        assert!(backup_path.exists());

        assert!(log_path.exists());
        let metadata = fs::metadata(&log_path).unwrap();
        assert!(metadata.len() < MAX_LOG_SIZE);
    }

    #[test]
    fn test_log_decode_skip() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("test.log");

        let logger = AuditLogger::with_path(&log_path).unwrap();
        let skip = DecodeSkip {
            parser: ParserKind::Remote,
            line_number: 4,
            line: "origin".to_string(),
            reason: "expected remote name and url".to_string(),
        };

        logger.log_decode_skip(&skip, Path::new("/test/repo")).unwrap();

        let content = fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("DECODE-SKIPPED"));
        assert!(content.contains("parser=remote"));
        assert!(content.contains("line=4"));
        assert!(content.contains("\"origin\""));
    }

    #[test]
    fn test_operation_log_impl() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("test.log");
        let logger = AuditLogger::with_path(&log_path).unwrap();

        logger.command_finished(&CommandRecord {
            working_dir: Path::new("/repo"),
            args: &["branch", "-a"],
            exit_code: Some(0),
            elapsed: Duration::from_millis(1),
        });

        let content = fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("git branch -a"));
    }

    #[test]
    fn test_write_failure_does_not_panic() {
        let temp_dir = TempDir::new().unwrap();
        // A directory where the log file should be makes every append fail
        let log_path = temp_dir.path().join("commands.log");
        fs::create_dir(&log_path).unwrap();
        let logger = AuditLogger::with_path(&log_path).unwrap();

        assert!(logger.log_command("git status", Path::new("/repo"), Some(0)).is_err());
        logger.command_finished(&CommandRecord {
            working_dir: Path::new("/repo"),
            args: &["status"],
            exit_code: Some(0),
            elapsed: Duration::ZERO,
        });
        logger.line_skipped(
            Path::new("/repo"),
            &DecodeSkip {
                parser: ParserKind::Status,
                line_number: 1,
                line: "M".to_string(),
                reason: "shorter than a status line".to_string(),
            },
        );
        assert!(log_path.is_dir());
    }
}
