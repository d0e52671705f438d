use crate::audit::{AuditLogger, CommandRecord, NullLog, OperationLog, TracingLog};
use crate::config::Config;
use crate::error::{AppResult, GitError, GitResult};
use crate::git::executor::{CommandRunner, GitExecutor};
use crate::git::format::{self, DateStyle};
use crate::git::locks::DirectoryLocks;
use crate::git::parser::{
    self, BlameLine, BranchEntry, CommitRecord, FileStatusEntry, Parsed, RemoteEntry, StashEntry,
};
use crate::security::validator::{self, ValidationError};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

const DEFAULT_LOG_LIMIT: usize = 50;
const DEFAULT_GRAPH_LIMIT: usize = 100;

/// Which refs a branch listing covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BranchScope {
    #[default]
    All,
    Local,
    Remote,
}

/// Which side wins when resolving a conflicted file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictStrategy {
    Ours,
    Theirs,
}

impl FromStr for ConflictStrategy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ours" => Ok(ConflictStrategy::Ours),
            "theirs" => Ok(ConflictStrategy::Theirs),
            other => Err(ValidationError::UnsupportedStrategy(other.to_string())),
        }
    }
}

impl ConflictStrategy {
    fn checkout_flag(self) -> &'static str {
        match self {
            ConflictStrategy::Ours => "--ours",
            ConflictStrategy::Theirs => "--theirs",
        }
    }
}

/// One method per git capability, each against an explicit working directory
///
/// Holds no per-repository state apart from the write locks, so one instance
/// can serve every repository a front end has open.
pub struct GitService {
    runner: Box<dyn CommandRunner>,
    log: Arc<dyn OperationLog>,
    locks: DirectoryLocks,
    default_log_limit: usize,
    graph_history_limit: usize,
}

impl GitService {
    pub fn new<R: CommandRunner + 'static>(runner: R) -> Self {
        Self {
            runner: Box::new(runner),
            log: Arc::new(NullLog),
            locks: DirectoryLocks::new(),
            default_log_limit: DEFAULT_LOG_LIMIT,
            graph_history_limit: DEFAULT_GRAPH_LIMIT,
        }
    }

    /// Real `git`, limits and log sink taken from the configuration
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let log: Arc<dyn OperationLog> = if config.audit.enabled {
            let logger = match &config.audit.path {
                Some(path) => AuditLogger::with_path(path)?,
                None => AuditLogger::new()?,
            };
            Arc::new(logger)
        } else {
            Arc::new(TracingLog)
        };

        Ok(Self::new(GitExecutor::from_config(&config.git))
            .with_log(log)
            .with_limits(config.git.default_log_limit, config.git.graph_history_limit))
    }

    pub fn with_log(mut self, log: Arc<dyn OperationLog>) -> Self {
        self.log = log;
        self
    }

    /// Counts used when a caller passes a limit of 0
    pub fn with_limits(mut self, default_log_limit: usize, graph_history_limit: usize) -> Self {
        self.default_log_limit = default_log_limit.max(1);
        self.graph_history_limit = graph_history_limit.max(1);
        self
    }

    // Repository setup

    pub fn init(&self, dir: &Path) -> GitResult<String> {
        self.run_write(dir, &["init"])
    }

    /// Clone into `target`, which must already exist and be empty
    pub fn clone(&self, url: &str, target: &Path) -> GitResult<String> {
        let url = validator::require_ref("repository url", url)?;
        self.run_write(target, &["clone", "--", url, "."])
    }

    // Working tree and index

    /// Human-readable status, passed through unchanged
    pub fn status(&self, dir: &Path) -> GitResult<String> {
        self.run(dir, &["status"])
    }

    pub fn file_statuses(&self, dir: &Path) -> GitResult<Vec<FileStatusEntry>> {
        let output = self.run(dir, &["status", "--porcelain"])?;
        Ok(self.decode(dir, parser::parse_status(&output)))
    }

    pub fn staged_files(&self, dir: &Path) -> GitResult<Vec<FileStatusEntry>> {
        let mut entries = self.file_statuses(dir)?;
        entries.retain(|entry| entry.staged);
        Ok(entries)
    }

    pub fn diff(&self, dir: &Path, filename: &str, staged: bool) -> GitResult<String> {
        let filename = validator::require_value("filename", filename)?;
        if staged {
            self.run(dir, &["diff", "--staged", "--", filename])
        } else {
            self.run(dir, &["diff", "--", filename])
        }
    }

    /// Stage a pathspec; blank means everything under `dir`
    pub fn add(&self, dir: &Path, files: &str) -> GitResult<String> {
        let files = if files.trim().is_empty() { "." } else { files };
        self.run_write(dir, &["add", "--", files])
    }

    pub fn stage_file(&self, dir: &Path, filename: &str) -> GitResult<String> {
        let filename = validator::require_value("filename", filename)?;
        self.run_write(dir, &["add", "--", filename])
    }

    pub fn stage_all(&self, dir: &Path) -> GitResult<String> {
        self.run_write(dir, &["add", "."])
    }

    pub fn unstage_file(&self, dir: &Path, filename: &str) -> GitResult<String> {
        let filename = validator::require_value("filename", filename)?;
        self.run_write(dir, &["reset", "HEAD", "--", filename])
    }

    /// Discard worktree changes to one file
    pub fn reset_file(&self, dir: &Path, filename: &str) -> GitResult<String> {
        let filename = validator::require_value("filename", filename)?;
        self.run_write(dir, &["checkout", "--", filename])
    }

    // Commits and history

    pub fn commit(&self, dir: &Path, message: &str) -> GitResult<String> {
        let message = validator::require_value("commit message", message)?;
        self.run_write(dir, &["commit", "-m", message])
    }

    /// Amend the last commit, keeping its message when `message` is absent or blank
    pub fn amend_commit(&self, dir: &Path, message: Option<&str>) -> GitResult<String> {
        match message.filter(|m| !m.trim().is_empty()) {
            Some(message) => self.run_write(dir, &["commit", "--amend", "-m", message]),
            None => self.run_write(dir, &["commit", "--amend", "--no-edit"]),
        }
    }

    /// Commits reachable from any ref, newest first. A limit of 0 uses the default.
    pub fn log(&self, dir: &Path, limit: usize, date_style: DateStyle) -> GitResult<Vec<CommitRecord>> {
        let limit = self.limit_or(limit, self.default_log_limit).to_string();
        let output = self.run(
            dir,
            &["log", "--all", format::LOG_FORMAT, date_style.as_git_arg(), "-n", &limit],
        )?;
        Ok(self.decode(dir, parser::parse_log(&output)))
    }

    /// Commits reachable from one branch
    pub fn branch_log(
        &self,
        dir: &Path,
        branch: &str,
        limit: usize,
        date_style: DateStyle,
    ) -> GitResult<Vec<CommitRecord>> {
        let branch = validator::require_ref("branch name", branch)?;
        let limit = self.limit_or(limit, self.default_log_limit).to_string();
        let output = self.run(
            dir,
            &["log", branch, format::LOG_FORMAT, date_style.as_git_arg(), "-n", &limit, "--"],
        )?;
        Ok(self.decode(dir, parser::parse_log(&output)))
    }

    /// ASCII commit graph across all refs, passed through unchanged
    pub fn graph_history(&self, dir: &Path, limit: usize) -> GitResult<String> {
        let limit = self.limit_or(limit, self.graph_history_limit).to_string();
        self.run(
            dir,
            &["log", "--all", "--graph", format::GRAPH_FORMAT, "--date=short", "-n", &limit],
        )
    }

    pub fn blame(&self, dir: &Path, filename: &str, date_style: DateStyle) -> GitResult<Vec<BlameLine>> {
        let filename = validator::require_value("filename", filename)?;
        let output = self.run(dir, &["blame", "-w", "-M", format::BLAME_PORCELAIN, "--", filename])?;
        let metadata = self.decode(dir, parser::parse_blame_porcelain(&output, date_style));

        let path = dir.join(filename);
        let bytes = fs::read(&path).map_err(|source| GitError::WorkingCopy { path, source })?;
        Ok(parser::attach_content(metadata, &String::from_utf8_lossy(&bytes)))
    }

    // Branches

    pub fn branches(&self, dir: &Path, scope: BranchScope) -> GitResult<Vec<BranchEntry>> {
        let args: &[&str] = match scope {
            BranchScope::All => &["branch", "--no-color", "--no-column", "-a"],
            BranchScope::Local => &["branch", "--no-color", "--no-column"],
            BranchScope::Remote => &["branch", "--no-color", "--no-column", "-r"],
        };
        let output = self.run(dir, args)?;
        let mut branches = self.decode(dir, parser::parse_branches(&output));

        // `-r` lists remote refs without the `remotes/` prefix that marks them
        if scope == BranchScope::Remote {
            for branch in &mut branches {
                branch.is_remote = true;
                branch.is_current = false;
            }
        }
        Ok(branches)
    }

    /// `None` when HEAD is detached
    pub fn current_branch(&self, dir: &Path) -> GitResult<Option<String>> {
        match self.run(dir, &["symbolic-ref", "--short", "-q", "HEAD"]) {
            Ok(output) => {
                let name = output.trim();
                Ok((!name.is_empty()).then(|| name.to_string()))
            }
            Err(e) if e.exit_code() == Some(1) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn checkout(&self, dir: &Path, branch: &str) -> GitResult<String> {
        let branch = validator::require_ref("branch name", branch)?;
        self.run_write(dir, &["checkout", branch])
    }

    pub fn create_branch(&self, dir: &Path, branch: &str) -> GitResult<String> {
        let branch = validator::require_ref("branch name", branch)?;
        self.run_write(dir, &["checkout", "-b", branch])
    }

    pub fn merge(&self, dir: &Path, branch: &str) -> GitResult<String> {
        let branch = validator::require_ref("branch name", branch)?;
        self.run_write(dir, &["merge", branch])
    }

    pub fn rebase(&self, dir: &Path, branch: &str) -> GitResult<String> {
        let branch = validator::require_ref("branch name", branch)?;
        self.run_write(dir, &["rebase", branch])
    }

    /// Paths with unresolved merge conflicts
    pub fn merge_conflicts(&self, dir: &Path) -> GitResult<Vec<String>> {
        let output = self.run(dir, &["diff", "--name-only", "--diff-filter=U"])?;
        Ok(parser::parse_path_list(&output))
    }

    /// Take one side of a conflicted file and mark it resolved
    pub fn resolve_conflict(
        &self,
        dir: &Path,
        filename: &str,
        strategy: ConflictStrategy,
    ) -> GitResult<String> {
        let filename = validator::require_value("filename", filename)?;
        validator::require_working_dir(dir)?;

        let _guard = self.locks.lock(dir);
        let output = self.run(dir, &["checkout", strategy.checkout_flag(), "--", filename])?;
        self.run(dir, &["add", "--", filename])?;
        Ok(output)
    }

    // Remotes

    pub fn remotes(&self, dir: &Path) -> GitResult<Vec<RemoteEntry>> {
        let output = self.run(dir, &["remote", "-v"])?;
        Ok(self.decode(dir, parser::parse_remotes(&output)))
    }

    pub fn fetch(&self, dir: &Path) -> GitResult<String> {
        self.run_write(dir, &["fetch"])
    }

    /// Pull from `origin`; without a branch git's configured upstream is used
    pub fn pull(&self, dir: &Path, branch: Option<&str>) -> GitResult<String> {
        match validator::optional_ref("branch name", branch)? {
            Some(branch) => self.run_write(dir, &["pull", "origin", branch]),
            None => self.run_write(dir, &["pull"]),
        }
    }

    /// Push to `origin`; without a branch the current HEAD is pushed
    pub fn push(&self, dir: &Path, branch: Option<&str>, force: bool) -> GitResult<String> {
        let branch = validator::optional_ref("branch name", branch)?.unwrap_or("HEAD");
        if force {
            self.run_write(dir, &["push", "--force", "origin", branch])
        } else {
            self.run_write(dir, &["push", "origin", branch])
        }
    }

    // Stashes

    /// Stash listing, newest first, with dates from the stash reflog when it can be read
    pub fn stashes(&self, dir: &Path) -> GitResult<Vec<StashEntry>> {
        let output = self.run(dir, &["stash", "list"])?;
        let mut stashes = self.decode(dir, parser::parse_stashes(&output));
        if stashes.is_empty() {
            return Ok(stashes);
        }

        // Dates are extra; a failure here leaves them absent rather than failing the listing
        if let Ok(output) = self.run(dir, &["log", "-g", format::STASH_DATE_FORMAT, "refs/stash", "--"]) {
            let (mut dates, skipped) = parser::parse_stash_dates(&output);
            for skip in &skipped {
                self.log.line_skipped(dir, skip);
            }
            for stash in &mut stashes {
                stash.date = dates.remove(&stash.id);
            }
        }
        Ok(stashes)
    }

    pub fn stash_save(&self, dir: &Path, message: Option<&str>) -> GitResult<String> {
        match message.filter(|m| !m.trim().is_empty()) {
            Some(message) => self.run_write(dir, &["stash", "push", "-m", message]),
            None => self.run_write(dir, &["stash", "push"]),
        }
    }

    /// Apply a stash, the newest when `stash_id` is absent
    pub fn stash_apply(&self, dir: &Path, stash_id: Option<&str>) -> GitResult<String> {
        match validator::optional_ref("stash id", stash_id)? {
            Some(id) => self.run_write(dir, &["stash", "apply", id]),
            None => self.run_write(dir, &["stash", "apply"]),
        }
    }

    /// Apply and drop a stash, the newest when `stash_id` is absent
    pub fn stash_pop(&self, dir: &Path, stash_id: Option<&str>) -> GitResult<String> {
        match validator::optional_ref("stash id", stash_id)? {
            Some(id) => self.run_write(dir, &["stash", "pop", id]),
            None => self.run_write(dir, &["stash", "pop"]),
        }
    }

    pub fn stash_drop(&self, dir: &Path, stash_id: &str) -> GitResult<String> {
        let stash_id = validator::require_ref("stash id", stash_id)?;
        self.run_write(dir, &["stash", "drop", stash_id])
    }

    // Plumbing

    fn run(&self, dir: &Path, args: &[&str]) -> GitResult<String> {
        validator::require_working_dir(dir)?;

        let started = Instant::now();
        let result = self.runner.run(dir, args);
        let exit_code = match &result {
            Ok(output) => Some(output.exit_code),
            Err(e) => e.exit_code(),
        };

        if !matches!(result, Err(GitError::Validation(_))) {
            self.log.command_finished(&CommandRecord {
                working_dir: dir,
                args,
                exit_code,
                elapsed: started.elapsed(),
            });
        }

        result.map(|output| output.output)
    }

    /// Same as [`GitService::run`], serialized per working directory
    fn run_write(&self, dir: &Path, args: &[&str]) -> GitResult<String> {
        validator::require_working_dir(dir)?;
        let _guard = self.locks.lock(dir);
        self.run(dir, args)
    }

    fn decode<T>(&self, dir: &Path, parsed: Parsed<T>) -> Vec<T> {
        for skip in &parsed.skipped {
            self.log.line_skipped(dir, skip);
        }
        parsed.records
    }

    fn limit_or(&self, limit: usize, default: usize) -> usize {
        if limit == 0 { default } else { limit }
    }
}

impl Default for GitService {
    fn default() -> Self {
        Self::new(GitExecutor::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_strategy_from_str() {
        assert_eq!("ours".parse::<ConflictStrategy>(), Ok(ConflictStrategy::Ours));
        assert_eq!(" theirs ".parse::<ConflictStrategy>(), Ok(ConflictStrategy::Theirs));
        assert_eq!(
            "mine".parse::<ConflictStrategy>(),
            Err(ValidationError::UnsupportedStrategy("mine".to_string()))
        );
    }

    #[test]
    fn test_service_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GitService>();
    }

    #[test]
    fn test_limit_or() {
        let service = GitService::default().with_limits(20, 0);
        assert_eq!(service.limit_or(0, service.default_log_limit), 20);
        assert_eq!(service.limit_or(7, service.default_log_limit), 7);
        assert_eq!(service.graph_history_limit, 1);
    }

    #[test]
    fn test_empty_dir_is_validation_error() {
        let service = GitService::default();
        let err = service.remotes(Path::new("")).unwrap_err();
        assert!(err.is_validation());
    }
}
