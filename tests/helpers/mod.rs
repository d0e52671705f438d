#![allow(dead_code)]

use gitrelay::error::{ExecutionFailure, GitError, GitResult};
use gitrelay::git::{CommandOutput, CommandRunner};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Helper to create a test git repository on branch `main`
pub fn create_test_repo() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let repo_path = temp_dir.path().to_path_buf();

    git(&repo_path, &["init", "-q"]);
    git(&repo_path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(&repo_path, &["config", "user.name", "Test User"]);
    git(&repo_path, &["config", "user.email", "test@example.com"]);
    git(&repo_path, &["config", "commit.gpgsign", "false"]);

    (temp_dir, repo_path)
}

/// Helper to create a commit
pub fn create_commit(repo_path: &Path, file: &str, content: &str, message: &str) {
    let file_path = repo_path.join(file);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(&file_path, content).expect("Failed to write file");

    git(repo_path, &["add", file]);
    git(repo_path, &["commit", "-q", "-m", message]);
}

/// Run git directly, bypassing the crate, and return stdout
pub fn git(repo_path: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Runner that answers from a table keyed by the space-joined arguments
///
/// Unknown commands succeed with empty output.
#[derive(Default)]
pub struct CannedRunner {
    responses: HashMap<String, Result<String, (i32, String)>>,
}

impl CannedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(mut self, args: &[&str], output: &str) -> Self {
        self.responses.insert(args.join(" "), Ok(output.to_string()));
        self
    }

    pub fn fail(mut self, args: &[&str], exit_code: i32, output: &str) -> Self {
        self.responses
            .insert(args.join(" "), Err((exit_code, output.to_string())));
        self
    }
}

impl CommandRunner for CannedRunner {
    fn run(&self, _working_dir: &Path, args: &[&str]) -> GitResult<CommandOutput> {
        let command = args.join(" ");
        match self.responses.get(&command) {
            Some(Ok(output)) => Ok(CommandOutput {
                output: output.clone(),
                exit_code: 0,
            }),
            Some(Err((code, output))) => Err(GitError::Execution {
                command,
                reason: ExecutionFailure::ExitCode(*code),
                output: output.clone(),
            }),
            None => Ok(CommandOutput {
                output: String::new(),
                exit_code: 0,
            }),
        }
    }
}
