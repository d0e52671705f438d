use super::{Parsed, records};
use crate::git::format::{ALIAS_ARROW, CURRENT_MARKER, REMOTES_PREFIX, WORKTREE_MARKER};
use serde::{Deserialize, Serialize};

/// Parse `git branch` / `git branch -a` output
///
/// Format:  * main
///            feature-x
///            remotes/origin/HEAD -> origin/main
///            remotes/origin/dev
pub fn parse_branches(output: &str) -> Parsed<BranchEntry> {
    let mut parsed = Parsed::new();

    for (_, line) in records(output) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let is_current = line.starts_with(CURRENT_MARKER);
        let line = line
            .strip_prefix(CURRENT_MARKER)
            .or_else(|| line.strip_prefix(WORKTREE_MARKER))
            .unwrap_or(line)
            .trim();

        let is_remote = line.contains(REMOTES_PREFIX);
        let mut name = line.strip_prefix(REMOTES_PREFIX).unwrap_or(line);

        // Symbolic refs list their target; keep the alias only
        if let Some((alias, _target)) = name.split_once(ALIAS_ARROW) {
            name = alias.trim_end();
        }

        if name.is_empty() {
            continue;
        }

        parsed.records.push(BranchEntry {
            name: name.to_string(),
            is_current: is_current && !is_remote,
            is_remote,
        });
    }

    parsed
}

/// Represents a branch from git branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchEntry {
    pub name: String,
    pub is_current: bool,
    pub is_remote: bool,
}
