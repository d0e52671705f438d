use super::{DecodeSkip, ParserKind, Parsed, records};
use crate::git::format::{FIELD_SEPARATOR, ON_PREFIX, WIP_PREFIX};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parse `git stash list` output
///
/// Format: stash@{0}: WIP on main: 1a2b3c4 fix bug
///         stash@{1}: On main: named stash
///         stash@{2}: quick save
///
/// Never drops a line: anything unexpected degrades to a message-only entry.
pub fn parse_stashes(output: &str) -> Parsed<StashEntry> {
    let mut parsed = Parsed::new();
    let mut position = 0usize;

    for (_, line) in records(output) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (index, rest) = match line.split_once(':') {
            Some((head, rest)) => (stash_index(head).unwrap_or(position), rest.trim()),
            None => (position, line),
        };
        let (source_branch, message) = split_subject(rest);

        parsed.records.push(StashEntry {
            id: format!("stash@{{{index}}}"),
            message: message.to_string(),
            source_branch: source_branch.to_string(),
            date: None,
        });
        position += 1;
    }

    parsed
}

/// `N` from a `stash@{N}` token
fn stash_index(head: &str) -> Option<usize> {
    head.trim()
        .strip_prefix("stash@{")?
        .strip_suffix('}')?
        .parse()
        .ok()
}

/// Returns `(branch, message)`
fn split_subject(subject: &str) -> (&str, &str) {
    if let Some(after) = subject.strip_prefix(WIP_PREFIX) {
        return match after.split_once(':') {
            Some((branch, message)) => (branch.trim(), message.trim()),
            None => (after.trim(), ""),
        };
    }

    if let Some(after) = subject.strip_prefix(ON_PREFIX) {
        if let Some((branch, message)) = after.split_once(':') {
            return (branch.trim(), message.trim());
        }
    }

    ("", subject)
}

/// Parse `git log -g --format=%gd%x1f%ci refs/stash` into id -> date
pub fn parse_stash_dates(output: &str) -> (HashMap<String, String>, Vec<DecodeSkip>) {
    let mut dates = HashMap::new();
    let mut skipped = Vec::new();

    for (index, line) in records(output) {
        if line.trim().is_empty() {
            continue;
        }

        match line.split_once(FIELD_SEPARATOR) {
            Some((id, date)) if !id.trim().is_empty() => {
                dates.insert(id.trim().to_string(), date.trim().to_string());
            }
            _ => skipped.push(DecodeSkip::new(
                ParserKind::Stash,
                index,
                line,
                "expected stash id and date",
            )),
        }
    }

    (dates, skipped)
}

/// Represents a stash entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StashEntry {
    pub id: String,
    pub message: String,
    pub source_branch: String,
    /// Filled from the stash reflog when available; git's listing has no date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}
