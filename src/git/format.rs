//! Every delimiter and machine-format string git is asked to emit.
//!
//! Parsers and the facade both read from here, so switching git to a
//! different output shape only touches this file.

use serde::{Deserialize, Serialize};

/// Separates fields inside one record. Chosen because commit messages,
/// author names and dates can all contain `|`.
pub const FIELD_SEPARATOR: char = '\x1f';

/// Separates records
pub const RECORD_SEPARATOR: char = '\n';

/// `hash, refs, message, author, date`, one commit per line
pub const LOG_FORMAT: &str = "--pretty=format:%H%x1f%D%x1f%s%x1f%an%x1f%ad";

/// Number of fields [`LOG_FORMAT`] produces
pub const LOG_FIELDS: usize = 5;

/// One readable line per commit beside the `--graph` drawing
pub const GRAPH_FORMAT: &str = "--pretty=format:%h %ad %an: %s%d";

/// `stash id, committer date` for the stash reflog
pub const STASH_DATE_FORMAT: &str = "--format=%gd%x1f%ci";

/// `hash, author, date, summary`, the positional blame metadata shape
pub const BLAME_FIELDS: usize = 4;

/// Blame output with a full header block per line, including its final line number
pub const BLAME_PORCELAIN: &str = "--line-porcelain";

// Markers git prints in stash subjects and branch listings
pub const WIP_PREFIX: &str = "WIP on ";
pub const ON_PREFIX: &str = "On ";
pub const REMOTES_PREFIX: &str = "remotes/";
pub const CURRENT_MARKER: &str = "* ";
pub const WORKTREE_MARKER: &str = "+ ";
pub const ALIAS_ARROW: &str = " -> ";

/// How dates are rendered in commit and blame records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateStyle {
    /// `2024-03-01`
    #[default]
    Short,
    /// `2024-03-01T12:34:56+01:00`
    Iso,
}

impl DateStyle {
    /// The `--date=` argument for `git log`
    pub fn as_git_arg(self) -> &'static str {
        match self {
            DateStyle::Short => "--date=short",
            DateStyle::Iso => "--date=iso-strict",
        }
    }

    /// The chrono pattern giving the same rendering as [`DateStyle::as_git_arg`]
    pub fn chrono_pattern(self) -> &'static str {
        match self {
            DateStyle::Short => "%Y-%m-%d",
            DateStyle::Iso => "%Y-%m-%dT%H:%M:%S%:z",
        }
    }
}

/// Join values into one record line the way git does for the formats above
pub fn join_fields<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            line.push(FIELD_SEPARATOR);
        }
        line.push_str(field.as_ref());
    }
    line
}
