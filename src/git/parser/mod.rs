//! Stateless decoders for git's text output.
//!
//! Every parser is line-tolerant: a line that does not fit its shape is
//! dropped and reported as a [`DecodeSkip`], and the rest of the listing is
//! still returned.

mod blame;
mod branch;
mod log;
mod remote;
mod stash;
mod status;

pub use blame::{BlameLine, BlameMetadata, attach_content, parse_blame, parse_blame_porcelain};
pub use branch::{BranchEntry, parse_branches};
pub use log::{CommitRecord, parse_log};
pub use remote::{RemoteEntry, parse_remotes};
pub use stash::{StashEntry, parse_stash_dates, parse_stashes};
pub use status::{FileStatusCode, FileStatusEntry, parse_status};

use serde::Serialize;
use std::fmt;

/// Which decoder dropped a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserKind {
    Status,
    Log,
    Branch,
    Stash,
    Blame,
    Remote,
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParserKind::Status => "status",
            ParserKind::Log => "log",
            ParserKind::Branch => "branch",
            ParserKind::Stash => "stash",
            ParserKind::Blame => "blame",
            ParserKind::Remote => "remote",
        };
        f.write_str(name)
    }
}

/// A line that did not match its expected shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeSkip {
    pub parser: ParserKind,
    /// 1-based position of the line in the raw output
    pub line_number: usize,
    pub line: String,
    pub reason: String,
}

impl DecodeSkip {
    pub(crate) fn new(parser: ParserKind, index: usize, line: &str, reason: impl Into<String>) -> Self {
        Self {
            parser,
            line_number: index + 1,
            line: line.to_string(),
            reason: reason.into(),
        }
    }
}

/// Records decoded from one output, plus whatever had to be dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed<T> {
    pub records: Vec<T>,
    pub skipped: Vec<DecodeSkip>,
}

impl<T> Parsed<T> {
    pub(crate) fn new() -> Self {
        Self {
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn into_records(self) -> Vec<T> {
        self.records
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Split raw output into records, dropping the `\r` of CRLF endings
pub(crate) fn records(output: &str) -> impl Iterator<Item = (usize, &str)> {
    output
        .split(crate::git::format::RECORD_SEPARATOR)
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .enumerate()
}

/// One path per line, e.g. `git diff --name-only`
pub fn parse_path_list(output: &str) -> Vec<String> {
    records(output)
        .map(|(_, line)| line.trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
