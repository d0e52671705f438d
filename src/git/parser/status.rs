use super::{DecodeSkip, ParserKind, Parsed, records};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Parse `git status --porcelain` output
///
/// Byte 0 of each line is the index state, byte 1 the worktree state. A file
/// whose two states differ yields a staged and an unstaged entry.
pub fn parse_status(output: &str) -> Parsed<FileStatusEntry> {
    let mut parsed = Parsed::new();

    for (index, line) in records(output) {
        if line.trim().is_empty() {
            continue;
        }

        if line.trim().len() < 3 || !line.is_char_boundary(2) {
            parsed
                .skipped
                .push(DecodeSkip::new(ParserKind::Status, index, line, "shorter than a status line"));
            continue;
        }

        let codes = line.as_bytes();
        let (x, y) = (codes[0] as char, codes[1] as char);
        // "XY PATH": one space separates the codes from the path
        let rest = &line[2..];
        let filename = rest.strip_prefix(' ').unwrap_or(rest);

        if x == '?' && y == '?' {
            parsed.records.push(FileStatusEntry {
                filename: filename.to_string(),
                status_code: FileStatusCode::Untracked,
                staged: false,
            });
            continue;
        }

        let staged = match index_code(x) {
            Ok(code) => code,
            Err(c) => {
                parsed.skipped.push(unknown_code(index, line, c));
                continue;
            }
        };
        let unstaged = match index_code(y) {
            Ok(code) => code,
            Err(c) => {
                parsed.skipped.push(unknown_code(index, line, c));
                continue;
            }
        };

        if let Some(code) = staged {
            parsed.records.push(FileStatusEntry {
                filename: filename.to_string(),
                status_code: code,
                staged: true,
            });
        }
        if let Some(code) = unstaged {
            if staged != Some(code) {
                parsed.records.push(FileStatusEntry {
                    filename: filename.to_string(),
                    status_code: code,
                    staged: false,
                });
            }
        }
    }

    parsed
}

/// `Ok(None)` for the "no change on this side" markers
fn index_code(c: char) -> Result<Option<FileStatusCode>, char> {
    match c {
        ' ' | '?' => Ok(None),
        other => FileStatusCode::from_char(other).map(Some).ok_or(other),
    }
}

fn unknown_code(index: usize, line: &str, code: char) -> DecodeSkip {
    DecodeSkip::new(
        ParserKind::Status,
        index,
        line,
        format!("unknown status code '{code}'"),
    )
}

/// Represents a file status entry from git status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatusEntry {
    pub filename: String,
    pub status_code: FileStatusCode,
    pub staged: bool,
}

/// One side of a porcelain status code, serialized as git's own letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileStatusCode {
    Modified,
    Added,
    Deleted,
    Renamed,
    Copied,
    TypeChanged,
    Untracked,
    Unmerged,
}

impl FileStatusCode {
    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
            'M' => FileStatusCode::Modified,
            'A' => FileStatusCode::Added,
            'D' => FileStatusCode::Deleted,
            'R' => FileStatusCode::Renamed,
            'C' => FileStatusCode::Copied,
            'T' => FileStatusCode::TypeChanged,
            '?' => FileStatusCode::Untracked,
            'U' => FileStatusCode::Unmerged,
            _ => return None,
        })
    }

    pub fn as_char(self) -> char {
        match self {
            FileStatusCode::Modified => 'M',
            FileStatusCode::Added => 'A',
            FileStatusCode::Deleted => 'D',
            FileStatusCode::Renamed => 'R',
            FileStatusCode::Copied => 'C',
            FileStatusCode::TypeChanged => 'T',
            FileStatusCode::Untracked => '?',
            FileStatusCode::Unmerged => 'U',
        }
    }
}

impl fmt::Display for FileStatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl Serialize for FileStatusCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.as_char())
    }
}

impl<'de> Deserialize<'de> for FileStatusCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let c = char::deserialize(deserializer)?;
        FileStatusCode::from_char(c)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown status code '{c}'")))
    }
}
