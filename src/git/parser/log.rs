use super::{DecodeSkip, ParserKind, Parsed, records};
use crate::git::format::{FIELD_SEPARATOR, LOG_FIELDS};
use serde::{Deserialize, Serialize};

/// Parse `git log` output produced with [`LOG_FORMAT`](crate::git::format::LOG_FORMAT)
///
/// Lines without exactly five fields, or without a hash, are skipped.
pub fn parse_log(output: &str) -> Parsed<CommitRecord> {
    let mut parsed = Parsed::new();

    for (index, line) in records(output) {
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        if fields.len() != LOG_FIELDS {
            parsed.skipped.push(DecodeSkip::new(
                ParserKind::Log,
                index,
                line,
                format!("expected {LOG_FIELDS} fields, found {}", fields.len()),
            ));
            continue;
        }

        let hash = fields[0].trim();
        if hash.is_empty() {
            parsed
                .skipped
                .push(DecodeSkip::new(ParserKind::Log, index, line, "missing commit hash"));
            continue;
        }

        parsed.records.push(CommitRecord {
            hash: hash.to_string(),
            refs: parse_refs(fields[1]),
            message: fields[2].to_string(),
            author: fields[3].to_string(),
            date: fields[4].to_string(),
        });
    }

    parsed
}

/// Decode a decoration list, with or without the `%d` parentheses
fn parse_refs(refs: &str) -> Vec<String> {
    refs.split(',')
        .map(|r| r.trim().trim_matches(|c| c == '(' || c == ')').trim())
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}

/// Represents a commit from git log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRecord {
    pub hash: String,
    pub message: String,
    pub author: String,
    pub date: String,
    pub refs: Vec<String>,
}
