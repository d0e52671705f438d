use super::{DecodeSkip, ParserKind, Parsed, records};
use crate::git::format::{BLAME_FIELDS, DateStyle, FIELD_SEPARATOR};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Attribution for one line, before its working-copy text is attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlameMetadata {
    pub line_number: usize,
    pub commit_hash: String,
    pub author: String,
    pub date: String,
    pub commit_summary: String,
}

/// Represents one attributed line of a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlameLine {
    pub line_number: usize,
    pub commit_hash: String,
    pub author: String,
    pub date: String,
    pub commit_summary: String,
    pub content: String,
}

/// Correlate positional metadata (`hash\x1fauthor\x1fdate\x1fsummary`) with file content
///
/// Only valid when the metadata has exactly one line per source line: line
/// `i` of the metadata describes line `i` of the file. Malformed metadata
/// lines are skipped but still occupy their position, so later lines stay
/// aligned. Content past the end of the file is empty.
pub fn parse_blame(metadata: &str, content: &str) -> Parsed<BlameLine> {
    let mut parsed = Parsed::new();
    let mut lines: Vec<(usize, &str)> = records(metadata).collect();
    while lines.last().is_some_and(|(_, line)| line.is_empty()) {
        lines.pop();
    }

    let mut positional = Vec::with_capacity(lines.len());
    for (index, line) in lines {
        let fields: Vec<&str> = line.splitn(BLAME_FIELDS, FIELD_SEPARATOR).collect();
        let hash = fields.first().map(|h| h.trim()).unwrap_or_default();
        if fields.len() != BLAME_FIELDS || hash.is_empty() {
            parsed.skipped.push(DecodeSkip::new(
                ParserKind::Blame,
                index,
                line,
                format!("expected {BLAME_FIELDS} fields"),
            ));
            continue;
        }

        positional.push(BlameMetadata {
            line_number: index + 1,
            commit_hash: hash.to_string(),
            author: fields[1].trim().to_string(),
            date: fields[2].trim().to_string(),
            commit_summary: fields[3].trim().to_string(),
        });
    }

    parsed.records = attach_content(positional, content);
    parsed
}

/// Decode `git blame --line-porcelain`
///
/// Each source line gets a header `<hash> <orig-line> <final-line> [<count>]`,
/// `key value` lines, then the line text prefixed with a tab. The final line
/// number from the header is kept, so correlation never depends on position.
pub fn parse_blame_porcelain(output: &str, date_style: DateStyle) -> Parsed<BlameMetadata> {
    let mut parsed = Parsed::new();
    let mut pending: Option<PendingLine> = None;

    for (index, line) in records(output) {
        if line.starts_with('\t') {
            match pending.take() {
                Some(entry) => parsed.records.push(entry.finish(date_style)),
                None => parsed.skipped.push(DecodeSkip::new(
                    ParserKind::Blame,
                    index,
                    line,
                    "line content without a header",
                )),
            }
            continue;
        }

        if let Some(header) = PendingLine::from_header(line) {
            if let Some(unfinished) = pending.replace(header) {
                parsed.skipped.push(DecodeSkip::new(
                    ParserKind::Blame,
                    index,
                    &unfinished.hash,
                    "header without line content",
                ));
            }
            continue;
        }

        match pending.as_mut() {
            Some(entry) => entry.apply(line),
            None if line.is_empty() => {}
            None => parsed.skipped.push(DecodeSkip::new(
                ParserKind::Blame,
                index,
                line,
                "expected a blame header",
            )),
        }
    }

    parsed.records.sort_by_key(|m| m.line_number);
    parsed
}

/// Pair metadata with the current working-copy text by line number
pub fn attach_content(metadata: Vec<BlameMetadata>, content: &str) -> Vec<BlameLine> {
    let lines: Vec<&str> = content.lines().collect();

    metadata
        .into_iter()
        .map(|m| BlameLine {
            content: m
                .line_number
                .checked_sub(1)
                .and_then(|i| lines.get(i))
                .map(|line| line.to_string())
                .unwrap_or_default(),
            line_number: m.line_number,
            commit_hash: m.commit_hash,
            author: m.author,
            date: m.date,
            commit_summary: m.commit_summary,
        })
        .collect()
}

struct PendingLine {
    hash: String,
    line_number: usize,
    author: String,
    author_time: Option<i64>,
    author_tz: Option<String>,
    summary: String,
}

impl PendingLine {
    fn from_header(line: &str) -> Option<Self> {
        let mut tokens = line.split(' ');
        let hash = tokens.next()?;
        if !matches!(hash.len(), 40 | 64) || !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let _original: usize = tokens.next()?.parse().ok()?;
        let line_number: usize = tokens.next()?.parse().ok()?;
        if line_number == 0 {
            return None;
        }

        Some(Self {
            hash: hash.to_string(),
            line_number,
            author: String::new(),
            author_time: None,
            author_tz: None,
            summary: String::new(),
        })
    }

    fn apply(&mut self, line: &str) {
        let (key, value) = line.split_once(' ').unwrap_or((line, ""));
        match key {
            "author" => self.author = value.to_string(),
            "author-time" => self.author_time = value.trim().parse().ok(),
            "author-tz" => self.author_tz = Some(value.trim().to_string()),
            "summary" => self.summary = value.to_string(),
            _ => {}
        }
    }

    fn finish(self, date_style: DateStyle) -> BlameMetadata {
        let date = self
            .author_time
            .and_then(|t| format_date(t, self.author_tz.as_deref(), date_style))
            .unwrap_or_default();

        BlameMetadata {
            line_number: self.line_number,
            commit_hash: self.hash,
            author: self.author,
            date,
            commit_summary: self.summary,
        }
    }
}

/// Render epoch seconds in the author's own timezone (`+0100` style offsets)
fn format_date(timestamp: i64, tz: Option<&str>, style: DateStyle) -> Option<String> {
    let offset = match tz.and_then(parse_offset) {
        Some(offset) => offset,
        None => FixedOffset::east_opt(0)?,
    };
    let utc = DateTime::from_timestamp(timestamp, 0)?;
    Some(utc.with_timezone(&offset).format(style.chrono_pattern()).to_string())
}

fn parse_offset(tz: &str) -> Option<FixedOffset> {
    if tz.len() != 5 || !tz.is_ascii() {
        return None;
    }
    let sign = match &tz[..1] {
        "+" => 1,
        "-" => -1,
        _ => return None,
    };
    let hours: i32 = tz[1..3].parse().ok()?;
    let minutes: i32 = tz[3..5].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
