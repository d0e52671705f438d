//! Plain-text transport of structured results to a GUI process.

use crate::error::GitResult;
use serde::Serialize;
use serde_json::Value;

/// JSON array of records, field names as declared on the record types
pub fn to_json<T: Serialize>(records: &[T]) -> GitResult<String> {
    Ok(serde_json::to_string(records)?)
}

/// One `field=value` line per field, records separated by a blank line
///
/// Lists are joined with `,`. Backslashes and newlines inside values, and
/// commas inside list items, are backslash-escaped so every field stays on
/// one line and every list splits back into its items.
pub fn to_key_value<T: Serialize>(records: &[T]) -> GitResult<String> {
    let mut out = String::new();

    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        match serde_json::to_value(record)? {
            Value::Object(fields) => {
                for (key, value) in fields {
                    out.push_str(&key);
                    out.push('=');
                    out.push_str(&render(&value));
                    out.push('\n');
                }
            }
            other => {
                out.push_str(&render(&other));
                out.push('\n');
            }
        }
    }

    Ok(out)
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => escape(s),
        Value::Array(items) => items
            .iter()
            .map(|item| render(item).replace(',', "\\,"))
            .collect::<Vec<_>>()
            .join(","),
        other => escape(&other.to_string()),
    }
}

fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::parser::{BranchEntry, CommitRecord, FileStatusCode, FileStatusEntry};

    #[test]
    fn test_key_value_field_names() {
        let branches = vec![
            BranchEntry {
                name: "main".to_string(),
                is_current: true,
                is_remote: false,
            },
            BranchEntry {
                name: "origin/dev".to_string(),
                is_current: false,
                is_remote: true,
            },
        ];

        let text = to_key_value(&branches).unwrap();
        assert_eq!(
            text,
            "isCurrent=true\nisRemote=false\nname=main\n\nisCurrent=false\nisRemote=true\nname=origin/dev\n"
        );
    }

    #[test]
    fn test_key_value_lists_and_escapes() {
        let commit = CommitRecord {
            hash: "abc".to_string(),
            message: "line one\nline two".to_string(),
            author: "A".to_string(),
            date: "2024-01-01".to_string(),
            refs: vec!["HEAD -> main".to_string(), "tag: v1".to_string()],
        };

        let text = to_key_value(&[commit]).unwrap();
        assert!(text.contains("message=line one\\nline two\n"));
        assert!(text.contains("refs=HEAD -> main,tag: v1\n"));
    }

    #[test]
    fn test_key_value_list_items_with_commas() {
        let commit = CommitRecord {
            hash: "abc".to_string(),
            message: "one, two".to_string(),
            author: "A".to_string(),
            date: "2024-01-01".to_string(),
            refs: vec!["tag: a,b".to_string(), "main".to_string()],
        };

        let text = to_key_value(&[commit]).unwrap();
        assert!(text.contains("refs=tag: a\\,b,main\n"));
        // Commas outside lists are left alone
        assert!(text.contains("message=one, two\n"));
    }

    #[test]
    fn test_json_status_letter() {
        let entries = vec![FileStatusEntry {
            filename: "a.txt".to_string(),
            status_code: FileStatusCode::Modified,
            staged: true,
        }];

        assert_eq!(
            to_json(&entries).unwrap(),
            r#"[{"filename":"a.txt","statusCode":"M","staged":true}]"#
        );
    }

    #[test]
    fn test_empty() {
        assert_eq!(to_key_value::<BranchEntry>(&[]).unwrap(), "");
        assert_eq!(to_json::<BranchEntry>(&[]).unwrap(), "[]");
    }
}
