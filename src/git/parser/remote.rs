use super::{DecodeSkip, ParserKind, Parsed, records};
use serde::{Deserialize, Serialize};

/// Parse `git remote -v` output
///
/// Format: origin  https://example.com/repo.git (fetch)
///         origin  https://example.com/repo.git (push)
pub fn parse_remotes(output: &str) -> Parsed<RemoteEntry> {
    let mut parsed: Parsed<RemoteEntry> = Parsed::new();

    for (index, line) in records(output) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let (Some(name), Some(url)) = (tokens.next(), tokens.next()) else {
            parsed.skipped.push(DecodeSkip::new(
                ParserKind::Remote,
                index,
                line,
                "expected remote name and url",
            ));
            continue;
        };

        let entry = RemoteEntry {
            name: name.to_string(),
            url: url.trim_matches(|c| c == '(' || c == ')').to_string(),
        };
        if !parsed.records.contains(&entry) {
            parsed.records.push(entry);
        }
    }

    parsed
}

/// A configured remote, one per distinct (name, url) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub name: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(name: &str, url: &str) -> RemoteEntry {
        RemoteEntry {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_fetch_and_push_collapse() {
        let output = "origin\tgit@example.com:team/repo.git (fetch)\n\
                      origin\tgit@example.com:team/repo.git (push)\n";
        let remotes = parse_remotes(output).records;

        assert_eq!(remotes, vec![remote("origin", "git@example.com:team/repo.git")]);
    }

    #[test]
    fn test_distinct_push_url_kept() {
        let output = "origin\thttps://a/r.git (fetch)\norigin\thttps://b/r.git (push)\nupstream\thttps://c/r.git (fetch)";
        let remotes = parse_remotes(output).records;

        assert_eq!(
            remotes,
            vec![
                remote("origin", "https://a/r.git"),
                remote("origin", "https://b/r.git"),
                remote("upstream", "https://c/r.git"),
            ]
        );
    }

    #[test]
    fn test_lone_name_skipped() {
        let parsed = parse_remotes("origin\n\nfork https://f/r.git (fetch)");

        assert_eq!(parsed.records, vec![remote("fork", "https://f/r.git")]);
        assert_eq!(parsed.skipped.len(), 1);
        assert_eq!(parsed.skipped[0].line_number, 1);
    }
}
