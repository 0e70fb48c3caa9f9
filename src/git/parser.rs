use crate::error::GitResult;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// One commit from the log, most recent first in the returned sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub commit: String,
    pub author: String,
    pub date: String,
    pub message: String,
}

impl LogEntry {
    /// Parse the raw date field (git's default `%ad` rendering, e.g.
    /// "Fri Aug 29 10:12:45 2025 +0200") into a timestamp. Returns
    /// `None` when the field does not match that format.
    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_str(&self.date, "%a %b %e %H:%M:%S %Y %z").ok()
    }
}

/// Working-tree status, grouped the way `git status` reports it.
///
/// Paths appear in exactly the sections the raw text implies; a file
/// staged and then modified again shows up in both `staged` and
/// `unstaged`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    pub staged: Vec<String>,
    pub unstaged: Vec<String>,
    pub untracked: Vec<String>,
}

impl Status {
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty() && self.unstaged.is_empty() && self.untracked.is_empty()
    }
}

/// Acknowledgement line from a successful commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub branch: String,
    pub commit: String,
    pub message: String,
}

/// Branch listing: the checked-out branch plus all others in listed order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Branches {
    pub current: Option<String>,
    pub others: Vec<String>,
}

/// Parse log output produced by the pseudo-JSON format string: one
/// record per commit, each terminated by a comma, including the final
/// one. The trailing separator is stripped and the records decoded as
/// a JSON array.
///
/// Empty input yields an empty sequence. If the combined decode fails
/// (a message with embedded quotes can break a record), records are
/// salvaged one per line and bad ones skipped.
pub fn parse_log(output: &str) -> GitResult<Vec<LogEntry>> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let body = trimmed.strip_suffix(',').unwrap_or(trimmed);
    match serde_json::from_str::<Vec<LogEntry>>(&format!("[{}]", body)) {
        Ok(entries) => Ok(entries),
        Err(_) => Ok(salvage_log_records(trimmed)),
    }
}

/// Per-line fallback for log text that does not decode as one array
fn salvage_log_records(output: &str) -> Vec<LogEntry> {
    let mut entries = Vec::new();
    for line in output.lines() {
        let record = line.trim().trim_end_matches(',');
        if record.is_empty() {
            continue;
        }
        match serde_json::from_str::<LogEntry>(record) {
            Ok(entry) => entries.push(entry),
            Err(_) => warn!(record, "skipping malformed log record"),
        }
    }
    entries
}

/// Section annotations git prefixes to paths in the long status format
const STATUS_ANNOTATIONS: &[&str] = &[
    "modified:",
    "new file:",
    "deleted:",
    "renamed:",
    "copied:",
    "typechange:",
    "unmerged:",
    "added:",
];

/// Parse the human-readable `git status` block together with the
/// separate `ls-files --other --exclude-standard` listing.
///
/// Indented path lines are classified under the "Changes to be
/// committed" and "Changes not staged" headings; hint lines and the
/// status block's own untracked section are ignored. Untracked paths
/// come exclusively from the second input. Empty inputs yield an
/// all-empty `Status`.
pub fn parse_status(status: &str, untracked: &str) -> GitResult<Status> {
    #[derive(PartialEq)]
    enum Section {
        Staged,
        Unstaged,
        Other,
    }

    let mut result = Status::default();
    let mut section = Section::Other;

    for line in status.lines() {
        if line.starts_with("Changes to be committed") {
            section = Section::Staged;
        } else if line.starts_with("Changes not staged") {
            section = Section::Unstaged;
        } else if !line.starts_with(' ') && !line.starts_with('\t') {
            // Any other unindented line ends the current section:
            // "Untracked files:", "On branch ...", trailing advice, blanks
            section = Section::Other;
        } else {
            let entry = line.trim();
            if entry.is_empty() || entry.starts_with('(') {
                continue;
            }
            let path = strip_annotation(entry).to_string();
            match section {
                Section::Staged => result.staged.push(path),
                Section::Unstaged => result.unstaged.push(path),
                Section::Other => {}
            }
        }
    }

    result.untracked = untracked
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();

    Ok(result)
}

fn strip_annotation(entry: &str) -> &str {
    for annotation in STATUS_ANNOTATIONS {
        if let Some(rest) = entry.strip_prefix(annotation) {
            return rest.trim_start();
        }
    }
    entry
}

/// Parse git's short commit acknowledgement, e.g.
/// `[main (root-commit) abc1234] Initial commit`.
///
/// Returns `None` for empty stdout (nothing to commit) and for text
/// that does not carry the bracketed summary line.
pub fn parse_commit(output: &str) -> GitResult<Option<CommitSummary>> {
    let first_line = match output.lines().next() {
        Some(line) if !line.trim().is_empty() => line,
        _ => return Ok(None),
    };

    let Some(inside_start) = first_line.strip_prefix('[') else {
        return Ok(None);
    };
    let Some(close) = inside_start.find(']') else {
        return Ok(None);
    };

    let inside = &inside_start[..close];
    let message = inside_start[close + 1..].trim_start().to_string();

    let tokens: Vec<&str> = inside.split_whitespace().collect();
    let Some((&commit, branch_tokens)) = tokens.split_last() else {
        return Ok(None);
    };

    // Parenthesized markers like "(root-commit)" sit between the branch
    // name and the hash
    let branch = branch_tokens
        .iter()
        .filter(|t| !t.starts_with('('))
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    Ok(Some(CommitSummary {
        branch,
        commit: commit.to_string(),
        message,
    }))
}

/// Parse a newline-delimited branch listing. The current branch is
/// marked with a leading `* `; the marker is stripped from the name.
/// A detached-HEAD marker line (`* (HEAD detached at ...)`) leaves
/// `current` unset.
pub fn parse_branches(output: &str) -> GitResult<Branches> {
    let mut branches = Branches::default();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(name) = line.strip_prefix('*') {
            let name = name.trim();
            if !name.starts_with('(') {
                branches.current = Some(name.to_string());
            }
        } else {
            branches.others.push(line.to_string());
        }
    }

    Ok(branches)
}

/// Parse the verbose remote listing: one `<name>\t<url> (fetch|push)`
/// line per remote per direction. Repeated lines for the same remote
/// collapse to a single entry; the first value wins (git lists fetch
/// before push, so the fetch URL is kept when they differ).
pub fn parse_remotes(output: &str) -> GitResult<BTreeMap<String, String>> {
    let mut remotes = BTreeMap::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split_whitespace();
        let (Some(name), Some(url)) = (fields.next(), fields.next()) else {
            continue;
        };
        remotes
            .entry(name.to_string())
            .or_insert_with(|| url.to_string());
    }

    Ok(remotes)
}
