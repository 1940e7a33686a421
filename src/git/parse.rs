//! Parsers for git's text output

use crate::model::{CommitRecord, WorkingTreeStatus};

/// Separator between fields of a log header line
pub const FIELD_SEPARATOR: char = '|';

/// `--pretty` format producing `hash|subject|iso-date|author`
pub const LOG_FORMAT: &str = "%H|%s|%aI|%an";

/// True for the compact `hash,subject,date,author[,file...]` form.
///
/// Regular log output is multi-line and always carries `FIELD_SEPARATOR`.
pub fn is_single_line_form(output: &str) -> bool {
    let trimmed = output.trim();
    !trimmed.is_empty()
        && !trimmed.contains('\n')
        && !trimmed.contains(FIELD_SEPARATOR)
        && trimmed.contains(',')
}

/// Parse `git log --pretty=format:<LOG_FORMAT> --name-only` output.
///
/// Each header line starts a commit; the non-empty lines after it are the
/// files it touched. Output without any recognisable header yields an empty
/// list.
pub fn parse_log(output: &str) -> Vec<CommitRecord> {
    if is_single_line_form(output) {
        let fields: Vec<&str> = output.trim().split(',').map(str::trim).collect();
        return parse_comma_fields(&fields).into_iter().collect();
    }

    let mut commits: Vec<CommitRecord> = Vec::new();
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(commit) = parse_header(line) {
            commits.push(commit);
        } else if let Some(current) = commits.last_mut() {
            current.files.push(line.to_string());
        }
    }
    commits
}

/// `hash|subject|date|author`. Hash, date and author are taken from the ends
/// so that a subject containing the separator stays intact.
fn parse_header(line: &str) -> Option<CommitRecord> {
    let parts: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if parts.len() < 4 || !looks_like_hash(parts[0]) {
        return None;
    }
    let last = parts.len() - 1;
    Some(CommitRecord {
        hash: parts[0].to_string(),
        message: parts[1..last - 1].join("|"),
        timestamp: parts[last - 1].to_string(),
        author: parts[last].to_string(),
        files: Vec::new(),
    })
}

fn parse_comma_fields(fields: &[&str]) -> Option<CommitRecord> {
    if fields.len() < 4 || !looks_like_hash(fields[0]) {
        return None;
    }
    Some(CommitRecord {
        hash: fields[0].to_string(),
        message: fields[1].to_string(),
        timestamp: fields[2].to_string(),
        author: fields[3].to_string(),
        files: fields[4..]
            .iter()
            .filter(|f| !f.is_empty())
            .map(|f| f.to_string())
            .collect(),
    })
}

fn looks_like_hash(s: &str) -> bool {
    s.len() >= 4 && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Parse `git status --porcelain` output.
///
/// The first status column is the index, the second the work tree. `??`
/// entries are untracked; ignored (`!!`) entries are skipped.
pub fn parse_status(output: &str) -> WorkingTreeStatus {
    let mut status = WorkingTreeStatus::default();

    for line in output.lines() {
        let bytes = line.as_bytes();
        if bytes.len() < 4 {
            continue;
        }
        let (index, worktree) = (bytes[0], bytes[1]);
        let Some(raw_path) = line.get(3..) else {
            continue;
        };
        let path = status_path(raw_path);

        match (index, worktree) {
            (b'!', _) => {}
            (b'?', b'?') => status.untracked.push(path),
            _ => {
                if index != b' ' && index != b'?' {
                    status.staged.push(path.clone());
                }
                if worktree == b'?' {
                    status.untracked.push(path);
                } else if worktree != b' ' {
                    status.unstaged.push(path);
                }
            }
        }
    }

    status
}

/// Renames are reported as `old -> new`; keep the new path.
fn status_path(raw: &str) -> String {
    let path = raw.rsplit(" -> ").next().unwrap_or(raw).trim();
    path.trim_matches('"').to_string()
}

/// Find the current branch in `git branch` output (the `*` line).
pub fn parse_branch_list(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.trim_start().strip_prefix('*'))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Trim whitespace and trailing separators so the same root reached from
/// different working directories yields one identifier.
pub fn normalize_root(raw: &str) -> String {
    let trimmed = raw.trim();
    let normalized = trimmed.trim_end_matches(['/', '\\']);
    if normalized.is_empty() && !trimmed.is_empty() {
        // filesystem root
        return trimmed[..1].to_string();
    }
    normalized.to_string()
}
