//! Work notes and the git facts captured with them
//!
//! Everything here is persisted to `notes.json` with camelCase field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel for notes whose repository could not be determined
pub const UNKNOWN_REPOSITORY: &str = "unknown";

/// One commit as parsed from `git log`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub hash: String,
    pub message: String,
    /// ISO-8601 author date as printed by git
    pub timestamp: String,
    pub author: String,
    #[serde(default)]
    pub files: Vec<String>,
}

impl CommitRecord {
    pub fn short_hash(&self) -> &str {
        prefix(&self.hash, 7)
    }
}

/// Paths reported by `git status --porcelain`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkingTreeStatus {
    #[serde(default)]
    pub staged: Vec<String>,
    #[serde(default)]
    pub unstaged: Vec<String>,
    #[serde(default)]
    pub untracked: Vec<String>,
}

impl WorkingTreeStatus {
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty() && self.unstaged.is_empty() && self.untracked.is_empty()
    }
}

/// Partition key for repository-scoped queries
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    pub path: String,
    pub identifier: String,
}

impl RepositoryDescriptor {
    /// The identifier is the normalized root path itself.
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            identifier: path.clone(),
            path,
        }
    }

    pub fn unknown() -> Self {
        Self::from_path(UNKNOWN_REPOSITORY)
    }
}

/// Repository state at the moment a note was taken
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitSnapshot {
    pub branch: String,
    /// Most recent first
    #[serde(default)]
    pub commits: Vec<CommitRecord>,
    #[serde(default)]
    pub status: WorkingTreeStatus,
    /// Empty for notes written before repository paths were recorded
    #[serde(default)]
    pub repo_path: String,
}

/// Model-generated reading of a note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiInterpretation {
    pub summary: String,
    pub technical_context: String,
    pub suggested_next_steps: Vec<String>,
    pub related_files: Vec<String>,
    /// Always within [0, 1]
    pub confidence_score: f64,
}

/// The unit of persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkNote {
    pub id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub git_info: GitSnapshot,
    pub repository: RepositoryDescriptor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_interpretation: Option<AiInterpretation>,
}

impl WorkNote {
    /// Create a note with a fresh id and the current time
    pub fn new(
        message: impl Into<String>,
        git_info: GitSnapshot,
        repository: RepositoryDescriptor,
        ai_interpretation: Option<AiInterpretation>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            git_info,
            repository,
            ai_interpretation,
        }
    }

    pub fn short_id(&self) -> &str {
        prefix(&self.id, 8)
    }
}

/// First `chars` characters of `s`, never splitting a code point
fn prefix(s: &str, chars: usize) -> &str {
    match s.char_indices().nth(chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}
