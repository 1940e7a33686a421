//! Loading `notes.json`: corrupt-data recovery and the repository migration

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

use crate::model::{AiInterpretation, GitSnapshot, RepositoryDescriptor, WorkNote};

/// A note as found on disk. Notes written before repository scoping existed
/// have no `repository`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredNote {
    pub id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub git_info: GitSnapshot,
    #[serde(default)]
    pub repository: Option<RepositoryDescriptor>,
    #[serde(default)]
    pub ai_interpretation: Option<AiInterpretation>,
}

#[derive(Debug, Default)]
pub struct ParsedNotes {
    pub notes: BTreeMap<String, StoredNote>,
    /// Entries that were valid JSON but not a note
    pub skipped: usize,
    /// The document as a whole was not a JSON object
    pub corrupt: bool,
}

impl ParsedNotes {
    /// True when loading dropped anything the file contained
    pub fn lost_data(&self) -> bool {
        self.corrupt || self.skipped > 0
    }
}

pub struct Migration {
    pub notes: BTreeMap<String, WorkNote>,
    /// Number of notes that were given a repository descriptor
    pub migrated: usize,
}

/// Parse the notes document. Empty or invalid input yields an empty
/// collection; individual entries that do not describe a note are skipped.
pub fn parse_or_default(content: &str) -> ParsedNotes {
    if content.trim().is_empty() {
        return ParsedNotes::default();
    }
    let entries: BTreeMap<String, Value> = match serde_json::from_str(content) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "notes file is corrupt, starting with an empty collection");
            return ParsedNotes {
                corrupt: true,
                ..Default::default()
            };
        }
    };

    let mut parsed = ParsedNotes::default();
    for (key, entry) in entries {
        match serde_json::from_value::<StoredNote>(entry) {
            Ok(note) => {
                parsed.notes.insert(key, note);
            }
            Err(e) => {
                warn!(id = %key, error = %e, "skipping unreadable note");
                parsed.skipped += 1;
            }
        }
    }
    parsed
}

/// Give every note a repository descriptor, derived from the snapshot's
/// repository path or the `unknown` sentinel. Notes that already carry one
/// are passed through untouched.
pub fn migrate(notes: BTreeMap<String, StoredNote>) -> Migration {
    let mut migrated = 0;
    let notes = notes
        .into_iter()
        .map(|(key, note)| {
            let repository = match note.repository {
                Some(repository) => repository,
                None => {
                    migrated += 1;
                    legacy_descriptor(&note.git_info)
                }
            };
            let note = WorkNote {
                id: note.id,
                message: note.message,
                timestamp: note.timestamp,
                git_info: note.git_info,
                repository,
                ai_interpretation: note.ai_interpretation,
            };
            (key, note)
        })
        .collect();

    Migration { notes, migrated }
}

fn legacy_descriptor(snapshot: &GitSnapshot) -> RepositoryDescriptor {
    let path = snapshot.repo_path.trim();
    if path.is_empty() {
        RepositoryDescriptor::unknown()
    } else {
        RepositoryDescriptor::from_path(path)
    }
}
