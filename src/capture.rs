//! Save and resume flows shared by the commands
//!
//! Git and storage failures are fatal here; interpretation failures are not.
//! A note whose interpretation failed is saved without one and the error is
//! handed back as a warning.

use anyhow::{bail, Context, Result};
use tracing::warn;

use crate::ai::InterpretationClient;
use crate::error::{AiError, GitError};
use crate::git::GitCollector;
use crate::model::{RepositoryDescriptor, WorkNote};
use crate::store::NoteStore;

#[derive(Debug)]
pub struct SaveOutcome {
    pub note: WorkNote,
    /// Why the note has no interpretation, when one was attempted
    pub ai_warning: Option<AiError>,
}

/// Capture the repository state, optionally interpret it, and persist a note.
///
/// The client is only consulted when AI is enabled in the settings.
pub async fn save_note(
    collector: &GitCollector,
    store: &mut NoteStore,
    client: Option<&InterpretationClient>,
    message: &str,
) -> Result<SaveOutcome> {
    let message = message.trim();
    if message.is_empty() {
        bail!("Note message cannot be empty");
    }

    let settings = store.settings().clone();
    let snapshot = collector
        .snapshot(settings.max_commits)
        .await
        .context("Failed to capture git state")?;
    let repository = RepositoryDescriptor::from_path(snapshot.repo_path.clone());

    let mut ai_warning = None;
    let interpretation = match client {
        Some(client) if settings.ai_enabled => match client.interpret(message, &snapshot).await {
            Ok(interpretation) => Some(interpretation),
            Err(e) => {
                warn!(error = %e, "saving note without interpretation");
                ai_warning = Some(e);
                None
            }
        },
        _ => None,
    };

    let note = WorkNote::new(message, snapshot, repository, interpretation);
    store
        .save_note(note.clone())
        .context("Failed to save note")?;

    Ok(SaveOutcome { note, ai_warning })
}

/// Repository scope for queries: `None` when `all` is set or when the
/// working directory is not inside a repository.
pub async fn current_scope(collector: &GitCollector, all: bool) -> Result<Option<String>, GitError> {
    if all {
        return Ok(None);
    }
    match collector.repository().await {
        Ok(repository) => Ok(Some(repository.identifier)),
        Err(GitError::NotARepository(_)) => Ok(None),
        Err(e) => Err(e),
    }
}
