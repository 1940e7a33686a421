//! Export command implementation

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::capture;
use crate::export::{self, ExportFormat};
use crate::git::GitCollector;
use crate::store::NoteStore;

pub async fn run(
    store: &NoteStore,
    collector: &GitCollector,
    all: bool,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let scope = capture::current_scope(collector, all).await?;
    let notes = store.all_notes(scope.as_deref());
    let rendered = export::render(&notes, format)?;

    match output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Exported {} notes to {}", notes.len(), path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
