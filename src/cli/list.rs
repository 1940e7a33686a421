//! List and resume command implementations

use anyhow::Result;

use super::display;
use crate::capture;
use crate::git::GitCollector;
use crate::store::NoteStore;

pub async fn run(store: &NoteStore, collector: &GitCollector, count: usize, all: bool) -> Result<()> {
    let scope = capture::current_scope(collector, all).await?;
    let notes = store.recent_notes(count, scope.as_deref());

    if notes.is_empty() {
        println!("No notes found. Run 'waypoint save <message>' first.");
        return Ok(());
    }

    match &scope {
        Some(repo) => println!("Notes for {}\n", repo),
        None => println!("Notes across all repositories\n"),
    }
    display::print_header();
    for note in notes {
        display::print_row(note);
    }
    Ok(())
}

pub async fn resume(store: &NoteStore, collector: &GitCollector, all: bool) -> Result<()> {
    let scope = capture::current_scope(collector, all).await?;

    match store.latest_note(scope.as_deref()) {
        Some(note) => display::print_note(note),
        None => match scope {
            Some(repo) => println!("No notes found for {}.", repo),
            None => println!("No notes found."),
        },
    }
    Ok(())
}
