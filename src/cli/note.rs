use anyhow::Result;

use super::display;
use crate::git::GitCollector;
use crate::store::NoteStore;

pub fn show(store: &NoteStore, query: &str) -> Result<()> {
    match store.find_note(query) {
        Some(note) => display::print_note(note),
        None => println!("Note '{}' not found.", query),
    }
    Ok(())
}

pub fn delete(store: &mut NoteStore, query: &str) -> Result<()> {
    let Some(id) = store.find_note(query).map(|n| n.id.clone()) else {
        println!("Note '{}' not found.", query);
        return Ok(());
    };
    store.delete_note(&id)?;
    println!("Deleted note {}", id);
    Ok(())
}

/// Notes taken on a branch, in any repository. Defaults to the current branch.
pub async fn branch(store: &NoteStore, collector: &GitCollector, name: Option<String>) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => collector.current_branch().await?,
    };

    let notes = store.notes_on_branch(&name);
    if notes.is_empty() {
        println!("No notes found on branch '{}'.", name);
        return Ok(());
    }

    println!("Notes on branch {}\n", name);
    display::print_header();
    for note in notes {
        display::print_row(note);
    }
    Ok(())
}
