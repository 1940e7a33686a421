//! Stats command implementation

use anyhow::Result;

use crate::store::NoteStore;

pub fn run(store: &NoteStore) -> Result<()> {
    let stats = store.stats()?;

    println!("Storage:      {}", store.dir().display());
    println!("Notes:        {}", stats.total_notes);
    println!("Repositories: {}", stats.repositories);
    println!("Size:         {}", format_bytes(stats.storage_bytes));
    if let (Some(oldest), Some(newest)) = (stats.oldest, stats.newest) {
        println!("Oldest:       {}", oldest.format("%Y-%m-%d %H:%M UTC"));
        println!("Newest:       {}", newest.format("%Y-%m-%d %H:%M UTC"));
    }

    let repositories = store.repositories();
    if !repositories.is_empty() {
        println!("\n{:<8} {}", "Notes", "Repository");
        println!("{}", "-".repeat(60));
        for (repo, count) in repositories {
            println!("{:<8} {}", count, repo.path);
        }
    }
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    match bytes {
        b if b < 1024 => format!("{} B", b),
        b if b < 1024 * 1024 => format!("{:.1} KB", b as f64 / 1024.0),
        b => format!("{:.1} MB", b as f64 / (1024.0 * 1024.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
