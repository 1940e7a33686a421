//! Terminal rendering shared by the commands

use crate::model::WorkNote;

/// Full view of a note
pub fn print_note(note: &WorkNote) {
    println!("\n{}", "=".repeat(80));
    println!(
        "Note {} | {}",
        note.short_id(),
        note.timestamp.format("%Y-%m-%d %H:%M UTC")
    );
    println!(
        "Branch: {} | Repository: {}",
        note.git_info.branch, note.repository.path
    );
    println!("{}", "=".repeat(80));
    println!("\n{}", note.message);

    if !note.git_info.commits.is_empty() {
        println!("\nRecent commits:");
        for commit in &note.git_info.commits {
            println!(
                "  {} {} ({})",
                commit.short_hash(),
                truncate(&commit.message, 60),
                commit.author
            );
        }
    }

    let status = &note.git_info.status;
    if !status.is_clean() {
        println!("\nWorking tree:");
        for (label, paths) in [
            ("staged", &status.staged),
            ("unstaged", &status.unstaged),
            ("untracked", &status.untracked),
        ] {
            if !paths.is_empty() {
                println!("  {:<10} {}", label, paths.join(", "));
            }
        }
    }

    if let Some(ai) = &note.ai_interpretation {
        println!(
            "\n🤖 Interpretation (confidence {:.0}%)",
            ai.confidence_score * 100.0
        );
        println!("{}", "-".repeat(40));
        println!("{}", ai.summary);
        println!("\n{}", ai.technical_context);
        if !ai.suggested_next_steps.is_empty() {
            println!("\nNext steps:");
            for (i, step) in ai.suggested_next_steps.iter().enumerate() {
                println!("  {}. {}", i + 1, step);
            }
        }
        if !ai.related_files.is_empty() {
            println!("\nRelated files: {}", ai.related_files.join(", "));
        }
    }
    println!();
}

/// Column header matching [`print_row`]
pub fn print_header() {
    println!(
        "{:<12} {:<10} {:<20} {}",
        "Timestamp", "ID", "Branch", "Message"
    );
    println!("{}", "-".repeat(80));
}

pub fn print_row(note: &WorkNote) {
    let message = note.message.lines().next().unwrap_or_default();
    println!(
        "{:<12} {:<10} {:<20} {}",
        note.timestamp.format("%m-%d %H:%M"),
        note.short_id(),
        truncate(&note.git_info.branch, 20),
        truncate(message, 40),
    );
}

pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}
