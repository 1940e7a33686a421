//! Export renderers

use clap::ValueEnum;
use std::fmt::Write;

use crate::model::WorkNote;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Markdown,
    Json,
}

pub fn render(notes: &[&WorkNote], format: ExportFormat) -> Result<String, serde_json::Error> {
    match format {
        ExportFormat::Markdown => Ok(render_markdown(notes)),
        ExportFormat::Json => serde_json::to_string_pretty(notes),
    }
}

pub fn render_markdown(notes: &[&WorkNote]) -> String {
    let mut out = String::from("# Work notes\n");
    if notes.is_empty() {
        out.push_str("\n_No notes._\n");
        return out;
    }

    for note in notes {
        let _ = writeln!(
            out,
            "\n## {} · {}\n",
            note.timestamp.format("%Y-%m-%d %H:%M UTC"),
            note.git_info.branch
        );
        let _ = writeln!(out, "{}\n", note.message);
        let _ = writeln!(out, "- Note: `{}`", note.id);
        let _ = writeln!(out, "- Repository: {}", note.repository.path);

        if !note.git_info.commits.is_empty() {
            let _ = writeln!(out, "\n**Recent commits**\n");
            for commit in &note.git_info.commits {
                let _ = writeln!(
                    out,
                    "- `{}` {} ({})",
                    commit.short_hash(),
                    commit.message,
                    commit.author
                );
            }
        }

        let status = &note.git_info.status;
        if !status.is_clean() {
            let _ = writeln!(out, "\n**Working tree**\n");
            for (label, paths) in [
                ("Staged", &status.staged),
                ("Unstaged", &status.unstaged),
                ("Untracked", &status.untracked),
            ] {
                if !paths.is_empty() {
                    let _ = writeln!(out, "- {}: {}", label, paths.join(", "));
                }
            }
        }

        if let Some(ai) = &note.ai_interpretation {
            let _ = writeln!(
                out,
                "\n**Interpretation** (confidence {:.0}%)\n",
                ai.confidence_score * 100.0
            );
            let _ = writeln!(out, "{}\n", ai.summary);
            let _ = writeln!(out, "{}", ai.technical_context);
            if !ai.suggested_next_steps.is_empty() {
                let _ = writeln!(out, "\nNext steps:");
                for (i, step) in ai.suggested_next_steps.iter().enumerate() {
                    let _ = writeln!(out, "{}. {}", i + 1, step);
                }
            }
            if !ai.related_files.is_empty() {
                let _ = writeln!(out, "\nRelated files: {}", ai.related_files.join(", "));
            }
        }
    }

    out
}
