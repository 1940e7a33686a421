//! Prompt rendering for note interpretation

use std::fmt::Write;

use crate::model::GitSnapshot;

/// Commits included in the prompt
pub const PROMPT_COMMITS: usize = 5;

const INSTRUCTIONS: &str = r#"Based on the note and git context above, respond with a JSON object containing exactly these fields:
{
  "summary": "one or two sentences describing what the developer was doing",
  "technicalContext": "the technical state of the work: what changed and what is in progress",
  "suggestedNextSteps": ["concrete next action", "..."],
  "relatedFiles": ["path/to/file", "..."],
  "confidenceScore": 0.0
}
confidenceScore must be a number between 0 and 1. Respond with the JSON object only."#;

/// Render the interpretation prompt. Output depends only on the inputs.
pub fn build_prompt(message: &str, snapshot: &GitSnapshot) -> String {
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "A developer saved this note about their current work so they can resume later."
    );
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Note: {}", message);
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Branch: {}", snapshot.branch);
    let _ = writeln!(prompt, "Repository: {}", snapshot.repo_path);
    let _ = writeln!(prompt);

    let _ = writeln!(prompt, "Recent commits:");
    if snapshot.commits.is_empty() {
        let _ = writeln!(prompt, "(none)");
    }
    for commit in snapshot.commits.iter().take(PROMPT_COMMITS) {
        let _ = write!(prompt, "- {} {}", commit.short_hash(), commit.message);
        if !commit.files.is_empty() {
            let _ = write!(prompt, " [{}]", commit.files.join(", "));
        }
        let _ = writeln!(prompt);
    }

    for (label, paths) in [
        ("Staged changes", &snapshot.status.staged),
        ("Unstaged changes", &snapshot.status.unstaged),
        ("Untracked files", &snapshot.status.untracked),
    ] {
        if paths.is_empty() {
            continue;
        }
        let _ = writeln!(prompt);
        let _ = writeln!(prompt, "{}:", label);
        for path in paths {
            let _ = writeln!(prompt, "- {}", path);
        }
    }

    let _ = writeln!(prompt);
    prompt.push_str(INSTRUCTIONS);
    prompt
}
