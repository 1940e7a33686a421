//! Save command implementation

use anyhow::Result;

use crate::ai::InterpretationClient;
use crate::capture;
use crate::config::Config;
use crate::git::GitCollector;
use crate::store::NoteStore;

pub async fn run(
    config: &Config,
    store: &mut NoteStore,
    collector: &GitCollector,
    message: &str,
    no_ai: bool,
) -> Result<()> {
    let client = if no_ai {
        None
    } else {
        Some(InterpretationClient::new(
            config.client_options(store.settings()),
        ))
    };

    let outcome = capture::save_note(collector, store, client.as_ref(), message).await?;

    if let Some(warning) = &outcome.ai_warning {
        eprintln!("⚠️  AI interpretation skipped: {}", warning);
    }

    let note = &outcome.note;
    println!(
        "✅ Saved note {} on {} ({})",
        note.short_id(),
        note.git_info.branch,
        note.repository.path
    );
    if let Some(ai) = &note.ai_interpretation {
        println!("   {}", ai.summary);
    }
    Ok(())
}
