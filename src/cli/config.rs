//! Settings commands and the AI connectivity check

use anyhow::{Context, Result};

use crate::ai::InterpretationClient;
use crate::config::Config;
use crate::settings::{self, KEYS};
use crate::store::NoteStore;

pub fn get(store: &NoteStore, key: &str, reveal: bool) -> Result<()> {
    println!("{}", store.settings().get(key, reveal)?);
    Ok(())
}

pub fn set(store: &mut NoteStore, key: &str, value: &str) -> Result<()> {
    let patch = settings::parse_patch(key, value)?;
    let updated = store.update_settings(patch)?;
    println!("{} = {}", key, updated.get(key, false)?);
    Ok(())
}

pub fn list(store: &NoteStore) -> Result<()> {
    for key in KEYS {
        println!("{:<12} {}", key, store.settings().get(key, false)?);
    }
    Ok(())
}

/// Unlike during save, any failure here is fatal.
pub async fn test_ai(config: &Config, store: &NoteStore) -> Result<()> {
    let client = InterpretationClient::new(config.client_options(store.settings()));
    println!("Testing connection with model {}...", client.model());
    client
        .check_connection()
        .await
        .context("AI connectivity check failed")?;
    println!("✅ Interpretation API reachable");
    Ok(())
}
