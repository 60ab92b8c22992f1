use anyhow::{Context, Result};
use engine::MeetConfig;
use engine::models::Entry;
use std::path::Path;

pub fn load_meet_config(path: Option<&Path>) -> Result<MeetConfig> {
    match path {
        Some(path) => MeetConfig::from_path(path)
            .with_context(|| format!("Cannot load meet config from {}", path.display())),
        None => {
            tracing::info!("No meet config given, using IPF default plates");
            Ok(MeetConfig::default())
        }
    }
}

pub fn load_entries(path: &Path) -> Result<Vec<Entry>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read entries from {}", path.display()))?;
    let entries: Vec<Entry> = serde_json::from_str(&json)
        .with_context(|| format!("Invalid entries file {}", path.display()))?;
    tracing::info!("Loaded {} entries from {}", entries.len(), path.display());
    Ok(entries)
}

pub fn save_entries(path: &Path, entries: &[Entry]) -> Result<()> {
    let json = serde_json::to_string_pretty(entries)?;
    std::fs::write(path, json).with_context(|| format!("Cannot write {}", path.display()))?;
    tracing::info!("Saved {} entries to {}", entries.len(), path.display());
    Ok(())
}
