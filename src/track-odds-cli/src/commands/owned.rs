//! Owned rewards command handlers

use anyhow::{Context, Result};
use std::path::Path;
use track_odds::{DataSource, OwnedSet};

use super::Session;
use crate::cli::OwnedCommand;

/// Handle the owned command
pub fn handle(session: &mut Session, command: OwnedCommand) -> Result<()> {
    let changed = apply(&session.data, &mut session.owned, command);

    if changed {
        save(&session.owned, &session.owned_path)?;
    }
    Ok(())
}

/// Apply one owned command; returns true when the set changed
pub fn apply<D: DataSource + ?Sized>(data: &D, owned: &mut OwnedSet, command: OwnedCommand) -> bool {
    match command {
        OwnedCommand::List => {
            if owned.is_empty() {
                println!("No owned rewards");
            }
            for id in owned.iter() {
                let name = data
                    .reward(id)
                    .map(|m| m.name.as_str())
                    .filter(|n| !n.is_empty())
                    .unwrap_or(id);
                println!("  {:<32} {}", id, name);
            }
            false
        }

        OwnedCommand::Add { ids } => {
            let mut changed = false;
            for id in unique_only(data, &ids) {
                if owned.insert(id) {
                    println!("Owned: {}", id);
                    changed = true;
                }
            }
            changed
        }

        OwnedCommand::Remove { ids } => {
            let mut changed = false;
            for id in &ids {
                if owned.remove(id) {
                    println!("Not owned: {}", id);
                    changed = true;
                }
            }
            changed
        }

        OwnedCommand::Toggle { ids } => {
            let mut changed = false;
            for id in unique_only(data, &ids) {
                let now = owned.toggle(id);
                println!("{}: {}", if now { "Owned" } else { "Not owned" }, id);
                changed = true;
            }
            changed
        }

        OwnedCommand::Clear => {
            let changed = !owned.is_empty();
            owned.clear();
            println!("Cleared owned rewards");
            changed
        }
    }
}

/// Ids that may be owned; anything else is skipped with a warning
fn unique_only<'a, D: DataSource + ?Sized>(data: &D, ids: &'a [String]) -> Vec<&'a str> {
    ids.iter()
        .map(String::as_str)
        .filter(|id| {
            let unique = data.reward(id).is_some_and(|m| m.unique_eligible);
            if !unique {
                tracing::warn!(reward = *id, "not a unique reward, ownership ignored");
            }
            unique
        })
        .collect()
}

fn save(owned: &OwnedSet, path: &Path) -> Result<()> {
    owned
        .save(path)
        .with_context(|| format!("Failed to save owned rewards to {}", path.display()))?;
    tracing::debug!(path = %path.display(), count = owned.len(), "saved owned rewards");
    Ok(())
}
