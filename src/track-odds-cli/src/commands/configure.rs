//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up track-odds defaults.

use crate::config::Config;
use anyhow::{bail, Result};
use std::path::PathBuf;
use track_odds::MAX_PLAYER_LEVEL;

/// Settings requested on the command line
#[derive(Debug, Default)]
pub struct Changes {
    pub dataset: Option<PathBuf>,
    pub owned: Option<PathBuf>,
    pub player_level: Option<u32>,
}

impl Changes {
    fn is_empty(&self) -> bool {
        self.dataset.is_none() && self.owned.is_none() && self.player_level.is_none()
    }
}

/// Handle the configure command
pub fn handle(changes: Changes, show: bool) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config);
        return Ok(());
    }

    if changes.is_empty() {
        show_usage();
        return Ok(());
    }

    apply(&mut config, changes)?;
    config.save()?;

    show_config(&config);
    Ok(())
}

/// Merge requested settings into the config
fn apply(config: &mut Config, changes: Changes) -> Result<()> {
    if let Some(level) = changes.player_level {
        if !(1..=MAX_PLAYER_LEVEL).contains(&level) {
            bail!("Player level must be between 1 and {}", MAX_PLAYER_LEVEL);
        }
        config.player_level = Some(level);
    }
    if let Some(path) = changes.dataset {
        config.dataset = Some(path);
    }
    if let Some(path) = changes.owned {
        config.owned = Some(path);
    }
    Ok(())
}

/// Display current configuration
fn show_config(config: &Config) {
    let show_path = |p: &Option<PathBuf>| {
        p.as_ref()
            .map_or_else(|| "(default)".to_string(), |p| p.display().to_string())
    };

    println!("Dataset: {}", show_path(&config.dataset));
    println!("Owned rewards: {}", show_path(&config.owned));
    match config.player_level {
        Some(level) => println!("Player level: {}", level),
        None => println!("Player level: (default {})", MAX_PLAYER_LEVEL),
    }

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: track-odds configure --default-dataset PATH");
    println!("   or: track-odds configure --player-level 60");
    println!("   or: track-odds configure --show");
}
