//! Command handlers for track-odds CLI
//!
//! Each subcommand has its own module with handler functions.

pub mod configure;
pub mod loot;
pub mod owned;
pub mod track;
pub mod validate;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use track_odds::{ConditionFallback, Dataset, Levels, OwnedSet, MAX_PLAYER_LEVEL};

use crate::cli::LevelArgs;
use crate::config::Config;

/// Dataset, owned set and defaults loaded for one invocation
pub struct Session {
    pub config: Config,
    pub data: Dataset,
    pub owned: OwnedSet,
    pub owned_path: PathBuf,
}

impl Session {
    pub fn open(dataset: Option<&Path>, owned: Option<&Path>) -> Result<Self> {
        let config = Config::load()?;
        Self::with_config(config, dataset, owned)
    }

    pub fn with_config(config: Config, dataset: Option<&Path>, owned: Option<&Path>) -> Result<Self> {
        let dataset_path = config.dataset_path(dataset);
        let data = Dataset::load(&dataset_path)
            .with_context(|| format!("Failed to load dataset from {}", dataset_path.display()))?;

        let owned_path = config.owned_path(owned)?;
        let owned = OwnedSet::load_or_default(&owned_path).with_context(|| {
            format!("Failed to read owned rewards from {}", owned_path.display())
        })?;

        tracing::debug!(
            dataset = %dataset_path.display(),
            owned = owned.len(),
            "session opened"
        );

        Ok(Self {
            config,
            data,
            owned,
            owned_path,
        })
    }

    /// Clamped levels, filling the player level from config
    pub fn levels(&self, args: &LevelArgs) -> Levels {
        let player = args
            .player_level
            .or(self.config.player_level)
            .unwrap_or(MAX_PLAYER_LEVEL);
        Levels::clamped(player, args.track_level)
    }
}

pub fn fallback(args: &LevelArgs) -> ConditionFallback {
    if args.ungated {
        ConditionFallback::Ungated
    } else {
        ConditionFallback::PlayerLevel
    }
}

/// Percentage cell, "-" when the notch doesn't offer the row
pub fn pct_cell(pct: Option<f64>) -> String {
    match pct {
        Some(p) => format!("{:.2}%", p),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pct_cell() {
        assert_eq!(pct_cell(Some(57.8125)), "57.81%");
        assert_eq!(pct_cell(Some(0.0)), "0.00%");
        assert_eq!(pct_cell(None), "-");
    }

    #[test]
    fn test_session_levels_and_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("dataset.json");
        std::fs::write(&dataset, "{}").unwrap();

        let config = Config {
            player_level: Some(42),
            ..Default::default()
        };
        let owned = dir.path().join("owned.json");
        let session = Session::with_config(config, Some(dataset.as_path()), Some(owned.as_path())).unwrap();
        assert!(session.owned.is_empty());

        let mut args = LevelArgs {
            player_level: None,
            track_level: 250,
            ungated: false,
        };
        assert_eq!(session.levels(&args), Levels::new(42, 200));
        assert_eq!(fallback(&args), ConditionFallback::PlayerLevel);

        args.player_level = Some(0);
        args.ungated = true;
        assert_eq!(session.levels(&args), Levels::new(1, 200));
        assert_eq!(fallback(&args), ConditionFallback::Ungated);
    }

    #[test]
    fn test_session_missing_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let result = Session::with_config(
            Config::default(),
            Some(dir.path().join("missing.json").as_path()),
            Some(dir.path().join("owned.json").as_path()),
        );
        assert!(result.is_err());
    }
}
