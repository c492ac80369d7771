//! Core CLI definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use super::owned::OwnedCommand;

#[derive(Parser)]
#[command(name = "track-odds")]
#[command(about = "Reward track odds calculator", long_about = None)]
pub struct Cli {
    /// Path to the track dataset (JSON)
    #[arg(long, global = true, env = "TRACK_ODDS_DATASET")]
    pub dataset: Option<PathBuf>,

    /// Path to the owned rewards file (JSON array of reward ids)
    #[arg(long, global = true, env = "TRACK_ODDS_OWNED")]
    pub owned: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Player and track level selection shared by the query commands
#[derive(Args, Debug, Clone)]
pub struct LevelArgs {
    /// Player level, 1-70 (uses configured default if not provided)
    #[arg(short, long)]
    pub player_level: Option<u32>,

    /// Track level, 0-200
    #[arg(short, long, default_value_t = 1)]
    pub track_level: u32,

    /// Select no tier for loot tables whose condition is neither level nor track XP
    #[arg(long)]
    pub ungated: bool,
}

/// Column to order the reward table by
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Track,
    Name,
    Cost,
    Gs,
    N1Weight,
    N1Single,
    N1Any,
    N2Weight,
    N2Single,
    N2Any,
    N3Weight,
    N3Single,
    N3Any,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reward table for a track level, merged across the three notches
    #[command(visible_alias = "t")]
    Track {
        #[command(flatten)]
        levels: LevelArgs,

        /// Column to sort by
        #[arg(short, long, value_enum, default_value_t = SortKey::Track)]
        sort: SortKey,

        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,

        /// Show at most this many rows
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Bucket breakdown of a reward's loot table
    #[command(visible_alias = "l")]
    Loot {
        /// Reward id (e.g. "ITM_Weapons")
        reward_id: String,

        #[command(flatten)]
        levels: LevelArgs,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Per-item chances inside one bucket of a reward
    #[command(visible_alias = "b")]
    Bucket {
        /// Reward id the bucket is reached through
        reward_id: String,

        /// Bucket name (with or without the [LBID] prefix)
        bucket: String,

        #[command(flatten)]
        levels: LevelArgs,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Gear score range of a loot table at the given levels
    Gs {
        /// Loot table id (e.g. "LT_Weapons")
        table_id: String,

        #[command(flatten)]
        levels: LevelArgs,
    },

    /// Manage owned unique rewards
    #[command(visible_alias = "o")]
    Owned {
        #[command(subcommand)]
        command: OwnedCommand,
    },

    /// Load and validate the dataset
    Validate,

    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure {
        /// Set default dataset path
        #[arg(long)]
        default_dataset: Option<PathBuf>,

        /// Set default owned rewards file
        #[arg(long)]
        default_owned: Option<PathBuf>,

        /// Set default player level
        #[arg(long)]
        player_level: Option<u32>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_track_args() {
        let cli = Cli::try_parse_from([
            "track-odds", "track", "-p", "60", "-t", "42", "--sort", "n2-any", "--asc",
        ])
        .unwrap();

        match cli.command {
            Commands::Track {
                levels, sort, asc, limit, json,
            } => {
                assert_eq!(levels.player_level, Some(60));
                assert_eq!(levels.track_level, 42);
                assert!(!levels.ungated);
                assert_eq!(sort, SortKey::N2Any);
                assert!(asc);
                assert_eq!(limit, None);
                assert!(!json);
            }
            _ => panic!("expected track command"),
        }
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["track-odds", "loot", "ITM_Weapons", "--verbose"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Loot { reward_id, levels, .. } => {
                assert_eq!(reward_id, "ITM_Weapons");
                assert_eq!(levels.player_level, None);
                assert_eq!(levels.track_level, 1);
            }
            _ => panic!("expected loot command"),
        }
    }

    #[test]
    fn test_parse_owned_add() {
        let cli = Cli::try_parse_from(["track-odds", "owned", "add", "ART_A", "ART_B"]).unwrap();
        match cli.command {
            Commands::Owned {
                command: OwnedCommand::Add { ids },
            } => assert_eq!(ids, vec!["ART_A", "ART_B"]),
            _ => panic!("expected owned add"),
        }
    }
}
