//! CLI argument definitions for track-odds
//!
//! This module contains all clap-derived structs and enums for CLI parsing.

mod core;
mod owned;

pub use core::{Cli, Commands, LevelArgs, SortKey};
pub use owned::OwnedCommand;
