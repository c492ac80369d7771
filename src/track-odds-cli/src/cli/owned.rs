//! CLI definitions for the owned command

use clap::Subcommand;

#[derive(Subcommand)]
pub enum OwnedCommand {
    /// List owned reward ids
    List,

    /// Mark rewards as owned
    Add {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Unmark rewards
    Remove {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Flip ownership of rewards
    Toggle {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Forget every owned reward
    Clear,
}
