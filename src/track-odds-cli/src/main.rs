mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::*;
use commands::track::{SortDir, TableView};
use commands::Session;
use config::Config;

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "track_odds=debug,track_odds_cli=debug"
    } else {
        "track_odds=info,track_odds_cli=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let dataset = cli.dataset.as_deref();
    let owned = cli.owned.as_deref();

    match cli.command {
        Commands::Configure {
            default_dataset,
            default_owned,
            player_level,
            show,
        } => {
            let changes = commands::configure::Changes {
                dataset: default_dataset,
                owned: default_owned,
                player_level,
            };
            commands::configure::handle(changes, show)?;
        }

        Commands::Validate => {
            let path = Config::load()?.dataset_path(dataset);
            commands::validate::handle(&path)?;
        }

        Commands::Track {
            levels,
            sort,
            asc,
            limit,
            json,
        } => {
            let session = Session::open(dataset, owned)?;
            let view = TableView {
                sort,
                dir: SortDir::from_asc(asc),
                limit,
                json,
            };
            commands::track::handle(&session, &levels, view)?;
        }

        Commands::Loot {
            reward_id,
            levels,
            json,
        } => {
            let session = Session::open(dataset, owned)?;
            commands::loot::loot(&session, &reward_id, &levels, json)?;
        }

        Commands::Bucket {
            reward_id,
            bucket,
            levels,
            json,
        } => {
            let session = Session::open(dataset, owned)?;
            commands::loot::bucket(&session, &reward_id, &bucket, &levels, json)?;
        }

        Commands::Gs { table_id, levels } => {
            let session = Session::open(dataset, owned)?;
            commands::loot::gear_score(&session, &table_id, &levels)?;
        }

        Commands::Owned { command } => {
            let mut session = Session::open(dataset, owned)?;
            commands::owned::handle(&mut session, command)?;
        }
    }

    Ok(())
}
