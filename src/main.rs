//! # BloomHub CLI (`bloom`)
//!
//! The `bloom` binary runs the BloomHub server and offers one-off searches
//! and account management from the command line.
//!
//! ## Usage
//!
//! ```bash
//! bloom --config ./config/bloom.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `bloom init` | Create the SQLite database and run schema migrations |
//! | `bloom sources` | List the data sources and whether they are configured |
//! | `bloom search "<query>"` | Search every source and print the composite JSON |
//! | `bloom user add` | Create an account |
//! | `bloom serve` | Start the HTTP server |
//!
//! Logs go to stderr and are filtered with `RUST_LOG` (default
//! `bloomhub=info,tower_http=info,warn`).
//! A `.env` file in the working directory is loaded first, so API keys and
//! `SECRET_KEY` can live there.

use bloomhub::{auth, config, migrate, search, server, sources};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// BloomHub CLI: flower search across botanical, image, and encyclopedia
/// sources.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/bloom.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "bloom",
    about = "BloomHub: flower search across botanical, image, and encyclopedia sources",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/bloom.toml`.
    #[arg(long, global = true, default_value = "./config/bloom.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the users and sessions tables.
    /// Running it more than once is safe.
    Init,

    /// List the data sources and whether each has its API key.
    Sources,

    /// Search for a flower.
    ///
    /// Runs the full pipeline (normalize, classify, fan out, merge) once
    /// and prints the composite result as JSON. Queries that are too short
    /// or not about flowers print suggestions and exit non-zero.
    Search {
        /// Free-text flower name, e.g. "peonías".
        query: String,
    },

    /// Manage accounts.
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Start the HTTP server on `[server].bind`.
    Serve,
}

#[derive(Subcommand)]
enum UserAction {
    /// Create an account.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bloomhub=info,tower_http=info,warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Sources => {
            sources::list_sources(&cfg)?;
        }
        Commands::Search { query } => {
            search::run_search(&cfg, &query).await?;
        }
        Commands::User {
            action:
                UserAction::Add {
                    name,
                    email,
                    password,
                },
        } => {
            auth::run_user_add(&cfg, &name, &email, &password).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
