//! # Folio CLI (`folio`)
//!
//! The `folio` binary drives the portfolio knowledge-base service. It
//! provides commands for database initialization, demo seeding, the HTTP
//! server, and one-shot search/chat from the terminal.
//!
//! ## Usage
//!
//! ```bash
//! folio --config ./config/folio.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `folio init` | Create the SQLite database and run schema migrations |
//! | `folio seed` | Populate the demo portfolio content |
//! | `folio serve` | Start the HTTP API and conversational endpoint |
//! | `folio search "<query>"` | Run the cross-entity union search |
//! | `folio chat "<message>"` | Run one conversational turn |
//! | `folio tools` | List the registered tool catalogue |

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use folio::agent;
use folio::config::load_config;
use folio::migrate;
use folio::query;
use folio::seed;
use folio::server;
use folio::store::Store;
use folio::tools::{ToolContext, ToolRegistry};

/// Folio CLI — a portfolio knowledge-base server with a tool-orchestrated
/// conversational assistant.
#[derive(Parser)]
#[command(
    name = "folio",
    about = "Folio — a portfolio knowledge-base server with a conversational assistant",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/folio.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and all entity tables. Idempotent —
    /// running it multiple times is safe.
    Init,

    /// Populate the demo portfolio dataset.
    ///
    /// Seeds every entity kind. Tables that already hold rows are left
    /// untouched, so reruns never duplicate content.
    Seed,

    /// Start the HTTP API and conversational endpoint.
    Serve,

    /// Search the portfolio across projects, skills, experience, and
    /// contributions.
    Search {
        /// The search query string.
        query: String,
    },

    /// Ask the conversational assistant one question.
    Chat {
        /// The message to send.
        message: String,
    },

    /// List the registered tool catalogue with parameter schemas.
    Tools,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let store = Store::connect(&config).await?;
            migrate::run_migrations(store.pool()).await?;
            println!("Database initialized at {}", config.db.path.display());
        }
        Commands::Seed => {
            let store = Store::connect(&config).await?;
            migrate::run_migrations(store.pool()).await?;
            seed::run_seed(&store, &config).await?;
            println!("Seed complete.");
        }
        Commands::Serve => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| "folio=info,tower_http=info".into()),
                )
                .init();
            server::run_server(&config).await?;
        }
        Commands::Search { query } => {
            let store = Store::connect(&config).await?;
            let hits = query::portfolio_search(&store, &query).await?;
            if hits.is_empty() {
                println!("No results.");
            } else {
                for (i, hit) in hits.iter().enumerate() {
                    println!(
                        "{}. [{}] {} — {}",
                        i + 1,
                        hit.kind,
                        hit.name,
                        hit.description.as_deref().unwrap_or("")
                    );
                }
            }
        }
        Commands::Chat { message } => {
            let store = Store::connect(&config).await?;
            let registry = ToolRegistry::with_builtins();
            let config = Arc::new(config);
            let ctx = ToolContext::new(store, config.clone());
            let provider = agent::create_provider(&config.agent);
            let answer = agent::respond(
                provider.as_ref(),
                &registry,
                &ctx,
                &config.agent,
                &config.owner,
                &message,
                &[],
            )
            .await?;
            println!("{}", answer);
        }
        Commands::Tools => {
            let registry = ToolRegistry::with_builtins();
            println!("{:<24} DESCRIPTION", "TOOL");
            for tool in registry.tools() {
                println!("{:<24} {}", tool.name(), tool.description());
            }
        }
    }

    Ok(())
}
