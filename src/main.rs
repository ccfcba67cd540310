//! # Codesearch CLI
//!
//! The `codesearch` binary serves the semantic code-search index over HTTP
//! and offers a one-off embedding command for debugging provider setup.
//!
//! ## Usage
//!
//! ```bash
//! codesearch --config ./config/codesearch.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `codesearch serve` | Start the HTTP server |
//! | `codesearch embed "<code>"` | Embed one string and print the vector |
//!
//! ## Examples
//!
//! ```bash
//! # Serve the index
//! codesearch serve --config ./config/codesearch.toml
//!
//! # Check the embedding provider end to end
//! codesearch embed "def handle(request): ..." --config ./config/codesearch.toml
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use codesearch::{config, embedding, server};

/// Codesearch — a semantic code-search index.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file with `[embedding]`, `[index]`, `[search]`, and `[server]` sections.
#[derive(Parser)]
#[command(
    name = "codesearch",
    about = "Semantic code search: embed snippets, replace per file, query by similarity",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/codesearch.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Binds to the address configured in `[server].bind` and serves
    /// `/healthz`, `/embed`, `/index`, and `/search`.
    Serve,

    /// Embed a single code string and print the vector as JSON.
    ///
    /// Useful for verifying provider credentials and model configuration
    /// without going through the server.
    Embed {
        /// The code string to embed.
        code: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Embed { code } => {
            let embedder = embedding::create_embedder(&cfg.embedding)?;
            let vector = embedding::embed_one(embedder.as_ref(), &code).await?;
            println!("{}", serde_json::to_string(&vector)?);
        }
    }

    Ok(())
}
