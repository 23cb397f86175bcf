//! mint-registry: upload a collection manifest into an on-chain registry
//!
//! ## Commands
//!
//! - **upload**: initialize the registry (once) and write every pending item
//! - **verify**: re-read the registry account and compare it with the cache
//! - **show**: print the cache state
//!
//! ## Example Usage
//!
//! ```bash
//! # Upload to devnet, resuming from .cache/devnet-temp.json if present
//! mint-registry --env devnet upload --manifest items.json --config collection.json
//!
//! # Verify the uploaded lines
//! mint-registry --env devnet verify
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod registry_cli;

use registry_cli::{show::ShowCmd, upload::UploadCmd, verify::VerifyCmd, CliContext};

#[derive(Parser)]
#[command(
    name = "mint-registry",
    author,
    version,
    about = "Upload and verify on-chain collection registries",
    long_about = "Provisions a fixed-size collection registry, uploads item records in \
                  resumable batches, and verifies what the ledger stored."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the .cache folder
    #[arg(long, global = true, default_value = ".")]
    cache: PathBuf,

    /// Cache file name inside .cache (without cluster prefix)
    #[arg(long, global = true, default_value = "temp")]
    cache_name: String,

    /// Cluster: mainnet-beta, devnet or testnet
    #[arg(long, short, global = true, default_value = "devnet")]
    env: String,

    /// Custom RPC endpoint (overrides --env and MINT_RPC_URL)
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Keypair file (default: MINT_KEYPAIR, then ~/.config/solana/id.json)
    #[arg(long, short, global = true)]
    keypair: Option<PathBuf>,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (debug logging)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the registry if needed and upload pending items
    Upload(UploadCmd),

    /// Compare the registry account against the cache
    Verify(VerifyCmd),

    /// Show cache status
    Show(ShowCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        command,
        cache,
        cache_name,
        env,
        rpc_url,
        keypair,
        json,
        verbose,
    } = Cli::parse();

    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let ctx = CliContext {
        cache_root: cache,
        cache_name,
        cluster: env,
        rpc_url,
        keypair,
        json,
    };

    match command {
        Commands::Upload(cmd) => cmd.execute(&ctx).await,
        Commands::Verify(cmd) => cmd.execute(&ctx).await,
        Commands::Show(cmd) => cmd.execute(&ctx),
    }
}
