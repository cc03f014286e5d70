use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use forksync::{Config, Error, GitHubClient, GitRepo, SyncEngine};

#[derive(Parser)]
#[command(name = "forksync")]
#[command(about = "Fork a GitHub repository and keep the local clone in sync with its upstream parent")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (defaults to XDG config location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fork a repository, clone the fork and sync it with its parent
    Fork {
        /// Repository URL (HTTPS or SSH form)
        url: String,
    },

    /// Sync an existing local clone of a fork with its upstream parent
    Sync {
        /// Path to the local repository (defaults to the current directory)
        path: Option<PathBuf>,
    },

    /// Manage authentication
    Auth {
        #[command(subcommand)]
        auth_command: AuthCommands,
    },
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Test current authentication
    Test,

    /// Check whether a GitHub user exists
    User {
        /// Username to look up
        username: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;
    info!("Starting forksync v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(cli.config)?;

    let result = match cli.command {
        Commands::Fork { url } => cmd_fork(&url, &config).await,
        Commands::Sync { path } => cmd_sync(path, &config).await,
        Commands::Auth { auth_command } => cmd_auth(auth_command, &config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

/// Load configuration from specified path or default location
fn load_config(config_path: Option<PathBuf>) -> anyhow::Result<Config> {
    match config_path {
        Some(path) => Config::load(&path),
        None => Config::load_or_default(),
    }
}

/// Fork the repository, clone the fork and sync it
async fn cmd_fork(url: &str, config: &Config) -> Result<(), Error> {
    let github = GitHubClient::new(config).await?;
    let engine = SyncEngine::new(config.clone(), github);

    let report = engine.fork_and_sync(url).await?;

    println!("Synced {} with its upstream parent", report.path.display());
    if report.upstream_added {
        println!("   (upstream remote was added automatically)");
    }
    if !report.cloned {
        println!("   (existing clone reused)");
    }

    Ok(())
}

/// Sync an existing clone with its upstream parent
async fn cmd_sync(path: Option<PathBuf>, config: &Config) -> Result<(), Error> {
    let path = match path {
        Some(path) => path,
        None => std::env::current_dir()?,
    };

    let github = GitHubClient::new(config).await?;
    let engine = SyncEngine::new(config.clone(), github);

    let repo = GitRepo::new(path);
    let report = engine.sync(&repo).await?;

    println!("Synced {} with its upstream parent", report.path.display());
    if report.upstream_added {
        println!("   (upstream remote was added automatically)");
    }

    Ok(())
}

/// Handle authentication commands
async fn cmd_auth(auth_command: AuthCommands, config: &Config) -> Result<(), Error> {
    match auth_command {
        AuthCommands::Test => {
            let client = GitHubClient::new(config).await?;
            println!("Authentication successful");
            println!("   Username: {}", client.username());
        }
        AuthCommands::User { username } => {
            let client = GitHubClient::new(config).await?;
            if client.user_exists(&username).await {
                println!("User {} exists", username);
            } else {
                // A lookup failure and a missing user both land here
                println!("User {} was not found", username);
            }
        }
    }

    Ok(())
}
