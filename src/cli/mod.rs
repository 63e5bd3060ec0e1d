//! # Command Line Interface
//!
//! Runs the API server and bootstraps identities directly in the store.
//! The session commands drive the client session cache from a terminal.

pub mod session;
pub mod user;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::api::{start_api_server, ApiState};
use crate::config::{AppConfig, DatabaseConfig};
use crate::observability::{init_observability, log_config_info};
use crate::storage::{check_connection, create_pool};
use crate::{APP_NAME, VERSION};

#[derive(Parser)]
#[command(name = "classgate")]
#[command(about = "Authentication and session service for the classroom dashboards")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database URL override
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// Base URL for the classgate API
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server
    Serve,

    /// Identity administration against the local store
    User {
        #[command(subcommand)]
        command: user::UserCommands,
    },

    /// Log in and remember the session token
    Login(session::LoginArgs),

    /// Show the identity behind the remembered token
    Whoami,

    /// Forget the remembered session token
    Logout,
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => serve(cli.database_url).await?,
        Commands::User { command } => {
            initialise_logging(cli.verbose);
            let mut database = DatabaseConfig::from_env()?;
            if let Some(url) = cli.database_url {
                database.url = url;
            }
            user::handle_user_command(command, &database).await?
        }
        Commands::Login(args) => {
            initialise_logging(cli.verbose);
            session::handle_login(args, cli.base_url).await?
        }
        Commands::Whoami => {
            initialise_logging(cli.verbose);
            session::handle_whoami(cli.base_url).await?
        }
        Commands::Logout => {
            initialise_logging(cli.verbose);
            session::handle_logout(cli.base_url).await?
        }
    }

    Ok(())
}

async fn serve(database_url: Option<String>) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env().context("Failed to load configuration")?;
    if let Some(url) = database_url {
        config.database.url = url;
    }

    init_observability(&config.observability)?;
    info!(app_name = APP_NAME, version = VERSION, "Starting classgate");
    log_config_info(&config);

    let pool = create_pool(&config.database).await?;
    check_connection(&pool).await?;
    let state = ApiState::from_pool(pool, &config.auth);
    info!(
        resolution = %state.auth_service.resolution(),
        "Authentication service ready"
    );

    start_api_server(&config.server, state).await?;
    Ok(())
}

fn initialise_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Subscriber may already be set elsewhere (e.g. integration tests); ignore.
    let _ = tracing::subscriber::set_global_default(
        FmtSubscriber::builder().with_env_filter(filter).with_writer(std::io::stderr).finish(),
    );
}
