use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use koyn::api::{self, AppState};
use koyn::config::AppConfig;
use koyn::db::Database;
use koyn::exchange::RestExchangeClient;
use koyn::news::{NewsCollector, NewsRepository};

fn main() {
    if let Err(err) = try_main() {
        let _ = writeln!(io::stderr(), "{err:?}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.common)?;

    match cli.command {
        Command::Serve => run_serve(cli.common),
        Command::Config { command } => match command {
            ConfigCommand::Show => show_config(&cli.common),
        },
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about = "Koyn - crypto community backend server.")]
struct Cli {
    #[command(flatten)]
    common: CommonOpts,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Args)]
struct CommonOpts {
    /// Override the config file path
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Reduce output to only errors
    #[arg(short, long, action = clap::ArgAction::SetTrue, global = true)]
    quiet: bool,
    /// Increase logging verbosity (stackable)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Print the resolved configuration (secrets redacted)
    Show,
}

fn init_logging(opts: &CommonOpts) -> Result<()> {
    let default_filter = if opts.quiet {
        "koyn=warn"
    } else {
        match opts.verbose {
            0 => "koyn=info,tower_http=info",
            1 => "koyn=debug,tower_http=debug",
            _ => "koyn=trace,tower_http=trace",
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("initializing logging: {e}"))?;

    Ok(())
}

fn show_config(opts: &CommonOpts) -> Result<()> {
    let config = AppConfig::load(opts.config.as_deref())?;
    println!("{}", config.to_redacted_toml()?);
    Ok(())
}

#[tokio::main]
async fn run_serve(opts: CommonOpts) -> Result<()> {
    let config = AppConfig::load(opts.config.as_deref())?;

    config
        .auth
        .validate()
        .context("invalid auth configuration")?;
    let secret = config
        .auth
        .resolve_secret()?
        .context("auth.secret is required")?;

    let db = Database::new(&config.database.path).await?;

    let exchange_client = Arc::new(RestExchangeClient::new(&config.exchange));
    let state = AppState::new(config.clone(), &db, &secret, exchange_client);

    if config.news.enabled {
        NewsCollector::new(NewsRepository::new(db.pool().clone()), config.news.clone()).spawn();
    }

    let environment =
        std::env::var("KOYN_ENV").unwrap_or_else(|_| "development".to_string());
    let startup_notifier = state.notifier.clone();
    let startup_env = environment.clone();
    tokio::spawn(async move {
        startup_notifier.notify_startup(&startup_env).await;
    });

    let notifier = state.notifier.clone();
    let router = api::create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("parsing server address")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("listening on {addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    notifier.notify_shutdown(&environment).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
}
