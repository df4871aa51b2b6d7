//! Mappings lookup bot
//!
//! Answers prefix commands such as `!mcp`, `!mcpm` and `!mcpf` with the
//! names a symbol carries across obfuscated, intermediate and human-readable
//! mapping sets, and remembers a default version per guild.

mod config;
mod context;
mod errors;
mod handlers;
mod health;
mod paginator;
mod registry;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use mappings_command::{CatalogDownloader, CommandFamily, MappingDownloader};
use serenity::model::gateway::GatewayIntents;
use serenity::prelude::*;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::handlers::Handler;
use crate::health::{AppState, CatalogSummary};
use crate::registry::CommandRegistry;

/// Mappings lookup bot CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/mappings-bot.toml")]
    config: String,

    /// Discord bot token (overrides config file)
    #[arg(long, env = "DISCORD_BOT_TOKEN")]
    bot_token: Option<String>,

    /// Directory holding `<version>.json` mapping catalogs (overrides config file)
    #[arg(long, env = "MAPPINGS_CATALOG_DIR")]
    catalog_dir: Option<PathBuf>,

    /// Directory for per-guild default versions (overrides config file)
    #[arg(long, env = "MAPPINGS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Health check server port
    #[arg(long, env = "HEALTH_CHECK_PORT", default_value = "3001")]
    health_port: u16,
}

impl Args {
    fn apply_to(&self, config: &mut Config) {
        if let Some(bot_token) = &self.bot_token {
            config.discord.bot_token = bot_token.clone();
        }
        if let Some(catalog_dir) = &self.catalog_dir {
            config.mappings.catalog_dir = catalog_dir.clone();
        }
        if let Some(data_dir) = &self.data_dir {
            config.storage.data_dir = data_dir.clone();
        }
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                warn!("SIGTERM handler unavailable: {}", e);
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.ok();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mappings_bot=debug,mappings_command=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting mappings bot");

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut config = if std::path::Path::new(&args.config).exists() {
        info!("Loading config from file: {}", args.config);
        Config::from_file(&args.config)?
    } else {
        info!("Config file not found, loading from environment");
        Config::from_env()?
    };
    args.apply_to(&mut config);

    let downloader = CatalogDownloader::open(
        config.mappings.catalog_dir.clone(),
        config.mappings.latest_version.clone(),
    )?;
    info!(
        "Loaded mapping catalogs from {} (latest {})",
        config.mappings.catalog_dir.display(),
        downloader.latest_version()
    );

    let catalog = CatalogSummary::of(&downloader);

    let family = CommandFamily::new(
        config.mappings.name.clone(),
        config.mappings.prefix.clone(),
        config.mappings.color,
        Arc::new(downloader),
    );
    let root = family.root();

    let data_dir = config.storage.data_dir.clone();
    let registry = Arc::new(CommandRegistry::new(
        config.discord.command_prefix.clone(),
        &root,
        data_dir.clone(),
    ));
    root.initialize(&registry.persistence, &data_dir)
        .with_context(|| format!("Failed to load default versions from {}", data_dir.display()))?;

    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILDS;

    let mut client = Client::builder(&config.discord.bot_token, intents)
        .event_handler(Handler)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create Discord client: {}", e))?;

    let health_state = AppState::new(registry.names(), catalog);

    {
        let mut data = client.data.write().await;
        data.insert::<CommandRegistry>(registry.clone());
        data.insert::<AppState>(health_state.clone());
    }

    // Start health check server
    let health_port = args.health_port;
    tokio::spawn(async move {
        if let Err(e) = health::start_health_server(health_state, health_port).await {
            error!("Health server error: {}", e);
        }
    });

    // Graceful shutdown: close all shards on SIGTERM or Ctrl+C.
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, stopping Discord client...");
        shard_manager.shutdown_all().await;
    });

    info!("Starting Discord gateway connection...");

    // Start the Discord client (blocks until all shards are stopped)
    client
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Discord client error: {}", e))?;

    if let Err(e) = root.persist(&registry.persistence, &data_dir).await {
        error!("Failed to save default versions on shutdown: {:#}", e);
    }

    info!("Mappings bot stopped");
    Ok(())
}
