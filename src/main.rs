//! Grant server command line
//!
//! Grants items to players stored in the server database.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use inbox_grant::config::GameConfig;
use inbox_grant::constants::DEFAULT_CONFIG_DIR;
use inbox_grant::db;
use inbox_grant::game::{normalize_name, GameContext};
use inbox_grant::service::GrantService;

#[derive(Parser)]
#[command(name = "inbox-grant", version, about = "Grant items into player inboxes")]
struct Cli {
    /// Directory holding server.toml and items.toml
    #[arg(long, default_value = DEFAULT_CONFIG_DIR)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Grant one item to a player
    Grant { recipient: String, item_type: u16 },
    /// Register a player with an empty inbox
    CreatePlayer {
        name: String,
        /// Inbox capacity (defaults to grants.default_inbox_capacity)
        #[arg(long)]
        capacity: Option<usize>,
    },
    /// Print a player's inbox as JSON
    Inbox { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = GameConfig::load(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config))?;

    // Config sets the default level, RUST_LOG overrides it
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.logging.level));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting inbox-grant v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded {} item types", config.items.len());

    let pool = db::create_pool(&config.server.server.database_url()).await?;
    db::init_database(&pool).await?;
    info!("Database initialized");

    match cli.command {
        Command::Grant { recipient, item_type } => {
            let ctx = Arc::new(GameContext::from_config(&config, pool));
            let service = GrantService::spawn(ctx, config.server.grants.queue_size);

            let result = service.handle().grant(recipient, item_type).await;
            service.shutdown().await;

            let receipt = result?;
            println!("{}", serde_json::to_string_pretty(&receipt)?);
        }
        Command::CreatePlayer { name, capacity } => {
            let capacity = capacity.unwrap_or(config.server.grants.default_inbox_capacity);
            let name = normalize_name(&name);
            let id = db::create_player(&pool, &name, i64::try_from(capacity)?).await?;
            info!("Created player {} (id {})", name, id);
        }
        Command::Inbox { name } => {
            let player = db::load_player_by_name(&pool, &name)
                .await?
                .with_context(|| format!("player {} not found", name))?;
            println!("{}", serde_json::to_string_pretty(&player)?);
        }
    }

    Ok(())
}
