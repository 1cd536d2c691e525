//! Database layer for the grant server
//!
//! Uses SQLite with sqlx. Grants only see it through the
//! [`PlayerLoader`] and [`PlayerSaver`] traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::constants::*;
use crate::game::{normalize_name, Inbox, Item, Player, PlayerStatus};

mod players;

pub use players::*;

/// Database connection pool type.
pub type DbPool = SqlitePool;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt record for player {player}: {reason}")]
    Corrupt { player: String, reason: String },
}

/// Loads players that are not resident in memory.
#[async_trait]
pub trait PlayerLoader: Send + Sync {
    /// `Ok(None)` means no such player exists.
    async fn load(&self, name: &str) -> Result<Option<Player>, StorageError>;
}

/// Persists a player's state, inbox included.
#[async_trait]
pub trait PlayerSaver: Send + Sync {
    async fn save(&self, player: &Player) -> Result<(), StorageError>;
}

/// Create a database connection pool.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(DB_MAX_CONNECTIONS)
        .acquire_timeout(Duration::from_secs(DB_ACQUIRE_TIMEOUT_SECS))
        .idle_timeout(Duration::from_secs(DB_IDLE_TIMEOUT_SECS))
        .connect(database_url)
        .await
}

/// Initialize the database schema.
pub async fn init_database(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Load a player and their inbox. Loaded players are always offline.
pub async fn load_player_by_name(
    pool: &DbPool,
    name: &str,
) -> Result<Option<Player>, StorageError> {
    let name = normalize_name(name);
    let record = match find_player_by_name(pool, &name).await? {
        Some(record) => record,
        None => return Ok(None),
    };

    let rows = get_inbox_items(pool, record.id).await?;
    let items = rows
        .into_iter()
        .map(|row| item_from_record(&record.name, row))
        .collect::<Result<Vec<_>, _>>()?;

    let capacity = usize::try_from(record.inbox_capacity).map_err(|_| StorageError::Corrupt {
        player: record.name.clone(),
        reason: format!("negative inbox capacity {}", record.inbox_capacity),
    })?;

    debug!("Loaded player {} with {} inbox items", record.name, items.len());

    Ok(Some(Player {
        id: Some(record.id),
        name: record.name,
        status: PlayerStatus::Offline,
        inbox: Inbox::with_items(items, capacity),
    }))
}

/// Write a player's inbox. Returns the player ID.
pub async fn save_player(pool: &DbPool, player: &Player) -> Result<i64, StorageError> {
    let items: Vec<NewInboxItem> = player
        .inbox
        .items()
        .iter()
        .map(|item| NewInboxItem {
            uid: item.uid.to_string(),
            item_type: i64::from(item.type_id),
            name: item.name.clone(),
            granted_at: item.granted_at.to_rfc3339(),
        })
        .collect();

    let capacity = i64::try_from(player.inbox.capacity()).unwrap_or(i64::MAX);
    let player_id = replace_inbox(pool, &player.name, capacity, &items).await?;

    debug!("Saved player {} with {} inbox items", player.name, items.len());
    Ok(player_id)
}

fn item_from_record(player: &str, row: InboxItemRecord) -> Result<Item, StorageError> {
    let corrupt = |reason: String| StorageError::Corrupt {
        player: player.to_string(),
        reason,
    };

    let uid = Uuid::parse_str(&row.uid)
        .map_err(|e| corrupt(format!("bad item uid {}: {}", row.uid, e)))?;
    let type_id = u16::try_from(row.item_type)
        .map_err(|_| corrupt(format!("item type {} out of range", row.item_type)))?;
    let granted_at = DateTime::parse_from_rfc3339(&row.granted_at)
        .map_err(|e| corrupt(format!("bad timestamp {}: {}", row.granted_at, e)))?
        .with_timezone(&Utc);

    Ok(Item {
        uid,
        type_id,
        name: row.name,
        granted_at,
    })
}

/// SQLite-backed loader and saver
#[derive(Debug, Clone)]
pub struct SqlitePlayerStore {
    pool: DbPool,
}

impl SqlitePlayerStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl PlayerLoader for SqlitePlayerStore {
    async fn load(&self, name: &str) -> Result<Option<Player>, StorageError> {
        load_player_by_name(&self.pool, name).await
    }
}

#[async_trait]
impl PlayerSaver for SqlitePlayerStore {
    async fn save(&self, player: &Player) -> Result<(), StorageError> {
        save_player(&self.pool, player).await.map(|_| ())
    }
}
