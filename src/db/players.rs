//! Player and inbox database operations

use sqlx::FromRow;
use super::DbPool;

/// Player record from database
#[derive(Debug, Clone, FromRow)]
pub struct PlayerRecord {
    pub id: i64,
    pub name: String,
    pub inbox_capacity: i64,
}

/// Inbox item record from database
#[derive(Debug, Clone, FromRow)]
pub struct InboxItemRecord {
    pub uid: String,
    pub slot: i64,
    pub item_type: i64,
    pub name: String,
    pub granted_at: String,
}

/// Row to write when replacing an inbox
#[derive(Debug, Clone)]
pub struct NewInboxItem {
    pub uid: String,
    pub item_type: i64,
    pub name: String,
    pub granted_at: String,
}

/// Create a new player with an empty inbox.
/// Returns the new player ID.
pub async fn create_player(
    pool: &DbPool,
    name: &str,
    inbox_capacity: i64,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO players (name, inbox_capacity)
        VALUES (?, ?)
        "#,
    )
    .bind(name)
    .bind(inbox_capacity)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Find a player by (lowercase) name.
pub async fn find_player_by_name(
    pool: &DbPool,
    name: &str,
) -> Result<Option<PlayerRecord>, sqlx::Error> {
    sqlx::query_as::<_, PlayerRecord>(
        r#"
        SELECT id, name, inbox_capacity
        FROM players
        WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await
}

/// Get inbox items for a player in slot order.
pub async fn get_inbox_items(
    pool: &DbPool,
    player_id: i64,
) -> Result<Vec<InboxItemRecord>, sqlx::Error> {
    sqlx::query_as::<_, InboxItemRecord>(
        r#"
        SELECT uid, slot, item_type, name, granted_at
        FROM inbox_items
        WHERE player_id = ?
        ORDER BY slot ASC
        "#,
    )
    .bind(player_id)
    .fetch_all(pool)
    .await
}

/// Store a player and replace their whole inbox in one transaction.
/// Creates the player row if it does not exist yet.
/// Returns the player ID.
pub async fn replace_inbox(
    pool: &DbPool,
    name: &str,
    inbox_capacity: i64,
    items: &[NewInboxItem],
) -> Result<i64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO players (name, inbox_capacity)
        VALUES (?, ?)
        ON CONFLICT(name) DO UPDATE
        SET inbox_capacity = excluded.inbox_capacity, updated_at = datetime('now')
        "#,
    )
    .bind(name)
    .bind(inbox_capacity)
    .execute(&mut *tx)
    .await?;

    let (player_id,): (i64,) = sqlx::query_as(
        r#"
        SELECT id FROM players WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        DELETE FROM inbox_items WHERE player_id = ?
        "#,
    )
    .bind(player_id)
    .execute(&mut *tx)
    .await?;

    for (slot, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO inbox_items (uid, player_id, slot, item_type, name, granted_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.uid)
        .bind(player_id)
        .bind(slot as i64)
        .bind(item.item_type)
        .bind(&item.name)
        .bind(&item.granted_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(player_id)
}
