//! Item grant: put one new item into a player's inbox
//!
//! The player is taken from the directory when resident, otherwise
//! loaded from storage for the duration of the grant. Offline players
//! are saved before the grant completes. The load and the save are
//! the only points where the grant waits on I/O.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{GrantError, GrantResult};
use crate::game::{GameContext, InsertFlags, Item, Player, SlotPosition};

/// How the recipient was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Residency {
    Resident,
    Loaded,
}

/// Recipient of a grant.
///
/// A resident player is shared with the directory and stays there.
/// A loaded player belongs to the grant and is dropped when it ends.
#[derive(Debug)]
pub enum ResolvedPlayer {
    Resident(Arc<RwLock<Player>>),
    Loaded(Box<Player>),
}

impl ResolvedPlayer {
    pub fn residency(&self) -> Residency {
        match self {
            ResolvedPlayer::Resident(_) => Residency::Resident,
            ResolvedPlayer::Loaded(_) => Residency::Loaded,
        }
    }
}

/// What a completed grant did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrantReceipt {
    pub recipient: String,
    pub item_uid: Uuid,
    pub item_type: u16,
    /// Inbox index the item landed at
    pub slot: usize,
    pub residency: Residency,
    /// Whether the player was written to storage
    pub saved: bool,
}

/// Find the recipient in the directory, loading them on a miss.
pub async fn resolve_player(ctx: &GameContext, recipient: &str) -> GrantResult<ResolvedPlayer> {
    if let Some(player) = ctx.directory.find_by_name(recipient) {
        return Ok(ResolvedPlayer::Resident(player));
    }

    debug!("{} is not resident, loading", recipient);
    match ctx.loader.load(recipient).await {
        Ok(Some(player)) => Ok(ResolvedPlayer::Loaded(Box::new(player))),
        Ok(None) => Err(GrantError::PlayerNotFound(recipient.to_string())),
        Err(e) => Err(GrantError::LoadFailed(e)),
    }
}

/// Grant one item of `item_type` to `recipient`.
///
/// The item goes in with no capacity limit at the default position.
/// Grants to the same recipient are serialized.
pub async fn add_item_to_player(
    ctx: &GameContext,
    recipient: &str,
    item_type: u16,
) -> GrantResult<GrantReceipt> {
    let result = grant(ctx, recipient, item_type).await;

    match &result {
        Ok(receipt) => info!(
            "Granted item {} ({}) to {} at slot {} ({:?}, saved: {})",
            receipt.item_type, receipt.item_uid, receipt.recipient, receipt.slot,
            receipt.residency, receipt.saved
        ),
        Err(e) => warn!("Grant of item {} to {} failed: {}", item_type, recipient, e),
    }

    result
}

async fn grant(ctx: &GameContext, recipient: &str, item_type: u16) -> GrantResult<GrantReceipt> {
    let _recipient_guard = ctx.lock_recipient(recipient).await;

    let resolved = resolve_player(ctx, recipient).await?;
    let residency = resolved.residency();

    let item = ctx
        .items
        .create(item_type)
        .ok_or(GrantError::InvalidItemType(item_type))?;

    match resolved {
        ResolvedPlayer::Resident(handle) => {
            // Held across the save so the stored inbox matches this grant
            let mut player = handle.write().await;
            deliver(ctx, &mut player, item, residency).await
        }
        ResolvedPlayer::Loaded(mut player) => deliver(ctx, &mut player, item, residency).await,
    }
}

async fn deliver(
    ctx: &GameContext,
    player: &mut Player,
    item: Item,
    residency: Residency,
) -> GrantResult<GrantReceipt> {
    let item_uid = item.uid;
    let item_type = item.type_id;

    let slot = ctx.inserter.insert(
        &mut player.inbox,
        item,
        SlotPosition::ANYWHERE,
        InsertFlags::NO_LIMIT,
    )?;

    let saved = if player.is_offline() {
        ctx.saver
            .save(player)
            .await
            .map_err(|source| GrantError::SaveFailed { residency, source })?;
        true
    } else {
        false
    };

    Ok(GrantReceipt {
        recipient: player.name.clone(),
        item_uid,
        item_type,
        slot,
        residency,
        saved,
    })
}
