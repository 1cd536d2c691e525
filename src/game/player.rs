//! Player state held in memory while a player is resident or being granted to

use std::borrow::Cow;

use serde::Serialize;

use super::Inbox;

/// Whether the player currently has a live session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    Online,
    Offline,
}

/// A player and the inbox that receives granted items
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    /// Database row id, `None` until the player has been stored once
    pub id: Option<i64>,
    pub name: String,
    pub status: PlayerStatus,
    pub inbox: Inbox,
}

impl Player {
    /// Create an offline player with an empty inbox.
    pub fn new(name: &str, inbox_capacity: usize) -> Self {
        Self {
            id: None,
            name: normalize_name(name).into_owned(),
            status: PlayerStatus::Offline,
            inbox: Inbox::new(inbox_capacity),
        }
    }

    pub fn is_online(&self) -> bool {
        self.status == PlayerStatus::Online
    }

    pub fn is_offline(&self) -> bool {
        self.status == PlayerStatus::Offline
    }
}

/// Player names are case-insensitive and stored lowercase.
///
/// Names that are already lowercase are borrowed, so lookups of
/// well-formed names never allocate.
pub fn normalize_name(name: &str) -> Cow<'_, str> {
    if name.chars().any(char::is_uppercase) {
        Cow::Owned(name.to_lowercase())
    } else {
        Cow::Borrowed(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_is_offline_and_lowercase() {
        let player = Player::new("Bob", 5);
        assert_eq!(player.name, "bob");
        assert!(player.is_offline());
        assert!(!player.is_online());
        assert!(player.inbox.is_empty());
        assert_eq!(player.inbox.capacity(), 5);
    }

    #[test]
    fn test_normalize_name_borrows_lowercase() {
        assert!(matches!(normalize_name("ana"), Cow::Borrowed("ana")));
        assert_eq!(normalize_name("AnA"), "ana");
    }
}
