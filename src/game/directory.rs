//! In-memory registry of resident players

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;

use super::{normalize_name, Player, PlayerStatus};

/// Resident players keyed by lowercase name
#[derive(Debug, Default)]
pub struct PlayerDirectory {
    players: DashMap<String, Arc<RwLock<Player>>>,
}

impl PlayerDirectory {
    pub fn new() -> Self {
        Self {
            players: DashMap::new(),
        }
    }

    /// Get a resident player by name
    pub fn find_by_name(&self, name: &str) -> Option<Arc<RwLock<Player>>> {
        let key = normalize_name(name);
        self.players.get(&*key).map(|r| r.value().clone())
    }

    /// Make a player resident, returning whoever held the name before
    pub fn insert(&self, player: Player) -> Option<Arc<RwLock<Player>>> {
        let key = player.name.clone();
        self.players.insert(key, Arc::new(RwLock::new(player)))
    }

    /// Evict a player from memory
    pub fn remove(&self, name: &str) -> Option<Arc<RwLock<Player>>> {
        let key = normalize_name(name);
        self.players.remove(&*key).map(|(_, player)| player)
    }

    /// Update a resident player's status. Returns false if not resident.
    pub async fn set_status(&self, name: &str, status: PlayerStatus) -> bool {
        let Some(player) = self.find_by_name(name) else {
            return false;
        };
        player.write().await.status = status;
        true
    }

    pub fn names(&self) -> Vec<String> {
        self.players.iter().map(|r| r.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_is_case_insensitive() {
        let directory = PlayerDirectory::new();
        directory.insert(Player::new("Bob", 10));

        let found = directory.find_by_name("BOB").expect("bob is resident");
        assert_eq!(found.read().await.name, "bob");
        assert!(directory.find_by_name("ana").is_none());
    }

    #[tokio::test]
    async fn test_insert_replaces_previous() {
        let directory = PlayerDirectory::new();
        assert!(directory.insert(Player::new("bob", 10)).is_none());

        let previous = directory.insert(Player::new("bob", 30)).expect("bob was resident");
        assert_eq!(previous.read().await.inbox.capacity(), 10);
        assert_eq!(directory.len(), 1);
    }

    #[tokio::test]
    async fn test_set_status_and_remove() {
        let directory = PlayerDirectory::new();
        directory.insert(Player::new("bob", 10));

        assert!(directory.set_status("Bob", PlayerStatus::Online).await);
        let bob = directory.find_by_name("bob").unwrap();
        assert!(bob.read().await.is_online());

        assert!(!directory.set_status("ghost", PlayerStatus::Online).await);

        assert!(directory.remove("BOB").is_some());
        assert!(directory.is_empty());
        assert!(directory.names().is_empty());
    }
}
