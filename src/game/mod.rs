//! Game state shared by grant operations

use std::borrow::Cow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::config::GameConfig;
use crate::db::{DbPool, PlayerLoader, PlayerSaver, SqlitePlayerStore};

mod directory;
mod inbox;
mod item;
mod player;

pub use directory::PlayerDirectory;
pub use inbox::{DefaultInserter, Inbox, InboxInserter, InsertError, InsertFlags, SlotPosition};
pub use item::{CatalogItemFactory, Item, ItemFactory};
pub use player::{normalize_name, Player, PlayerStatus};

/// Everything a grant needs, passed explicitly to each operation
pub struct GameContext {
    pub directory: PlayerDirectory,
    pub loader: Arc<dyn PlayerLoader>,
    pub saver: Arc<dyn PlayerSaver>,
    pub items: Arc<dyn ItemFactory>,
    pub inserter: Arc<dyn InboxInserter>,
    /// One lock per recipient with a grant in flight
    grant_locks: DashMap<String, RecipientLock>,
}

impl GameContext {
    pub fn new(
        loader: Arc<dyn PlayerLoader>,
        saver: Arc<dyn PlayerSaver>,
        items: Arc<dyn ItemFactory>,
        inserter: Arc<dyn InboxInserter>,
    ) -> Self {
        Self {
            directory: PlayerDirectory::new(),
            loader,
            saver,
            items,
            inserter,
            grant_locks: DashMap::new(),
        }
    }

    /// Context backed by SQLite storage and the configured item catalog.
    pub fn from_config(config: &GameConfig, db: DbPool) -> Self {
        let store = Arc::new(SqlitePlayerStore::new(db));
        Self::new(
            store.clone(),
            store,
            Arc::new(CatalogItemFactory::new(config.items.clone())),
            Arc::new(DefaultInserter),
        )
    }

    /// Wait until no other grant is running for `name`, then hold it.
    ///
    /// Grants for the same recipient run one at a time so a directory miss
    /// and the following load cannot race with another grant's insertion.
    /// Cancelling the wait gives up the place in line.
    pub async fn lock_recipient<'a>(&'a self, name: &'a str) -> RecipientGuard<'a> {
        let key = normalize_name(name);
        let mutex = self.join_recipient(&key);
        // Registered before waiting so a dropped wait still leaves the line
        let ticket = RecipientTicket {
            locks: &self.grant_locks,
            key,
        };
        let guard = mutex.lock_owned().await;
        RecipientGuard {
            _guard: guard,
            _ticket: ticket,
        }
    }

    /// Count one more user of the recipient's lock, creating it if needed.
    /// Only a recipient with no grant in flight costs an allocation.
    fn join_recipient(&self, key: &str) -> Arc<Mutex<()>> {
        if let Some(lock) = self.grant_locks.get(key) {
            lock.users.fetch_add(1, Ordering::SeqCst);
            return lock.mutex.clone();
        }
        let lock = self.grant_locks.entry(key.to_string()).or_default();
        lock.users.fetch_add(1, Ordering::SeqCst);
        lock.mutex.clone()
    }

    /// Recipients that currently have a grant holding or waiting on the lock
    pub fn pending_recipients(&self) -> usize {
        self.grant_locks.len()
    }
}

/// Lock for one recipient and the number of grants holding or waiting on it.
/// `users` only changes under the map's shard lock.
#[derive(Debug, Default)]
struct RecipientLock {
    mutex: Arc<Mutex<()>>,
    users: AtomicUsize,
}

/// A place in line for a recipient. The last one out removes the lock.
struct RecipientTicket<'a> {
    locks: &'a DashMap<String, RecipientLock>,
    key: Cow<'a, str>,
}

impl Drop for RecipientTicket<'_> {
    fn drop(&mut self) {
        self.locks
            .remove_if(&*self.key, |_, lock| lock.users.fetch_sub(1, Ordering::SeqCst) == 1);
    }
}

/// Held for the duration of one grant.
pub struct RecipientGuard<'a> {
    // Released before the ticket is given back
    _guard: OwnedMutexGuard<()>,
    _ticket: RecipientTicket<'a>,
}
