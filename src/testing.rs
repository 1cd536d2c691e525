//! Fakes for the grant collaborators, shared by unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::{ItemCatalog, ItemDefinition};
use crate::db::{PlayerLoader, PlayerSaver, StorageError};
use crate::game::{
    CatalogItemFactory, DefaultInserter, GameContext, Inbox, InboxInserter, InsertError,
    InsertFlags, Item, ItemFactory, Player, PlayerStatus, SlotPosition,
};

/// Ordered record of collaborator calls across all fakes
#[derive(Debug, Default)]
pub struct Journal(Mutex<Vec<String>>);

impl Journal {
    pub fn record(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// In-memory stand-in for the player database
pub struct FakeStore {
    players: Mutex<HashMap<String, Player>>,
    journal: Arc<Journal>,
    pub load_calls: AtomicUsize,
    pub save_calls: AtomicUsize,
    pub fail_loads: AtomicBool,
    pub fail_saves: AtomicBool,
    /// Make the load blow up, killing the task running the grant
    pub panic_loads: AtomicBool,
}

impl FakeStore {
    pub fn stored(&self, name: &str) -> Option<Player> {
        self.players.lock().unwrap().get(name).cloned()
    }

    pub fn put(&self, player: Player) {
        self.players.lock().unwrap().insert(player.name.clone(), player);
    }
}

fn storage_failure() -> StorageError {
    StorageError::Database(sqlx::Error::PoolClosed)
}

#[async_trait]
impl PlayerLoader for FakeStore {
    async fn load(&self, name: &str) -> Result<Option<Player>, StorageError> {
        self.journal.record(format!("load:{}", name));
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        // Give concurrent grants a chance to interleave
        tokio::task::yield_now().await;
        if self.panic_loads.load(Ordering::SeqCst) {
            panic!("storage backend crashed while loading {}", name);
        }
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(storage_failure());
        }
        Ok(self.stored(&name.to_lowercase()).map(|mut player| {
            player.status = PlayerStatus::Offline;
            player
        }))
    }
}

#[async_trait]
impl PlayerSaver for FakeStore {
    async fn save(&self, player: &Player) -> Result<(), StorageError> {
        self.journal.record(format!("save:{}", player.name));
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(storage_failure());
        }
        self.put(player.clone());
        Ok(())
    }
}

/// Catalog factory that counts and journals calls
pub struct CountingFactory {
    inner: CatalogItemFactory,
    journal: Arc<Journal>,
    pub create_calls: AtomicUsize,
}

impl ItemFactory for CountingFactory {
    fn create(&self, item_type: u16) -> Option<Item> {
        self.journal.record(format!("create:{}", item_type));
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.create(item_type)
    }
}

/// Default inserter that remembers the position and flags it was given
pub struct RecordingInserter {
    journal: Arc<Journal>,
    calls: Mutex<Vec<(SlotPosition, InsertFlags)>>,
}

impl RecordingInserter {
    pub fn calls(&self) -> Vec<(SlotPosition, InsertFlags)> {
        self.calls.lock().unwrap().clone()
    }
}

impl InboxInserter for RecordingInserter {
    fn insert(
        &self,
        inbox: &mut Inbox,
        item: Item,
        position: SlotPosition,
        flags: InsertFlags,
    ) -> Result<usize, InsertError> {
        self.journal.record(format!("insert:{}", item.type_id));
        self.calls.lock().unwrap().push((position, flags));
        DefaultInserter.insert(inbox, item, position, flags)
    }
}

/// A game context wired to fakes, with handles to inspect them
pub struct TestWorld {
    pub ctx: Arc<GameContext>,
    pub store: Arc<FakeStore>,
    pub factory: Arc<CountingFactory>,
    pub inserter: Arc<RecordingInserter>,
    pub journal: Arc<Journal>,
}

impl TestWorld {
    pub fn new() -> Self {
        let journal = Arc::new(Journal::default());

        let mut catalog = ItemCatalog::default();
        catalog.items.insert(2169, ItemDefinition { name: "Time Ring".to_string() });
        catalog.items.insert(3031, ItemDefinition { name: "Gold Coin (stack)".to_string() });

        let store = Arc::new(FakeStore {
            players: Mutex::new(HashMap::new()),
            journal: journal.clone(),
            load_calls: AtomicUsize::new(0),
            save_calls: AtomicUsize::new(0),
            fail_loads: AtomicBool::new(false),
            fail_saves: AtomicBool::new(false),
            panic_loads: AtomicBool::new(false),
        });
        let factory = Arc::new(CountingFactory {
            inner: CatalogItemFactory::new(catalog),
            journal: journal.clone(),
            create_calls: AtomicUsize::new(0),
        });
        let inserter = Arc::new(RecordingInserter {
            journal: journal.clone(),
            calls: Mutex::new(Vec::new()),
        });

        let ctx = Arc::new(GameContext::new(
            store.clone(),
            store.clone(),
            factory.clone(),
            inserter.clone(),
        ));

        Self { ctx, store, factory, inserter, journal }
    }

    /// Put a player straight into the directory
    pub fn add_resident(&self, name: &str, status: PlayerStatus) {
        let mut player = Player::new(name, 5);
        player.status = status;
        self.ctx.directory.insert(player);
    }

    /// Put a player into the fake database only
    pub fn add_stored(&self, name: &str) {
        self.store.put(Player::new(name, 5));
    }

    pub fn loads(&self) -> usize {
        self.store.load_calls.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.store.save_calls.load(Ordering::SeqCst)
    }

    pub fn creates(&self) -> usize {
        self.factory.create_calls.load(Ordering::SeqCst)
    }

    pub fn inserts(&self) -> usize {
        self.inserter.calls().len()
    }
}
