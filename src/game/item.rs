//! Item instances and the factory that creates them from the catalog

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::ItemCatalog;

/// A concrete item owned by exactly one inbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub uid: Uuid,
    pub type_id: u16,
    pub name: String,
    pub granted_at: DateTime<Utc>,
}

/// Creates item instances from an item type id.
pub trait ItemFactory: Send + Sync {
    /// Returns `None` when the type id is unknown.
    fn create(&self, item_type: u16) -> Option<Item>;
}

/// Item factory backed by the items.toml catalog
#[derive(Debug, Clone)]
pub struct CatalogItemFactory {
    catalog: ItemCatalog,
}

impl CatalogItemFactory {
    pub fn new(catalog: ItemCatalog) -> Self {
        Self { catalog }
    }
}

impl ItemFactory for CatalogItemFactory {
    fn create(&self, item_type: u16) -> Option<Item> {
        let definition = self.catalog.get(item_type)?;
        Some(Item {
            uid: Uuid::new_v4(),
            type_id: item_type,
            name: definition.name.clone(),
            granted_at: Utc::now(),
        })
    }
}
