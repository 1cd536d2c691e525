//! Configuration module for the grant server
//!
//! Loads server settings and the item catalog from TOML files.
//! The catalog is the single source of truth for which item types exist.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::constants::*;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Complete configuration loaded from all TOML files
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub server: ServerConfig,
    pub items: ItemCatalog,
}

// =============================================================================
// server.toml
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettingsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub grants: GrantsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettingsConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for ServerSettingsConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

impl ServerSettingsConfig {
    /// sqlx connection URL for the configured database file
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.database_path)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrantsConfig {
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,
    #[serde(default = "default_inbox_capacity")]
    pub default_inbox_capacity: usize,
}

impl Default for GrantsConfig {
    fn default() -> Self {
        Self {
            queue_size: default_queue_size(),
            default_inbox_capacity: default_inbox_capacity(),
        }
    }
}

fn default_database_path() -> String { DEFAULT_DATABASE_PATH.to_string() }
fn default_log_level() -> String { DEFAULT_LOG_LEVEL.to_string() }
fn default_queue_size() -> usize { DEFAULT_GRANT_QUEUE_SIZE }
fn default_inbox_capacity() -> usize { DEFAULT_INBOX_CAPACITY }

// =============================================================================
// items.toml
// =============================================================================

/// Raw catalog structure that matches the TOML file (string keys)
#[derive(Debug, Clone, Deserialize)]
struct ItemCatalogRaw {
    #[serde(default)]
    items: HashMap<String, ItemDefinition>,
}

/// Processed catalog with numeric keys for fast lookups
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    pub items: HashMap<u16, ItemDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemDefinition {
    pub name: String,
}

impl From<ItemCatalogRaw> for ItemCatalog {
    fn from(raw: ItemCatalogRaw) -> Self {
        Self {
            items: raw.items.into_iter()
                .filter_map(|(k, v)| k.parse::<u16>().ok().map(|id| (id, v)))
                .collect(),
        }
    }
}

impl ItemCatalog {
    /// Get the definition for an item type
    pub fn get(&self, item_type: u16) -> Option<&ItemDefinition> {
        self.items.get(&item_type)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Config Loading
// =============================================================================

impl GameConfig {
    /// Load all configuration files from the given directory
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let dir = Path::new(config_dir);

        let server = load_toml::<ServerConfig>(&dir.join("server.toml"))?;
        let items_raw = load_toml::<ItemCatalogRaw>(&dir.join("items.toml"))?;
        let items: ItemCatalog = items_raw.into();

        Ok(Self { server, items })
    }
}

fn load_toml<T>(path: &Path) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let path_str = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path_str.clone(),
        source: e,
    })?;

    toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path_str,
        source: e,
    })
}
