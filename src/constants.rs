//! Defaults for the grant server
//!
//! Values here are only used when the config files leave a setting out.

// =============================================================================
// SERVER CONFIGURATION
// =============================================================================

pub const DEFAULT_CONFIG_DIR: &str = "config";
pub const DEFAULT_DATABASE_PATH: &str = "inbox_grant.db";
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// DATABASE POOL
// =============================================================================

pub const DB_MAX_CONNECTIONS: u32 = 50;
pub const DB_ACQUIRE_TIMEOUT_SECS: u64 = 5;
pub const DB_IDLE_TIMEOUT_SECS: u64 = 600;

// =============================================================================
// GRANTS
// =============================================================================

/// Inbox size a player gets when nothing else is configured.
/// Grants with the no-limit flag ignore it.
pub const DEFAULT_INBOX_CAPACITY: usize = 20;

/// Pending requests the grant service buffers before callers wait
pub const DEFAULT_GRANT_QUEUE_SIZE: usize = 256;
