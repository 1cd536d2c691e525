//! Item grants into player inboxes
//!
//! A grant looks a player up in memory (or loads them), creates an item
//! from the catalog, puts it in the player's inbox and saves offline
//! players. See [`handlers::add_item_to_player`].

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod game;
pub mod handlers;
pub mod service;

#[cfg(test)]
mod testing;

pub use error::{GrantError, GrantResult};
pub use game::GameContext;
pub use handlers::{add_item_to_player, GrantReceipt};
