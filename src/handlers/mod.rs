//! Game operations

pub mod grant;

pub use grant::{add_item_to_player, resolve_player, GrantReceipt, Residency, ResolvedPlayer};
