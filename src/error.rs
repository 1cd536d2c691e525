use thiserror::Error;

use crate::db::StorageError;
use crate::game::InsertError;
use crate::handlers::Residency;

pub type GrantResult<T> = Result<T, GrantError>;

/// Why an item grant did not complete
#[derive(Debug, Error)]
pub enum GrantError {
    /// Not resident and the loader has no such player
    #[error("player not found: {0}")]
    PlayerNotFound(String),

    /// The item factory does not know this item type
    #[error("invalid item type: {0}")]
    InvalidItemType(u16),

    #[error("inbox rejected item: {0}")]
    InboxRejected(#[from] InsertError),

    #[error("failed to load player: {0}")]
    LoadFailed(#[source] StorageError),

    /// The write did not go through. A resident player keeps the item in
    /// memory; a loaded player is dropped along with it.
    #[error("failed to save {residency:?} player: {source}")]
    SaveFailed {
        residency: Residency,
        #[source]
        source: StorageError,
    },

    /// The grant service has shut down and never saw the request
    #[error("grant service unavailable")]
    ServiceUnavailable,

    /// The service took the request but the grant ended without answering.
    /// Whether the item landed is unknown.
    #[error("grant ended without a reply")]
    ReplyLost,
}

impl GrantError {
    /// True when the failed grant left no trace: no item kept, nothing written.
    pub fn is_silent_noop(&self) -> bool {
        match self {
            GrantError::SaveFailed { residency, .. } => *residency == Residency::Loaded,
            GrantError::ReplyLost => false,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_pool() -> StorageError {
        StorageError::Database(sqlx::Error::PoolClosed)
    }

    #[test]
    fn test_silent_noop_by_outcome() {
        assert!(GrantError::PlayerNotFound("ghost".to_string()).is_silent_noop());
        assert!(GrantError::InvalidItemType(1).is_silent_noop());
        assert!(GrantError::InboxRejected(InsertError::Full { capacity: 1 }).is_silent_noop());
        assert!(GrantError::LoadFailed(closed_pool()).is_silent_noop());
        assert!(GrantError::ServiceUnavailable.is_silent_noop());

        assert!(!GrantError::ReplyLost.is_silent_noop());
    }

    #[test]
    fn test_save_failure_depends_on_residency() {
        let resident = GrantError::SaveFailed {
            residency: Residency::Resident,
            source: closed_pool(),
        };
        assert!(!resident.is_silent_noop());

        let loaded = GrantError::SaveFailed {
            residency: Residency::Loaded,
            source: closed_pool(),
        };
        assert!(loaded.is_silent_noop());
    }
}
