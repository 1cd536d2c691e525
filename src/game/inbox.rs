//! Player inbox and item insertion rules

use std::ops::{BitOr, BitOrAssign};

use serde::Serialize;
use thiserror::Error;

use super::Item;

/// Ordered item container with a soft capacity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Inbox {
    items: Vec<Item>,
    capacity: usize,
}

impl Inbox {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    /// Rebuild an inbox from stored items, keeping their order.
    /// May hold more than `capacity` items if they were granted with no limit.
    pub fn with_items(items: Vec<Item>, capacity: usize) -> Self {
        Self { items, capacity }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }
}

/// Independent modifiers for an inbox insertion.
///
/// Only the named constants exist; combine them with `|`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InsertFlags(u8);

impl InsertFlags {
    pub const NONE: Self = Self(0);
    /// Ignore the inbox capacity
    pub const NO_LIMIT: Self = Self(1 << 0);
    /// Reject positions past the end instead of appending
    pub const STRICT_POSITION: Self = Self(1 << 1);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for InsertFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for InsertFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

/// Where in the inbox an item should go
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotPosition(Option<usize>);

impl SlotPosition {
    /// Let the inserter pick (currently: the end)
    pub const ANYWHERE: Self = Self(None);

    pub const fn at(index: usize) -> Self {
        Self(Some(index))
    }

    pub const fn index(self) -> Option<usize> {
        self.0
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InsertError {
    #[error("inbox is full ({capacity} items)")]
    Full { capacity: usize },

    #[error("slot {position} is out of range for an inbox of {len} items")]
    PositionOutOfRange { position: usize, len: usize },
}

/// Places items into an inbox.
///
/// The item is moved in; on error it is dropped.
pub trait InboxInserter: Send + Sync {
    /// Returns the index the item ended up at.
    fn insert(
        &self,
        inbox: &mut Inbox,
        item: Item,
        position: SlotPosition,
        flags: InsertFlags,
    ) -> Result<usize, InsertError>;
}

/// Standard insertion rules: capacity check unless `NO_LIMIT`,
/// out-of-range positions clamp to the end unless `STRICT_POSITION`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultInserter;

impl InboxInserter for DefaultInserter {
    fn insert(
        &self,
        inbox: &mut Inbox,
        item: Item,
        position: SlotPosition,
        flags: InsertFlags,
    ) -> Result<usize, InsertError> {
        if !flags.contains(InsertFlags::NO_LIMIT) && inbox.is_full() {
            return Err(InsertError::Full { capacity: inbox.capacity });
        }

        let len = inbox.items.len();
        let index = match position.index() {
            None => len,
            Some(i) if i <= len => i,
            Some(i) if flags.contains(InsertFlags::STRICT_POSITION) => {
                return Err(InsertError::PositionOutOfRange { position: i, len });
            }
            Some(_) => len,
        };

        inbox.items.insert(index, item);
        Ok(index)
    }
}
