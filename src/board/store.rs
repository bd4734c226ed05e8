//! Abstract ordered-collection store.
//!
//! The sequencer only ever talks to a store through these two traits:
//! [`AtomicStore`] scopes a unit of work, and [`OrderedCollection`] is the
//! handle that unit of work operates on. Both the in-memory store and the
//! SQLite store implement them.

use std::fmt;
use std::ops::Bound;

use serde::{Deserialize, Serialize};

use crate::errors::{Entity, Result};

pub type ItemId = i64;

/// The ordering domain an item belongs to.
///
/// Boards are ordered among all boards (`Root`); columns are ordered within
/// their board and tasks within their column (`Parent`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GroupKey {
    Root,
    Parent(i64),
}

impl GroupKey {
    pub fn parent_id(&self) -> Option<i64> {
        match self {
            GroupKey::Root => None,
            GroupKey::Parent(id) => Some(*id),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Root => f.write_str("root"),
            GroupKey::Parent(id) => write!(f, "{}", id),
        }
    }
}

/// Where an item currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub group: GroupKey,
    pub position: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedItem {
    pub id: ItemId,
    pub group: GroupKey,
    pub position: i64,
}

impl OrderedItem {
    pub fn placement(&self) -> Placement {
        Placement {
            group: self.group,
            position: self.position,
        }
    }
}

/// Position predicate for range updates and listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionRange {
    pub start: Bound<i64>,
    pub end: Bound<i64>,
}

impl PositionRange {
    /// `lo <= position <= hi`
    pub fn between(lo: i64, hi: i64) -> Self {
        Self {
            start: Bound::Included(lo),
            end: Bound::Included(hi),
        }
    }

    /// `position > pos`
    pub fn above(pos: i64) -> Self {
        Self {
            start: Bound::Excluded(pos),
            end: Bound::Unbounded,
        }
    }

    /// `position >= pos`
    pub fn starting_at(pos: i64) -> Self {
        Self {
            start: Bound::Included(pos),
            end: Bound::Unbounded,
        }
    }

    pub fn all() -> Self {
        Self {
            start: Bound::Unbounded,
            end: Bound::Unbounded,
        }
    }

    pub fn contains(&self, position: i64) -> bool {
        let lower = match self.start {
            Bound::Included(lo) => position >= lo,
            Bound::Excluded(lo) => position > lo,
            Bound::Unbounded => true,
        };
        let upper = match self.end {
            Bound::Included(hi) => position <= hi,
            Bound::Excluded(hi) => position < hi,
            Bound::Unbounded => true,
        };
        lower && upper
    }

    /// Inclusive `(lo, hi)` bounds, with unbounded ends widened to the
    /// integer limits. Used to render the predicate as SQL parameters.
    pub fn to_inclusive(&self) -> (i64, i64) {
        let lo = match self.start {
            Bound::Included(lo) => lo,
            Bound::Excluded(lo) => lo.saturating_add(1),
            Bound::Unbounded => i64::MIN,
        };
        let hi = match self.end {
            Bound::Included(hi) => hi,
            Bound::Excluded(hi) => hi.saturating_sub(1),
            Bound::Unbounded => i64::MAX,
        };
        (lo, hi)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Single-item field update. `None` leaves the field untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub position: Option<i64>,
    pub group: Option<GroupKey>,
}

impl ItemPatch {
    pub fn position(position: i64) -> Self {
        Self {
            position: Some(position),
            group: None,
        }
    }

    pub fn relocate(group: GroupKey, position: i64) -> Self {
        Self {
            position: Some(position),
            group: Some(group),
        }
    }
}

/// Operations available inside one atomic unit of work.
///
/// Implementations must give read-your-writes semantics: a `get` after an
/// `update_one` in the same unit sees the new values.
pub trait OrderedCollection {
    fn get(&self, id: ItemId) -> Result<Option<Placement>>;

    fn group_exists(&self, group: GroupKey) -> Result<bool>;

    /// Shift `position` by `delta` for every item of `group` inside `range`.
    /// Returns the number of items shifted.
    fn update_range(&mut self, group: GroupKey, range: PositionRange, delta: i64) -> Result<usize>;

    fn update_one(&mut self, id: ItemId, patch: ItemPatch) -> Result<()>;

    fn list_by_group(
        &self,
        group: GroupKey,
        range: PositionRange,
        order: SortOrder,
    ) -> Result<Vec<OrderedItem>>;

    fn max_position(&self, group: GroupKey) -> Result<Option<i64>>;

    fn count(&self, group: GroupKey) -> Result<usize>;

    /// Entity named in `NotFound` errors for a missing item.
    fn item_entity(&self) -> Entity {
        Entity::Item
    }

    /// Entity named in `NotFound` errors for a missing group.
    fn group_entity(&self) -> Entity {
        Entity::Group
    }
}

/// A store that can run a closure as a single transaction.
///
/// If `f` returns an error, or the commit fails, nothing `f` wrote is kept.
pub trait AtomicStore {
    fn run_atomic<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut dyn OrderedCollection) -> Result<R>;
}
