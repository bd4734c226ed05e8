//! In-memory ordered-collection store.
//!
//! Transactions are optimistic: each one works on a private snapshot and
//! remembers the version of every group it read or wrote. Commit validates
//! those versions under a short lock and either applies the write set or
//! fails with `TransactionConflict`. Transactions over disjoint groups never
//! conflict.
//!
//! Every write checks `(group, position)` uniqueness, the same constraint the
//! SQLite schema declares, so protocol bugs surface as `ConstraintViolation`.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use crate::errors::{Entity, Result, SequencerError};

use super::density::{GroupViolation, check_dense};
use super::sequencer::{close_gap, next_position};
use super::store::{
    AtomicStore, GroupKey, ItemId, ItemPatch, OrderedCollection, OrderedItem, Placement,
    PositionRange, SortOrder,
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    items: BTreeMap<ItemId, OrderedItem>,
    /// Registered groups and their commit version.
    groups: HashMap<GroupKey, u64>,
}

pub struct MemoryStore {
    state: Mutex<MemoryState>,
    next_id: AtomicI64,
    writes: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store with only the root group registered.
    pub fn new() -> Self {
        let mut state = MemoryState::default();
        state.groups.insert(GroupKey::Root, 0);
        Self {
            state: Mutex::new(state),
            next_id: AtomicI64::new(1),
            writes: AtomicUsize::new(0),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>> {
        self.state.lock().map_err(|e| {
            SequencerError::StoreUnavailable(anyhow::anyhow!("Store lock poisoned: {}", e))
        })
    }

    /// Register an (empty) group. Registering an existing group is a no-op.
    pub fn create_group(&self, group: GroupKey) {
        if let Ok(mut state) = self.lock() {
            state.groups.entry(group).or_insert(0);
        }
    }

    /// Append a new item at the tail of `group`.
    pub fn insert(&self, group: GroupKey) -> Result<OrderedItem> {
        self.transaction(|tx| {
            let position = next_position(tx, group)?;
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            tx.insert(OrderedItem {
                id,
                group,
                position,
            })
        })
    }

    /// Append `count` items to `group`, returning their ids in order.
    pub fn seed(&self, group: GroupKey, count: usize) -> Result<Vec<ItemId>> {
        (0..count)
            .map(|_| self.insert(group).map(|item| item.id))
            .collect()
    }

    /// Delete an item and close the gap it leaves.
    pub fn remove(&self, id: ItemId) -> Result<()> {
        self.transaction(|tx| {
            let placement = tx
                .get(id)?
                .ok_or_else(|| SequencerError::not_found(Entity::Item, id))?;
            tx.remove(id)?;
            close_gap(tx, placement.group, placement.position)?;
            Ok(())
        })
    }

    /// Committed members of `group` in position order.
    pub fn items_in(&self, group: GroupKey) -> Vec<OrderedItem> {
        let Ok(state) = self.lock() else {
            return Vec::new();
        };
        let mut items: Vec<OrderedItem> = state
            .items
            .values()
            .filter(|item| item.group == group)
            .copied()
            .collect();
        items.sort_by_key(|item| item.position);
        items
    }

    /// Committed member ids of `group` in position order.
    pub fn order_of(&self, group: GroupKey) -> Vec<ItemId> {
        self.items_in(group).into_iter().map(|item| item.id).collect()
    }

    /// Number of item writes committed so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Every group whose committed positions are not `0..N-1`.
    pub fn check_integrity(&self) -> Vec<GroupViolation> {
        let Ok(state) = self.lock() else {
            return Vec::new();
        };
        let mut by_group: BTreeMap<GroupKey, Vec<i64>> = BTreeMap::new();
        for item in state.items.values() {
            by_group.entry(item.group).or_default().push(item.position);
        }
        by_group
            .into_iter()
            .filter_map(|(group, positions)| {
                check_dense(&positions).err().map(|violation| GroupViolation {
                    scope: "memory",
                    group,
                    violation,
                })
            })
            .collect()
    }

    /// Run `f` against a snapshot and commit its writes if nothing it
    /// depended on changed in the meantime.
    pub fn transaction<R>(&self, f: impl FnOnce(&mut MemoryTx) -> Result<R>) -> Result<R> {
        let snapshot = self.lock()?.clone();
        let mut tx = MemoryTx {
            base_versions: snapshot.groups.clone(),
            snapshot,
            observed: HashMap::new(),
            dirty: BTreeSet::new(),
            written_groups: BTreeSet::new(),
            writes: 0,
        };
        let result = f(&mut tx)?;
        self.commit(tx)?;
        Ok(result)
    }

    fn commit(&self, tx: MemoryTx) -> Result<()> {
        if tx.dirty.is_empty() {
            return Ok(());
        }
        let mut state = self.lock()?;
        for (group, seen) in &tx.observed {
            if state.groups.get(group).copied() != *seen {
                return Err(SequencerError::TransactionConflict(format!(
                    "group {} changed since the transaction started",
                    group
                )));
            }
        }
        for id in &tx.dirty {
            match tx.snapshot.items.get(id) {
                Some(item) => state.items.insert(*id, *item),
                None => state.items.remove(id),
            };
        }
        for group in &tx.written_groups {
            *state.groups.entry(*group).or_insert(0) += 1;
        }
        self.writes.fetch_add(tx.writes, Ordering::SeqCst);
        Ok(())
    }
}

impl AtomicStore for MemoryStore {
    fn run_atomic<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut dyn OrderedCollection) -> Result<R>,
    {
        self.transaction(|tx| f(tx))
    }
}

/// A transaction's private view of the store.
pub struct MemoryTx {
    snapshot: MemoryState,
    /// Group versions as of the snapshot; `observed` copies from here.
    base_versions: HashMap<GroupKey, u64>,
    observed: HashMap<GroupKey, Option<u64>>,
    dirty: BTreeSet<ItemId>,
    written_groups: BTreeSet<GroupKey>,
    writes: usize,
}

impl MemoryTx {
    fn observe(&mut self, group: GroupKey) {
        let version = self.base_versions.get(&group).copied();
        self.observed.entry(group).or_insert(version);
    }

    fn mark_written(&mut self, group: GroupKey) {
        self.observe(group);
        self.written_groups.insert(group);
    }

    fn touch(&mut self, id: ItemId, group: GroupKey) {
        self.mark_written(group);
        self.dirty.insert(id);
        self.writes += 1;
    }

    fn ensure_unique(&self, group: GroupKey) -> Result<()> {
        let mut seen = HashSet::new();
        for item in self.snapshot.items.values().filter(|i| i.group == group) {
            if !seen.insert(item.position) {
                return Err(SequencerError::ConstraintViolation(format!(
                    "duplicate position {} in group {}",
                    item.position, group
                )));
            }
        }
        Ok(())
    }

    pub fn insert(&mut self, item: OrderedItem) -> Result<OrderedItem> {
        if !self.snapshot.groups.contains_key(&item.group) {
            return Err(SequencerError::not_found(
                Entity::Group,
                item.group.parent_id().unwrap_or_default(),
            ));
        }
        self.snapshot.items.insert(item.id, item);
        self.touch(item.id, item.group);
        self.ensure_unique(item.group)?;
        Ok(item)
    }

    pub fn remove(&mut self, id: ItemId) -> Result<()> {
        let item = self
            .snapshot
            .items
            .remove(&id)
            .ok_or_else(|| SequencerError::not_found(Entity::Item, id))?;
        self.touch(id, item.group);
        Ok(())
    }

    fn members(&self, group: GroupKey, range: PositionRange) -> Vec<OrderedItem> {
        self.snapshot
            .items
            .values()
            .filter(|item| item.group == group && range.contains(item.position))
            .copied()
            .collect()
    }
}

// Reads take `&self` and record nothing. Every sequencer protocol writes to
// each group it reads, and `observe` always records the snapshot version, so
// the write path covers the read set.
impl OrderedCollection for MemoryTx {
    fn get(&self, id: ItemId) -> Result<Option<Placement>> {
        Ok(self.snapshot.items.get(&id).map(OrderedItem::placement))
    }

    fn group_exists(&self, group: GroupKey) -> Result<bool> {
        Ok(self.snapshot.groups.contains_key(&group))
    }

    fn update_range(&mut self, group: GroupKey, range: PositionRange, delta: i64) -> Result<usize> {
        let targets = self.members(group, range);
        self.observe(group);
        for item in &targets {
            if let Some(stored) = self.snapshot.items.get_mut(&item.id) {
                stored.position += delta;
            }
        }
        for item in &targets {
            self.touch(item.id, group);
        }
        self.ensure_unique(group)?;
        Ok(targets.len())
    }

    fn update_one(&mut self, id: ItemId, patch: ItemPatch) -> Result<()> {
        if let Some(group) = patch.group {
            if !self.snapshot.groups.contains_key(&group) {
                return Err(SequencerError::not_found(
                    Entity::Group,
                    group.parent_id().unwrap_or_default(),
                ));
            }
        }
        let stored = self
            .snapshot
            .items
            .get_mut(&id)
            .ok_or_else(|| SequencerError::not_found(Entity::Item, id))?;
        let old_group = stored.group;
        if let Some(group) = patch.group {
            stored.group = group;
        }
        if let Some(position) = patch.position {
            stored.position = position;
        }
        let new_group = stored.group;

        self.touch(id, old_group);
        if new_group != old_group {
            self.mark_written(new_group);
        }
        self.ensure_unique(new_group)
    }

    fn list_by_group(
        &self,
        group: GroupKey,
        range: PositionRange,
        order: SortOrder,
    ) -> Result<Vec<OrderedItem>> {
        let mut items = self.members(group, range);
        items.sort_by_key(|item| item.position);
        if order == SortOrder::Descending {
            items.reverse();
        }
        Ok(items)
    }

    fn max_position(&self, group: GroupKey) -> Result<Option<i64>> {
        Ok(self.members(group, PositionRange::all()).iter().map(|i| i.position).max())
    }

    fn count(&self, group: GroupKey) -> Result<usize> {
        Ok(self.members(group, PositionRange::all()).len())
    }
}
