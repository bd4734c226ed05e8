//! Dense position sequencing for sibling records.
//!
//! Every group of siblings (all boards, the columns of a board, the tasks of a
//! column) keeps its positions at exactly `0..N-1`. The [`Sequencer`] is the
//! only code that moves items; it does so inside a single store transaction
//! and retries the whole operation when the store reports a conflict.
//!
//! The in-transaction routines ([`reorder_in`], [`move_in`], [`next_position`],
//! [`close_gap`]) are public so record-layer code can compose them with its own
//! writes inside one transaction (e.g. insert-at-tail, delete-and-compact).

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::errors::{Result, SequencerError};

use super::density::{PositionPolicy, validate_target};
use super::store::{
    AtomicStore, GroupKey, ItemId, ItemPatch, OrderedCollection, Placement, PositionRange,
    SortOrder,
};

/// Parking spot for an item while its siblings are renumbered. Live positions
/// are never negative, and at most one item is detached at a time.
pub const DETACHED_POSITION: i64 = -1;

#[derive(Debug, Clone)]
pub struct SequencerConfig {
    pub position_policy: PositionPolicy,
    /// Extra attempts after a `TransactionConflict`.
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            position_policy: PositionPolicy::Strict,
            max_retries: 3,
            retry_backoff: Duration::from_millis(10),
        }
    }
}

/// What a completed move did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    pub item_id: ItemId,
    pub from: Placement,
    pub to: Placement,
    /// Siblings whose position changed as a side effect.
    pub shifted: usize,
}

impl MoveOutcome {
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    config: SequencerConfig,
}

impl Sequencer {
    pub fn new(config: SequencerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Move an item to `new_position` inside its current group.
    pub fn reorder_within_group<S: AtomicStore>(
        &self,
        store: &S,
        item_id: ItemId,
        new_position: i64,
    ) -> Result<MoveOutcome> {
        let policy = self.config.position_policy;
        let outcome = self.with_retry("reorder_within_group", || {
            store.run_atomic(|tx| reorder_in(tx, policy, item_id, new_position))
        })?;
        log_outcome("reorder_within_group", &outcome);
        Ok(outcome)
    }

    /// Move an item into `target_group` at `new_position`.
    ///
    /// A target equal to the item's current group is handled as a reorder.
    pub fn move_across_groups<S: AtomicStore>(
        &self,
        store: &S,
        item_id: ItemId,
        target_group: GroupKey,
        new_position: i64,
    ) -> Result<MoveOutcome> {
        let policy = self.config.position_policy;
        let outcome = self.with_retry("move_across_groups", || {
            store.run_atomic(|tx| move_in(tx, policy, item_id, target_group, new_position))
        })?;
        log_outcome("move_across_groups", &outcome);
        Ok(outcome)
    }

    /// Position a new item appended to `group` would take.
    pub fn append_to_group<S: AtomicStore>(&self, store: &S, group: GroupKey) -> Result<i64> {
        self.with_retry("append_to_group", || {
            store.run_atomic(|tx| next_position(tx, group))
        })
    }

    /// Run `attempt` again while it fails with a retryable error, up to
    /// `max_retries` extra times.
    pub fn with_retry<R>(
        &self,
        operation: &'static str,
        mut attempt: impl FnMut() -> Result<R>,
    ) -> Result<R> {
        let mut retries = 0;
        loop {
            match attempt() {
                Err(err) if err.is_retryable() && retries < self.config.max_retries => {
                    retries += 1;
                    warn!(operation, retry = retries, error = %err, "Retrying after conflict");
                    if !self.config.retry_backoff.is_zero() {
                        std::thread::sleep(self.config.retry_backoff);
                    }
                }
                result => return result,
            }
        }
    }
}

fn log_outcome(operation: &'static str, outcome: &MoveOutcome) {
    if outcome.is_noop() {
        debug!(operation, item_id = outcome.item_id, "Item already in place");
        return;
    }
    info!(
        operation,
        item_id = outcome.item_id,
        from_group = %outcome.from.group,
        from_position = outcome.from.position,
        to_group = %outcome.to.group,
        to_position = outcome.to.position,
        shifted = outcome.shifted,
        "Item moved"
    );
}

fn lookup(tx: &dyn OrderedCollection, item_id: ItemId) -> Result<Placement> {
    tx.get(item_id)?
        .ok_or_else(|| SequencerError::not_found(tx.item_entity(), item_id))
}

/// Shift-the-window reorder inside the item's own group.
pub fn reorder_in(
    tx: &mut dyn OrderedCollection,
    policy: PositionPolicy,
    item_id: ItemId,
    new_position: i64,
) -> Result<MoveOutcome> {
    let from = lookup(tx, item_id)?;
    let group = from.group;
    let size = tx.count(group)? as i64;
    let target = validate_target(policy, new_position, size - 1)?;
    let old = from.position;

    if target == old {
        return Ok(MoveOutcome {
            item_id,
            from,
            to: from,
            shifted: 0,
        });
    }

    tx.update_one(item_id, ItemPatch::position(DETACHED_POSITION))?;
    let shifted = if target > old {
        tx.update_range(group, PositionRange::between(old + 1, target), -1)?
    } else {
        tx.update_range(group, PositionRange::between(target, old - 1), 1)?
    };
    tx.update_one(item_id, ItemPatch::position(target))?;
    debug!(item_id, %group, old, target, shifted, "Window shifted");

    Ok(MoveOutcome {
        item_id,
        from,
        to: Placement {
            group,
            position: target,
        },
        shifted,
    })
}

/// Detach, compact source, open destination gap (descending), settle.
pub fn move_in(
    tx: &mut dyn OrderedCollection,
    policy: PositionPolicy,
    item_id: ItemId,
    target_group: GroupKey,
    new_position: i64,
) -> Result<MoveOutcome> {
    let from = lookup(tx, item_id)?;
    if from.group == target_group {
        return reorder_in(tx, policy, item_id, new_position);
    }
    if !tx.group_exists(target_group)? {
        return Err(SequencerError::not_found(
            tx.group_entity(),
            target_group.parent_id().unwrap_or_default(),
        ));
    }

    let dest_size = tx.count(target_group)? as i64;
    let target = validate_target(policy, new_position, dest_size)?;

    tx.update_one(
        item_id,
        ItemPatch::relocate(target_group, DETACHED_POSITION),
    )?;
    debug!(item_id, source = %from.group, dest = %target_group, "Detached to sentinel");

    let closed = close_gap(tx, from.group, from.position)?;
    debug!(group = %from.group, closed, "Source compacted");

    // One row at a time, highest first, so no write lands on a live position.
    let tail = tx.list_by_group(target_group, PositionRange::starting_at(target), SortOrder::Descending)?;
    let mut opened = 0;
    for sibling in tail.iter().filter(|s| s.id != item_id) {
        tx.update_one(sibling.id, ItemPatch::position(sibling.position + 1))?;
        opened += 1;
    }
    debug!(group = %target_group, opened, at = target, "Destination gap opened");

    tx.update_one(item_id, ItemPatch::position(target))?;

    Ok(MoveOutcome {
        item_id,
        from,
        to: Placement {
            group: target_group,
            position: target,
        },
        shifted: closed + opened,
    })
}

/// Tail position for a new member of `group`.
pub fn next_position(tx: &mut dyn OrderedCollection, group: GroupKey) -> Result<i64> {
    if !tx.group_exists(group)? {
        return Err(SequencerError::not_found(
            tx.group_entity(),
            group.parent_id().unwrap_or_default(),
        ));
    }
    Ok(tx.max_position(group)?.map_or(0, |max| max + 1))
}

/// Pull every member above `removed_position` down by one.
pub fn close_gap(
    tx: &mut dyn OrderedCollection,
    group: GroupKey,
    removed_position: i64,
) -> Result<usize> {
    tx.update_range(group, PositionRange::above(removed_position), -1)
}
