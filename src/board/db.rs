use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};

use super::density::{GroupViolation, check_dense};
use super::models::*;
use super::sequencer::{self, MoveOutcome, Sequencer};
use super::store::{
    AtomicStore, GroupKey, ItemId, ItemPatch, OrderedCollection, OrderedItem, Placement,
    PositionRange, SortOrder,
};
use crate::errors::{Entity, Result, SequencerError};

/// Async-safe handle to the board database.
///
/// Wraps `BoardDb` behind `Arc<Mutex>` and runs all access on tokio's
/// blocking thread pool via `spawn_blocking`, keeping synchronous SQLite I/O
/// (and the sequencer's retry backoff) off the async worker threads.
#[derive(Clone)]
pub struct DbHandle {
    inner: Arc<std::sync::Mutex<BoardDb>>,
}

impl DbHandle {
    pub fn new(db: BoardDb) -> Self {
        Self {
            inner: Arc::new(std::sync::Mutex::new(db)),
        }
    }

    /// Run a closure with access to the database on a blocking thread.
    /// All data passed into `f` must be owned (`'static`).
    pub async fn call<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&BoardDb) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let db = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = db.lock().map_err(|e| {
                SequencerError::StoreUnavailable(anyhow::anyhow!("DB lock poisoned: {}", e))
            })?;
            f(&guard)
        })
        .await
        .context("DB task panicked")
        .map_err(SequencerError::StoreUnavailable)?
    }

    /// Acquire the database mutex synchronously. For startup and tests only;
    /// never call this from a hot async path.
    pub fn lock_sync(&self) -> Result<std::sync::MutexGuard<'_, BoardDb>> {
        self.inner.lock().map_err(|e| {
            SequencerError::StoreUnavailable(anyhow::anyhow!("DB lock poisoned: {}", e))
        })
    }
}

/// The three ordered tables and how each is grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Boards,
    Columns,
    Tasks,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Boards, Collection::Columns, Collection::Tasks];

    fn table(&self) -> &'static str {
        match self {
            Self::Boards => "boards",
            Self::Columns => "columns",
            Self::Tasks => "tasks",
        }
    }

    /// Foreign key naming the owning group; boards have none.
    fn group_column(&self) -> Option<&'static str> {
        match self {
            Self::Boards => None,
            Self::Columns => Some("board_id"),
            Self::Tasks => Some("column_id"),
        }
    }

    fn parent_table(&self) -> Option<&'static str> {
        match self {
            Self::Boards => None,
            Self::Columns => Some("boards"),
            Self::Tasks => Some("columns"),
        }
    }

    fn entity(&self) -> Entity {
        match self {
            Self::Boards => Entity::Board,
            Self::Columns => Entity::Column,
            Self::Tasks => Entity::Task,
        }
    }

    fn parent_entity(&self) -> Entity {
        match self {
            Self::Boards => Entity::Group,
            Self::Columns => Entity::Board,
            Self::Tasks => Entity::Column,
        }
    }

    /// SQL predicate selecting one group, always bound to `?1`.
    ///
    /// Boards use `?1 IS NULL` so the root group (bound as NULL) matches every
    /// row while a parent key matches none.
    fn group_filter(&self) -> String {
        match self.group_column() {
            Some(col) => format!("{} = ?1", col),
            None => "?1 IS NULL".to_string(),
        }
    }

    fn group_select(&self) -> &'static str {
        self.group_column().unwrap_or("NULL")
    }

    fn group_key(&self, raw: Option<i64>) -> GroupKey {
        match (self.group_column(), raw) {
            (Some(_), Some(id)) => GroupKey::Parent(id),
            _ => GroupKey::Root,
        }
    }

    pub fn name(&self) -> &'static str {
        self.table()
    }
}

/// One collection viewed through an open SQLite transaction.
pub struct SqliteCollection<'c> {
    conn: &'c Connection,
    collection: Collection,
}

impl<'c> SqliteCollection<'c> {
    pub fn conn(&self) -> &'c Connection {
        self.conn
    }
}

impl OrderedCollection for SqliteCollection<'_> {
    fn get(&self, id: ItemId) -> Result<Option<Placement>> {
        let c = self.collection;
        let sql = format!(
            "SELECT {}, position FROM {} WHERE id = ?1",
            c.group_select(),
            c.table()
        );
        let row = self
            .conn
            .query_row(&sql, params![id], |row| {
                Ok((row.get::<_, Option<i64>>(0)?, row.get::<_, i64>(1)?))
            })
            .optional()?;
        Ok(row.map(|(group, position)| Placement {
            group: c.group_key(group),
            position,
        }))
    }

    fn group_exists(&self, group: GroupKey) -> Result<bool> {
        let c = self.collection;
        match (c.parent_table(), group) {
            (None, GroupKey::Root) => Ok(true),
            (Some(parent), GroupKey::Parent(id)) => {
                let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", parent);
                Ok(self.conn.query_row(&sql, params![id], |row| row.get(0))?)
            }
            _ => Ok(false),
        }
    }

    /// Set-based shift that never trips `UNIQUE(group, position)`.
    ///
    /// SQLite checks uniqueness row by row, so a plain `position + 1` can
    /// collide with a sibling that has not been visited yet. The rows are
    /// first flipped into the negative space below the sentinel
    /// (`-(p + delta) - 2`) and then flipped back. Detached rows are never
    /// part of a shift.
    fn update_range(&mut self, group: GroupKey, range: PositionRange, delta: i64) -> Result<usize> {
        let c = self.collection;
        let (lo, hi) = range.to_inclusive();
        let lo = lo.max(0);
        if lo > hi {
            return Ok(0);
        }
        let filter = c.group_filter();
        let flip = format!(
            "UPDATE {t} SET position = -(position + ?2) - 2, updated_at = datetime('now')
             WHERE {f} AND position BETWEEN ?3 AND ?4",
            t = c.table(),
            f = filter
        );
        let shifted = self
            .conn
            .execute(&flip, params![group.parent_id(), delta, lo, hi])?;
        let restore = format!(
            "UPDATE {t} SET position = -position - 2 WHERE {f} AND position <= -2",
            t = c.table(),
            f = filter
        );
        self.conn.execute(&restore, params![group.parent_id()])?;
        Ok(shifted)
    }

    fn update_one(&mut self, id: ItemId, patch: ItemPatch) -> Result<()> {
        let c = self.collection;
        let changed = match (patch.group, patch.position, c.group_column()) {
            (None, None, _) => return Ok(()),
            (None, Some(position), _) => self.conn.execute(
                &format!(
                    "UPDATE {} SET position = ?1, updated_at = datetime('now') WHERE id = ?2",
                    c.table()
                ),
                params![position, id],
            )?,
            (Some(GroupKey::Parent(parent)), position, Some(col)) => self.conn.execute(
                &format!(
                    "UPDATE {} SET {} = ?1, position = COALESCE(?2, position), updated_at = datetime('now') WHERE id = ?3",
                    c.table(),
                    col
                ),
                params![parent, position, id],
            )?,
            (Some(GroupKey::Root), position, None) => {
                return match position {
                    Some(position) => self.update_one(id, ItemPatch::position(position)),
                    None => Ok(()),
                };
            }
            (Some(group), _, _) => {
                return Err(SequencerError::InvalidInput(format!(
                    "{} cannot belong to group {}",
                    c.table(),
                    group
                )));
            }
        };
        if changed == 0 {
            return Err(SequencerError::not_found(c.entity(), id));
        }
        Ok(())
    }

    fn list_by_group(
        &self,
        group: GroupKey,
        range: PositionRange,
        order: SortOrder,
    ) -> Result<Vec<OrderedItem>> {
        let c = self.collection;
        let (lo, hi) = range.to_inclusive();
        let direction = match order {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        };
        let sql = format!(
            "SELECT id, {}, position FROM {} WHERE {} AND position BETWEEN ?2 AND ?3 ORDER BY position {}",
            c.group_select(),
            c.table(),
            c.group_filter(),
            direction
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![group.parent_id(), lo, hi], |row| {
            Ok(OrderedItem {
                id: row.get(0)?,
                group: c.group_key(row.get(1)?),
                position: row.get(2)?,
            })
        })?;
        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    fn max_position(&self, group: GroupKey) -> Result<Option<i64>> {
        let c = self.collection;
        let sql = format!(
            "SELECT MAX(position) FROM {} WHERE {} AND position >= 0",
            c.table(),
            c.group_filter()
        );
        Ok(self
            .conn
            .query_row(&sql, params![group.parent_id()], |row| row.get(0))?)
    }

    fn count(&self, group: GroupKey) -> Result<usize> {
        let c = self.collection;
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {}",
            c.table(),
            c.group_filter()
        );
        let count: i64 = self
            .conn
            .query_row(&sql, params![group.parent_id()], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn item_entity(&self) -> Entity {
        self.collection.entity()
    }

    fn group_entity(&self) -> Entity {
        self.collection.parent_entity()
    }
}

/// An [`AtomicStore`] over one collection of a [`BoardDb`].
pub struct CollectionStore<'db> {
    db: &'db BoardDb,
    collection: Collection,
}

impl AtomicStore for CollectionStore<'_> {
    fn run_atomic<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut dyn OrderedCollection) -> Result<R>,
    {
        self.db.atomically(self.collection, |tx| f(tx))
    }
}

pub struct BoardDb {
    conn: Connection,
    sequencer: Sequencer,
}

impl BoardDb {
    /// Open (or create) a SQLite database at the given path and run migrations.
    pub fn new(path: &Path, sequencer: Sequencer) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite database at {}", path.display()))
            .map_err(SequencerError::StoreUnavailable)?;
        let db = Self { conn, sequencer };
        db.init()?;
        Ok(db)
    }

    /// Create an in-memory SQLite database (for testing).
    pub fn new_in_memory(sequencer: Sequencer) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .context("Failed to open in-memory SQLite database")
            .map_err(SequencerError::StoreUnavailable)?;
        let db = Self { conn, sequencer };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<()> {
        self.conn
            .execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.busy_timeout(std::time::Duration::from_secs(5))?;
        self.run_migrations()?;
        Ok(())
    }

    fn run_migrations(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS boards (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                position INTEGER NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(position)
            );

            CREATE TABLE IF NOT EXISTS columns (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                board_id INTEGER NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                color TEXT NOT NULL,
                position INTEGER NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(board_id, position)
            );

            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                column_id INTEGER NOT NULL REFERENCES columns(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                description TEXT,
                priority TEXT NOT NULL DEFAULT 'medium',
                due_date TEXT,
                position INTEGER NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(column_id, position)
            );

            CREATE INDEX IF NOT EXISTS idx_columns_board ON columns(board_id);
            CREATE INDEX IF NOT EXISTS idx_tasks_column ON tasks(column_id);
            ",
        )?;
        Ok(())
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// View one collection as an [`AtomicStore`] for the sequencer.
    pub fn collection(&self, collection: Collection) -> CollectionStore<'_> {
        CollectionStore {
            db: self,
            collection,
        }
    }

    /// Run `f` inside a SQLite transaction scoped to `collection`.
    /// Dropping the transaction on error rolls it back.
    fn atomically<R>(
        &self,
        collection: Collection,
        f: impl FnOnce(&mut SqliteCollection<'_>) -> Result<R>,
    ) -> Result<R> {
        // Safety: DbHandle's Mutex already guarantees single-threaded access.
        let tx = self.conn.unchecked_transaction()?;
        let mut handle = SqliteCollection {
            conn: &tx,
            collection,
        };
        let result = f(&mut handle)?;
        tx.commit()?;
        Ok(result)
    }

    // ── Board CRUD ────────────────────────────────────────────────────

    /// Create a board at the tail of the board list, with the default columns.
    pub fn create_board(&self, title: &str, description: Option<&str>) -> Result<Board> {
        let title = normalize_title(title)?;
        let description = normalize_description(description);

        let id = self.sequencer.with_retry("create_board", || {
            self.atomically(Collection::Boards, |tx| {
                let position = sequencer::next_position(tx, GroupKey::Root)?;
                tx.conn().execute(
                    "INSERT INTO boards (title, description, position) VALUES (?1, ?2, ?3)",
                    params![title, description, position],
                )?;
                let board_id = tx.conn().last_insert_rowid();
                for (position, (column_title, color)) in DEFAULT_COLUMNS.iter().enumerate() {
                    tx.conn().execute(
                        "INSERT INTO columns (board_id, title, color, position) VALUES (?1, ?2, ?3, ?4)",
                        params![board_id, column_title, color, position as i64],
                    )?;
                }
                Ok(board_id)
            })
        })?;
        info!(board_id = id, title = %title, "Board created");
        self.require_board(id)
    }

    pub fn get_board(&self, id: i64) -> Result<Option<Board>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, title, description, position, created_at, updated_at FROM boards WHERE id = ?1",
                params![id],
                board_from_row,
            )
            .optional()?)
    }

    fn require_board(&self, id: i64) -> Result<Board> {
        self.get_board(id)?
            .ok_or_else(|| SequencerError::not_found(Entity::Board, id))
    }

    pub fn list_boards(&self) -> Result<Vec<BoardSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT b.id, b.title, b.description, b.position, b.created_at, b.updated_at,
                    (SELECT COUNT(*) FROM columns c WHERE c.board_id = b.id),
                    (SELECT COUNT(*) FROM tasks t JOIN columns c ON t.column_id = c.id WHERE c.board_id = b.id)
             FROM boards b ORDER BY b.position",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(BoardSummary {
                board: board_from_row(row)?,
                column_count: row.get::<_, i64>(6)? as usize,
                task_count: row.get::<_, i64>(7)? as usize,
            })
        })?;
        let mut boards = Vec::new();
        for row in rows {
            boards.push(row?);
        }
        Ok(boards)
    }

    pub fn update_board(&self, id: i64, title: &str, description: Option<&str>) -> Result<Board> {
        let title = normalize_title(title)?;
        let description = normalize_description(description);
        let changed = self.conn.execute(
            "UPDATE boards SET title = ?1, description = ?2, updated_at = datetime('now') WHERE id = ?3",
            params![title, description, id],
        )?;
        if changed == 0 {
            return Err(SequencerError::not_found(Entity::Board, id));
        }
        self.require_board(id)
    }

    pub fn move_board(&self, id: i64, position: i64) -> Result<MoveOutcome> {
        self.sequencer
            .reorder_within_group(&self.collection(Collection::Boards), id, position)
    }

    /// Delete a board (its columns and tasks cascade) and compact the
    /// remaining boards. Returns `false` if the board did not exist.
    pub fn delete_board(&self, id: i64) -> Result<bool> {
        self.delete_and_compact(Collection::Boards, id)
    }

    /// The board with its columns and tasks, all in position order.
    pub fn get_board_view(&self, id: i64) -> Result<Option<BoardView>> {
        let Some(board) = self.get_board(id)? else {
            return Ok(None);
        };
        let mut columns = Vec::new();
        for column in self.list_columns(id)? {
            let tasks = self.list_tasks(column.id)?;
            columns.push(ColumnView { column, tasks });
        }
        Ok(Some(BoardView { board, columns }))
    }

    // ── Column CRUD ───────────────────────────────────────────────────

    pub fn add_column(&self, board_id: i64, title: &str, color: Option<&str>) -> Result<Column> {
        let title = normalize_title(title)?;
        let color = normalize_color(color.unwrap_or(DEFAULT_COLUMN_COLOR))?;

        let id = self.sequencer.with_retry("add_column", || {
            self.atomically(Collection::Columns, |tx| {
                let position = sequencer::next_position(tx, GroupKey::Parent(board_id))?;
                tx.conn().execute(
                    "INSERT INTO columns (board_id, title, color, position) VALUES (?1, ?2, ?3, ?4)",
                    params![board_id, title, color, position],
                )?;
                Ok(tx.conn().last_insert_rowid())
            })
        })?;
        info!(board_id, column_id = id, "Column added");
        self.require_column(id)
    }

    pub fn get_column(&self, id: i64) -> Result<Option<Column>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, board_id, title, color, position FROM columns WHERE id = ?1",
                params![id],
                column_from_row,
            )
            .optional()?)
    }

    fn require_column(&self, id: i64) -> Result<Column> {
        self.get_column(id)?
            .ok_or_else(|| SequencerError::not_found(Entity::Column, id))
    }

    pub fn list_columns(&self, board_id: i64) -> Result<Vec<Column>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, board_id, title, color, position FROM columns WHERE board_id = ?1 ORDER BY position",
        )?;
        let rows = stmt.query_map(params![board_id], column_from_row)?;
        let mut columns = Vec::new();
        for row in rows {
            columns.push(row?);
        }
        Ok(columns)
    }

    pub fn move_column(&self, id: i64, position: i64) -> Result<MoveOutcome> {
        self.sequencer
            .reorder_within_group(&self.collection(Collection::Columns), id, position)
    }

    pub fn delete_column(&self, id: i64) -> Result<bool> {
        self.delete_and_compact(Collection::Columns, id)
    }

    // ── Task CRUD ─────────────────────────────────────────────────────

    pub fn create_task(&self, new: &NewTask) -> Result<Task> {
        let title = normalize_title(&new.title)?;
        let description = normalize_description(new.description.as_deref());
        let due_date = new.due_date.map(|d| d.to_string());
        let column_id = new.column_id;
        let priority = new.priority.as_str();

        let id = self.sequencer.with_retry("create_task", || {
            self.atomically(Collection::Tasks, |tx| {
                let position = sequencer::next_position(tx, GroupKey::Parent(column_id))?;
                tx.conn().execute(
                    "INSERT INTO tasks (column_id, title, description, priority, due_date, position)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![column_id, title, description, priority, due_date, position],
                )?;
                Ok(tx.conn().last_insert_rowid())
            })
        })?;
        info!(column_id, task_id = id, "Task created");
        self.require_task(id)
    }

    pub fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, column_id, title, description, priority, due_date, position, created_at, updated_at
                 FROM tasks WHERE id = ?1",
                params![id],
                task_row,
            )
            .optional()?;
        row.map(TaskRow::into_task).transpose()
    }

    fn require_task(&self, id: i64) -> Result<Task> {
        self.get_task(id)?
            .ok_or_else(|| SequencerError::not_found(Entity::Task, id))
    }

    pub fn list_tasks(&self, column_id: i64) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, column_id, title, description, priority, due_date, position, created_at, updated_at
             FROM tasks WHERE column_id = ?1 ORDER BY position",
        )?;
        let rows = stmt.query_map(params![column_id], task_row)?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?.into_task()?);
        }
        Ok(tasks)
    }

    pub fn update_task(&self, id: i64, update: &TaskUpdate) -> Result<Task> {
        let title = normalize_title(&update.title)?;
        let description = normalize_description(update.description.as_deref());
        let due_date = update.due_date.map(|d| d.to_string());
        let changed = self.conn.execute(
            "UPDATE tasks SET title = ?1, description = ?2, priority = ?3, due_date = ?4,
                    updated_at = datetime('now')
             WHERE id = ?5",
            params![title, description, update.priority.as_str(), due_date, id],
        )?;
        if changed == 0 {
            return Err(SequencerError::not_found(Entity::Task, id));
        }
        self.require_task(id)
    }

    /// Move a task to `position`, in `column_id` if given, else in its own column.
    pub fn move_task(&self, id: i64, column_id: Option<i64>, position: i64) -> Result<MoveOutcome> {
        let store = self.collection(Collection::Tasks);
        match column_id {
            Some(column_id) => self.sequencer.move_across_groups(
                &store,
                id,
                GroupKey::Parent(column_id),
                position,
            ),
            None => self.sequencer.reorder_within_group(&store, id, position),
        }
    }

    pub fn delete_task(&self, id: i64) -> Result<bool> {
        self.delete_and_compact(Collection::Tasks, id)
    }

    /// Delete one row and close the gap it leaves, in one transaction.
    fn delete_and_compact(&self, collection: Collection, id: i64) -> Result<bool> {
        let deleted = self.sequencer.with_retry("delete", || {
            self.atomically(collection, |tx| {
                let Some(placement) = tx.get(id)? else {
                    return Ok(false);
                };
                tx.conn().execute(
                    &format!("DELETE FROM {} WHERE id = ?1", collection.table()),
                    params![id],
                )?;
                let closed = sequencer::close_gap(tx, placement.group, placement.position)?;
                debug!(
                    collection = collection.name(),
                    id,
                    group = %placement.group,
                    closed,
                    "Deleted and compacted"
                );
                Ok(true)
            })
        })?;
        if deleted {
            info!(collection = collection.name(), id, "Deleted");
        }
        Ok(deleted)
    }

    // ── Integrity ─────────────────────────────────────────────────────

    /// Every group, in every collection, whose positions are not `0..N-1`.
    pub fn check_integrity(&self) -> Result<Vec<GroupViolation>> {
        let mut violations = Vec::new();
        for collection in Collection::ALL {
            let sql = format!(
                "SELECT {}, position FROM {}",
                collection.group_select(),
                collection.table()
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, Option<i64>>(0)?, row.get::<_, i64>(1)?))
            })?;
            let mut by_group: BTreeMap<GroupKey, Vec<i64>> = BTreeMap::new();
            for row in rows {
                let (group, position) = row?;
                by_group
                    .entry(collection.group_key(group))
                    .or_default()
                    .push(position);
            }
            for (group, positions) in by_group {
                if let Err(violation) = check_dense(&positions) {
                    violations.push(GroupViolation {
                        scope: collection.name(),
                        group,
                        violation,
                    });
                }
            }
        }
        Ok(violations)
    }
}

// ── Internal row helpers ──────────────────────────────────────────────

fn board_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Board> {
    Ok(Board {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        position: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn column_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Column> {
    Ok(Column {
        id: row.get(0)?,
        board_id: row.get(1)?,
        title: row.get(2)?,
        color: row.get(3)?,
        position: row.get(4)?,
    })
}

/// Intermediate row struct for reading tasks before converting the
/// priority / due_date strings into typed values.
struct TaskRow {
    id: i64,
    column_id: i64,
    title: String,
    description: Option<String>,
    priority: String,
    due_date: Option<String>,
    position: i64,
    created_at: String,
    updated_at: String,
}

fn task_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TaskRow> {
    Ok(TaskRow {
        id: row.get(0)?,
        column_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        priority: row.get(4)?,
        due_date: row.get(5)?,
        position: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

impl TaskRow {
    fn into_task(self) -> Result<Task> {
        let priority = Priority::from_str(&self.priority)
            .map_err(|e| SequencerError::StoreUnavailable(anyhow::anyhow!(e)))?;
        let due_date = self.due_date.as_deref().map(parse_due_date).transpose()?;
        Ok(Task {
            id: self.id,
            column_id: self.column_id,
            title: self.title,
            description: self.description,
            priority,
            due_date,
            position: self.position,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
