//! Boards, columns and tasks with dense sibling ordering.
//!
//! ## Module Map
//!
//! ```text
//! ┌────────────┐        ┌──────────────────────────────────────────────────┐
//! │  cmd::*    │ ─────> │  db.rs  (BoardDb, DbHandle, record CRUD)         │
//! └────────────┘        │    │                                             │
//!                       │    │ Sequencer::reorder_within_group()           │
//!                       │    │ Sequencer::move_across_groups()             │
//!                       │    v                                             │
//!                       │  sequencer.rs  (protocols, retry on conflict)    │
//!                       │    │                                             │
//!                       │    │ AtomicStore::run_atomic()                   │
//!                       │    v                                             │
//!                       │  store.rs  (OrderedCollection, AtomicStore)      │
//!                       │    ├─ db.rs      SqliteCollection (one table)    │
//!                       │    └─ memory.rs  MemoryStore (optimistic)        │
//!                       └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Supporting Modules
//!
//! | Module    | Responsibility                                              |
//! |-----------|-------------------------------------------------------------|
//! | `models`  | `Board`, `Column`, `Task`, view types, input normalization  |
//! | `density` | `PositionPolicy`, target validation, `check_dense`          |
//!
//! ## Typical Flow (`guildboard task move 12 0 --column 4`)
//!
//! 1. `BoardDb::move_task()` builds a `CollectionStore` over the tasks table.
//! 2. `Sequencer::move_across_groups()` opens one SQLite transaction and runs
//!    the move protocol: detach to the sentinel, compact the source column,
//!    open a gap in the destination from the highest position down, settle.
//! 3. A `TransactionConflict` (SQLite busy/locked) reruns the whole
//!    transaction after `retry_backoff`; any other error rolls it back.

pub mod db;
pub mod density;
pub mod memory;
pub mod models;
pub mod sequencer;
pub mod store;

pub use db::{BoardDb, Collection, DbHandle};
pub use density::{DensityViolation, GroupViolation, PositionPolicy};
pub use memory::MemoryStore;
pub use models::{Board, BoardSummary, BoardView, Column, NewTask, Priority, Task, TaskUpdate};
pub use sequencer::{MoveOutcome, Sequencer, SequencerConfig};
pub use store::{AtomicStore, GroupKey, OrderedCollection};
