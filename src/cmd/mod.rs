//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module    | Commands handled                          |
//! |-----------|-------------------------------------------|
//! | `init`    | `Init`                                    |
//! | `board`   | `Board`                                   |
//! | `column`  | `Column`                                  |
//! | `task`    | `Task`                                    |
//! | `check`   | `Check`                                   |
//! | `config`  | `Config`                                  |

pub mod board;
pub mod check;
pub mod column;
pub mod config;
pub mod init;
pub mod task;

pub use board::cmd_board;
pub use check::cmd_check;
pub use column::cmd_column;
pub use config::cmd_config;
pub use init::cmd_init;
pub use task::cmd_task;

use anyhow::{Context, Result};
use serde::Serialize;

use guildboard::board::{BoardDb, DbHandle, MoveOutcome, Sequencer};
use guildboard::config::GuildboardConfig;

/// Open (creating if needed) the configured database.
pub fn open_db(config: &GuildboardConfig) -> Result<DbHandle> {
    let db_path = config.db_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let db = BoardDb::new(&db_path, Sequencer::new(config.sequencer_config()))?;
    Ok(DbHandle::new(db))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

pub fn print_move(what: &str, outcome: &MoveOutcome, json: bool) -> Result<()> {
    if json {
        return print_json(outcome);
    }
    if outcome.is_noop() {
        println!("{} {} is already at position {}", what, outcome.item_id, outcome.to.position);
    } else {
        println!(
            "Moved {} {} to position {} ({} shifted)",
            what.to_lowercase(),
            outcome.item_id,
            console::style(outcome.to.position).bold(),
            outcome.shifted
        );
    }
    Ok(())
}
