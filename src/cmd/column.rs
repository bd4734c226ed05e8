//! Column commands: `guildboard column`.

use anyhow::Result;
use console::style;

use guildboard::config::GuildboardConfig;
use guildboard::{Entity, SequencerError};

use super::super::ColumnCommands;
use super::{open_db, print_json, print_move};

pub async fn cmd_column(
    config: &GuildboardConfig,
    command: ColumnCommands,
    json: bool,
) -> Result<()> {
    let db = open_db(config)?;

    match command {
        ColumnCommands::Add {
            board,
            title,
            color,
        } => {
            let column = db
                .call(move |db| db.add_column(board, &title, color.as_deref()))
                .await?;
            if json {
                return print_json(&column);
            }
            println!(
                "Added column {} {} to board {} at position {}",
                column.id,
                style(&column.title).bold(),
                column.board_id,
                column.position
            );
        }
        ColumnCommands::Move { id, position } => {
            let outcome = db.call(move |db| db.move_column(id, position)).await?;
            print_move("Column", &outcome, json)?;
        }
        ColumnCommands::Rm { id } => {
            let deleted = db.call(move |db| db.delete_column(id)).await?;
            if !deleted {
                return Err(SequencerError::not_found(Entity::Column, id).into());
            }
            if json {
                return print_json(&serde_json::json!({ "deleted": id }));
            }
            println!("Deleted column {}", id);
        }
    }

    Ok(())
}
