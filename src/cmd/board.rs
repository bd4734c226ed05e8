//! Board commands: `guildboard board`.

use anyhow::Result;
use console::style;

use guildboard::board::{BoardView, Priority};
use guildboard::config::GuildboardConfig;
use guildboard::{Entity, SequencerError};

use super::super::BoardCommands;
use super::{open_db, print_json, print_move};

pub async fn cmd_board(config: &GuildboardConfig, command: BoardCommands, json: bool) -> Result<()> {
    let db = open_db(config)?;

    match command {
        BoardCommands::Add { title, description } => {
            let board = db
                .call(move |db| db.create_board(&title, description.as_deref()))
                .await?;
            if json {
                return print_json(&board);
            }
            println!(
                "Created board {} {} at position {}",
                board.id,
                style(&board.title).bold(),
                board.position
            );
        }
        BoardCommands::List => {
            let boards = db.call(|db| db.list_boards()).await?;
            if json {
                return print_json(&boards);
            }
            if boards.is_empty() {
                println!("No boards yet. Create one with 'guildboard board add <title>'.");
                return Ok(());
            }
            for summary in &boards {
                println!(
                    "{:>3}  {:<4} {}  {}",
                    summary.board.position,
                    summary.board.id,
                    style(&summary.board.title).bold(),
                    style(format!(
                        "({} columns, {} tasks)",
                        summary.column_count, summary.task_count
                    ))
                    .dim()
                );
            }
        }
        BoardCommands::Show { id } => {
            let view = db
                .call(move |db| db.get_board_view(id))
                .await?
                .ok_or(SequencerError::not_found(Entity::Board, id))?;
            if json {
                return print_json(&view);
            }
            print_view(&view);
        }
        BoardCommands::Edit {
            id,
            title,
            description,
        } => {
            let board = db
                .call(move |db| {
                    let current = db
                        .get_board(id)?
                        .ok_or(SequencerError::not_found(Entity::Board, id))?;
                    let title = title.unwrap_or(current.title);
                    let description = description.or(current.description);
                    db.update_board(id, &title, description.as_deref())
                })
                .await?;
            if json {
                return print_json(&board);
            }
            println!("Updated board {} {}", board.id, style(&board.title).bold());
        }
        BoardCommands::Move { id, position } => {
            let outcome = db.call(move |db| db.move_board(id, position)).await?;
            print_move("Board", &outcome, json)?;
        }
        BoardCommands::Rm { id } => {
            let deleted = db.call(move |db| db.delete_board(id)).await?;
            if !deleted {
                return Err(SequencerError::not_found(Entity::Board, id).into());
            }
            if json {
                return print_json(&serde_json::json!({ "deleted": id }));
            }
            println!("Deleted board {}", id);
        }
    }

    Ok(())
}

fn print_view(view: &BoardView) {
    println!();
    println!("{}", style(&view.board.title).bold().cyan());
    if let Some(description) = &view.board.description {
        println!("{}", style(description).dim());
    }
    for column in &view.columns {
        println!();
        println!(
            "{} {} {}",
            style(format!("[{}]", column.column.id)).dim(),
            style(&column.column.title).bold(),
            style(format!("{} ({})", column.column.color, column.tasks.len())).dim()
        );
        if column.tasks.is_empty() {
            println!("    {}", style("(empty)").dim());
        }
        for task in &column.tasks {
            let priority = match task.priority {
                Priority::High => style("high").red().to_string(),
                Priority::Medium => style("medium").yellow().to_string(),
                Priority::Low => style("low").green().to_string(),
            };
            let due = task
                .due_date
                .map(|d| format!("  due {}", d))
                .unwrap_or_default();
            println!(
                "  {:>2}. {} {}  {}{}",
                task.position,
                style(format!("#{}", task.id)).dim(),
                task.title,
                priority,
                due
            );
        }
    }
    println!();
}
