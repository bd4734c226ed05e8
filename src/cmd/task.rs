//! Task commands: `guildboard task`.

use anyhow::{Result, anyhow};
use console::style;

use guildboard::board::models::parse_due_date;
use guildboard::board::{NewTask, Priority, TaskUpdate};
use guildboard::config::GuildboardConfig;
use guildboard::{Entity, SequencerError};

use super::super::TaskCommands;
use super::{open_db, print_json, print_move};

fn parse_priority(value: &str) -> Result<Priority> {
    value.parse::<Priority>().map_err(|e| anyhow!(e))
}

pub async fn cmd_task(config: &GuildboardConfig, command: TaskCommands, json: bool) -> Result<()> {
    let db = open_db(config)?;

    match command {
        TaskCommands::Add {
            column,
            title,
            description,
            priority,
            due,
        } => {
            let new = NewTask {
                column_id: column,
                title,
                description,
                priority: parse_priority(&priority)?,
                due_date: due.as_deref().map(parse_due_date).transpose()?,
            };
            let task = db.call(move |db| db.create_task(&new)).await?;
            if json {
                return print_json(&task);
            }
            println!(
                "Created task {} {} in column {} at position {}",
                task.id,
                style(&task.title).bold(),
                task.column_id,
                task.position
            );
        }
        TaskCommands::Edit {
            id,
            title,
            description,
            priority,
            due,
            no_due,
        } => {
            let priority = priority.as_deref().map(parse_priority).transpose()?;
            let due = due.as_deref().map(parse_due_date).transpose()?;
            let task = db
                .call(move |db| {
                    let current = db
                        .get_task(id)?
                        .ok_or(SequencerError::not_found(Entity::Task, id))?;
                    let update = TaskUpdate {
                        title: title.unwrap_or(current.title),
                        description: description.or(current.description),
                        priority: priority.unwrap_or(current.priority),
                        due_date: if no_due { None } else { due.or(current.due_date) },
                    };
                    db.update_task(id, &update)
                })
                .await?;
            if json {
                return print_json(&task);
            }
            println!("Updated task {} {}", task.id, style(&task.title).bold());
        }
        TaskCommands::Move {
            id,
            position,
            column,
        } => {
            let outcome = db.call(move |db| db.move_task(id, column, position)).await?;
            print_move("Task", &outcome, json)?;
        }
        TaskCommands::Rm { id } => {
            let deleted = db.call(move |db| db.delete_task(id)).await?;
            if !deleted {
                return Err(SequencerError::not_found(Entity::Task, id).into());
            }
            if json {
                return print_json(&serde_json::json!({ "deleted": id }));
            }
            println!("Deleted task {}", id);
        }
    }

    Ok(())
}
