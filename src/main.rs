use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use guildboard::config::GuildboardConfig;

mod cmd;

#[derive(Parser)]
#[command(name = "guildboard")]
#[command(version, about = "Kanban boards, columns and tasks with dense ordering")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print records as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Database path. Overrides GUILDBOARD_DB and guildboard.toml.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Config file (defaults to .guildboard/guildboard.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and a default guildboard.toml
    Init,
    /// Manage boards
    Board {
        #[command(subcommand)]
        command: BoardCommands,
    },
    /// Manage the columns of a board
    Column {
        #[command(subcommand)]
        command: ColumnCommands,
    },
    /// Manage tasks
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Report groups whose positions are not 0..N-1
    Check,
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum BoardCommands {
    /// Create a board with the default columns
    Add {
        title: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List boards in order
    List,
    /// Show a board with its columns and tasks
    Show { id: i64 },
    /// Change a board's title or description
    Edit {
        id: i64,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Move a board to a new position
    Move { id: i64, position: i64 },
    /// Delete a board with its columns and tasks
    Rm { id: i64 },
}

#[derive(Subcommand, Clone)]
pub enum ColumnCommands {
    /// Append a column to a board
    Add {
        board: i64,
        title: String,
        /// Hex color, #rgb or #rrggbb
        #[arg(short, long)]
        color: Option<String>,
    },
    /// Move a column within its board
    Move { id: i64, position: i64 },
    /// Delete a column with its tasks
    Rm { id: i64 },
}

#[derive(Subcommand, Clone)]
pub enum TaskCommands {
    /// Append a task to a column
    Add {
        column: i64,
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        /// low, medium or high
        #[arg(short, long, default_value = "medium")]
        priority: String,
        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
    },
    /// Change a task's fields
    Edit {
        id: i64,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        priority: Option<String>,
        #[arg(long, conflicts_with = "no_due")]
        due: Option<String>,
        /// Remove the due date
        #[arg(long)]
        no_due: bool,
    },
    /// Move a task within its column, or into another column
    Move {
        id: i64,
        position: i64,
        #[arg(short, long)]
        column: Option<i64>,
    },
    /// Delete a task
    Rm { id: i64 },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let config = GuildboardConfig::with_cli_args(
        project_dir,
        cli.config.clone(),
        cli.db.clone(),
        cli.verbose,
    )?;
    guildboard::logging::init_tracing(config.log_level(), config.log_json());

    match &cli.command {
        Commands::Init => cmd::cmd_init(&config)?,
        Commands::Board { command } => cmd::cmd_board(&config, command.clone(), cli.json).await?,
        Commands::Column { command } => {
            cmd::cmd_column(&config, command.clone(), cli.json).await?
        }
        Commands::Task { command } => cmd::cmd_task(&config, command.clone(), cli.json).await?,
        Commands::Check => {
            let clean = cmd::cmd_check(&config, cli.json).await?;
            if !clean {
                std::process::exit(1);
            }
        }
        Commands::Config { command } => cmd::cmd_config(&config, command.clone(), cli.json)?,
    }

    Ok(())
}
