//! Configuration view and validation commands: `guildboard config`.

use anyhow::Result;

use guildboard::config::GuildboardConfig;

use super::super::ConfigCommands;
use super::print_json;

pub fn cmd_config(
    config: &GuildboardConfig,
    command: Option<ConfigCommands>,
    json: bool,
) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            let sequencer = config.sequencer_config();
            if json {
                return print_json(&serde_json::json!({
                    "config_file": config.config_path,
                    "config_file_exists": config.config_path.exists(),
                    "db_path": config.db_path(),
                    "position_policy": sequencer.position_policy,
                    "max_retries": sequencer.max_retries,
                    "retry_backoff_ms": sequencer.retry_backoff.as_millis() as u64,
                    "log_json": config.log_json(),
                    "log_level": config.log_level(),
                }));
            }

            println!();
            println!("Guildboard Configuration");
            println!("========================");
            println!();
            if config.config_path.exists() {
                println!("Config file: {}", config.config_path.display());
            } else {
                println!(
                    "No guildboard.toml found at {} (using defaults)",
                    config.config_path.display()
                );
            }
            println!();
            println!("Effective values (with env/CLI overrides):");
            println!("  db_path = \"{}\"", config.db_path().display());
            println!("  position_policy = \"{}\"", sequencer.position_policy);
            println!("  max_retries = {}", sequencer.max_retries);
            println!("  retry_backoff_ms = {}", sequencer.retry_backoff.as_millis());
            println!("  log_json = {}", config.log_json());
            println!("  log_level = \"{}\"", config.log_level());
            println!();
        }
        Some(ConfigCommands::Validate) => {
            let warnings = config.toml.validate();
            if json {
                return print_json(&warnings);
            }
            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
        }
    }

    Ok(())
}
