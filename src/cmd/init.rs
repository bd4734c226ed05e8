//! Project initialization: `guildboard init`.

use anyhow::{Context, Result};

use guildboard::config::{GuildboardConfig, GuildboardToml};

pub fn cmd_init(config: &GuildboardConfig) -> Result<()> {
    if let Some(dir) = config.config_path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    if config.config_path.exists() {
        println!("Config already exists at {}", config.config_path.display());
    } else {
        GuildboardToml::default().save(&config.config_path)?;
        println!("Created {}", config.config_path.display());
    }

    super::open_db(config)?;
    println!("Database ready at {}", config.db_path().display());
    Ok(())
}
