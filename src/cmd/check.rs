//! Density check: `guildboard check`.

use anyhow::Result;
use console::style;

use guildboard::config::GuildboardConfig;

use super::{open_db, print_json};

/// Print every density violation. Returns `true` when there are none.
pub async fn cmd_check(config: &GuildboardConfig, json: bool) -> Result<bool> {
    let db = open_db(config)?;
    let violations = db.call(|db| db.check_integrity()).await?;

    if json {
        print_json(&violations)?;
        return Ok(violations.is_empty());
    }

    if violations.is_empty() {
        println!("{}", style("All groups are dense.").green());
        return Ok(true);
    }

    println!("{}", style("Density violations:").red().bold());
    for violation in &violations {
        println!("  - {}", violation);
    }
    Ok(false)
}
