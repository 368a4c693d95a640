//! `relay history`: print recent interactions from the log.

use anyhow::Result;

use context_relay_core::log::InteractionLog;
use context_relay_core::models::StoredInteraction;

use crate::config::Config;
use crate::db;
use crate::migrate::ensure_schema;
use crate::sqlite_log::SqliteInteractionLog;

/// CLI entry point: reads the newest `limit` interactions and prints them.
pub async fn run_history(config: &Config, limit: usize, json: bool) -> Result<()> {
    let pool = db::connect(config).await?;
    ensure_schema(&pool).await?;
    let log = SqliteInteractionLog::new(pool);
    let interactions = log.recent(limit).await?;
    log.pool().close().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&interactions)?);
        return Ok(());
    }

    if interactions.is_empty() {
        println!("No interactions recorded.");
        return Ok(());
    }

    for interaction in &interactions {
        print_interaction(interaction);
    }
    Ok(())
}

fn print_interaction(interaction: &StoredInteraction) {
    let record = &interaction.record;
    println!("--- Interaction {} ---", interaction.id);
    println!(
        "timestamp: {}",
        record.timestamp.format("%Y-%m-%dT%H:%M:%SZ")
    );
    match &record.file {
        Some(file) => println!("file:      {} ({})", file.name, file.category),
        None => println!("file:      (none)"),
    }
    println!("query:     {}", record.query);
    println!("response:  {}", record.response);
    println!();
}
