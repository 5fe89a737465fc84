use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use recetas_proxy::config;
use recetas_proxy::notion::{NotionClient, NotionService};
use recetas_proxy::recipes;

/// Print the recipe summaries of a database, as the list endpoint would.
#[derive(Parser, Debug)]
struct Args {
    /// Path to YAML config; `NOTION_KEY` is honoured either way
    #[arg(long)]
    config: Option<PathBuf>,

    /// Database ID to inspect
    #[arg(long)]
    db_id: String,

    /// Print the raw Notion response instead of summaries
    #[arg(long)]
    raw: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => config::load(Some(path.as_path()))?,
        None => config::Config::default(),
    };
    cfg.apply_env(|key| std::env::var(key).ok());
    let client = NotionClient::from_config(&cfg.notion)?;

    let response = client.query_database(&args.db_id).await?;
    if args.raw {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let entries = recipes::summarize_entries(&response, &cfg.recipes.summary_fields)?;
    println!("Database ID: {}", args.db_id);
    println!("Entries: {}", entries.len());
    for entry in entries {
        let tags: Vec<&str> = entry.tags.iter().map(|t| t.name.as_str()).collect();
        println!("  {} {} [{}] ({})", entry.id, entry.name, tags.join(", "), entry.created_time);
    }
    Ok(())
}
