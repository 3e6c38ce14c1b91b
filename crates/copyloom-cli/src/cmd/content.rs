use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use copyloom_core::content::ContentRecord;
use std::path::Path;

#[derive(Subcommand)]
pub enum ContentSubcommand {
    /// List generated content for a client, newest first
    List { client: String },
    /// Show a content record and its conversation
    Show { client: String, id: String },
}

pub fn run(root: &Path, subcmd: ContentSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ContentSubcommand::List { client } => list(root, &client, json),
        ContentSubcommand::Show { client, id } => show(root, &client, &id, json),
    }
}

fn list(root: &Path, client: &str, json: bool) -> anyhow::Result<()> {
    let records = ContentRecord::list(root, client)
        .with_context(|| format!("failed to list content for '{client}'"))?;

    if json {
        return print_json(&records);
    }
    if records.is_empty() {
        println!("No content yet.");
        return Ok(());
    }

    let rows = records
        .iter()
        .map(|r| {
            vec![
                r.id.clone(),
                r.category.to_string(),
                r.created_at.format("%Y-%m-%d %H:%M").to_string(),
                r.messages.len().to_string(),
                r.objective.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "CATEGORY", "CREATED", "MSGS", "OBJECTIVE"], rows);
    Ok(())
}

fn show(root: &Path, client: &str, id: &str, json: bool) -> anyhow::Result<()> {
    let record = ContentRecord::load(root, client, id)
        .with_context(|| format!("content '{id}' not found for '{client}'"))?;

    if json {
        return print_json(&record);
    }

    println!("Content: {} ({})", record.id, record.category);
    if !record.objective.is_empty() {
        println!("Objective: {}", record.objective);
    }
    for m in &record.messages {
        println!("\n[{}] {}", m.sender, m.timestamp.format("%H:%M"));
        println!("{}", m.content);
    }
    Ok(())
}
