use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use copyloom_core::client::Client;
use copyloom_core::completeness;
use copyloom_core::store::{FileStore, KnowledgeStore};
use std::path::Path;

#[derive(Subcommand)]
pub enum ClientSubcommand {
    /// Create a client with an empty knowledge base
    Create {
        slug: String,
        /// Display name (defaults to the slug)
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// List all clients
    List,
    /// Show client details
    Show { slug: String },
}

pub fn run(root: &Path, subcmd: ClientSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ClientSubcommand::Create {
            slug,
            name,
            description,
        } => create(root, &slug, name, description, json),
        ClientSubcommand::List => list(root, json),
        ClientSubcommand::Show { slug } => show(root, &slug, json),
    }
}

fn create(
    root: &Path,
    slug: &str,
    name: Option<String>,
    description: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let name = name.unwrap_or_else(|| slug.replace('-', " "));
    let client = Client::create(root, slug, &name, description)
        .with_context(|| format!("failed to create client '{slug}'"))?;

    if json {
        print_json(&client)?;
    } else {
        println!("Created client: {slug} ({name})");
        println!("Next: copyloom kb edit {slug} set_value_proposition \"...\"");
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let clients = Client::list(root).context("failed to list clients")?;
    let store = FileStore::new(root);

    let mut rows = Vec::with_capacity(clients.len());
    let mut summaries = Vec::with_capacity(clients.len());
    for c in &clients {
        let kb = store.load_knowledge_base(&c.slug)?;
        let score = completeness::score(kb.as_ref());
        rows.push(vec![
            c.slug.clone(),
            format!("{}%", score.completion_percentage),
            if score.can_generate_content { "yes" } else { "no" }.to_string(),
            c.name.clone(),
        ]);
        summaries.push(serde_json::json!({
            "slug": c.slug,
            "name": c.name,
            "completion_percentage": score.completion_percentage,
            "can_generate_content": score.can_generate_content,
        }));
    }

    if json {
        print_json(&summaries)?;
    } else if clients.is_empty() {
        println!("No clients yet.");
    } else {
        print_table(&["SLUG", "KB", "READY", "NAME"], rows);
    }
    Ok(())
}

fn show(root: &Path, slug: &str, json: bool) -> anyhow::Result<()> {
    let client =
        Client::load(root, slug).with_context(|| format!("client '{slug}' not found"))?;
    let kb = FileStore::new(root).load_knowledge_base(slug)?;
    let score = completeness::score(kb.as_ref());

    if json {
        print_json(&serde_json::json!({
            "client": client,
            "completeness": score,
        }))?;
        return Ok(());
    }

    println!("Client: {} ({})", client.slug, client.name);
    if let Some(desc) = &client.description {
        println!("Description: {desc}");
    }
    println!(
        "Knowledge base: {}% ({}/{})",
        score.completion_percentage, score.filled_fields, score.total_fields
    );
    println!("Updated: {}", client.updated_at.format("%Y-%m-%d %H:%M"));
    Ok(())
}
