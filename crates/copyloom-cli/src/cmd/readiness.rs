use crate::output::print_json;
use anyhow::Context;
use clap::Args;
use copyloom_core::completeness::{self, CompletenessResult};
use copyloom_core::readiness::{can_proceed, GenerationSelection};
use copyloom_core::store::{FileStore, KnowledgeStore};
use copyloom_core::types::SourceType;
use std::path::Path;

/// The generation form, as flags.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Content category: post, carousel, script_short, script_youtube, blog, email
    #[arg(long)]
    pub category: Option<String>,

    /// Source type: text, news, trend or url
    #[arg(long = "source-type", value_name = "TYPE")]
    pub source_type: Option<SourceType>,

    /// Source value (headline, trend or URL) for non-text sources
    #[arg(long, default_value = "")]
    pub source: String,

    /// Free-text context for the piece
    #[arg(long, default_value = "")]
    pub context: String,

    #[arg(long, default_value = "")]
    pub objective: String,
}

impl SelectionArgs {
    pub fn into_selection(self, client: &str) -> GenerationSelection {
        GenerationSelection {
            client_id: Some(client.to_string()),
            content_category: self.category,
            source_type: self.source_type,
            source_value: self.source,
            context_text: self.context,
            objective: self.objective,
        }
    }
}

pub fn score_client(root: &Path, client: &str) -> anyhow::Result<CompletenessResult> {
    let kb = FileStore::new(root)
        .load_knowledge_base(client)
        .with_context(|| format!("failed to load knowledge base for '{client}'"))?;
    Ok(completeness::score(kb.as_ref()))
}

pub fn run(root: &Path, client: &str, args: SelectionArgs, json: bool) -> anyhow::Result<()> {
    let score = score_client(root, client)?;
    let readiness = can_proceed(&args.into_selection(client), &score);

    if json {
        let mut value = serde_json::to_value(&readiness)?;
        if let Some(reason) = &readiness.reason {
            value["message"] = serde_json::Value::String(reason.message());
        }
        return print_json(&value);
    }

    match &readiness.reason {
        None => println!("Ready: {client} can generate this piece."),
        Some(reason) => println!("Blocked ({}): {}", reason.as_str(), reason.message()),
    }
    Ok(())
}
