use crate::output::{print_json, print_table, progress_bar};
use anyhow::Context;
use copyloom_core::completeness;
use copyloom_core::store::{FileStore, KnowledgeStore};
use std::path::Path;

pub fn run(root: &Path, client: &str, json: bool) -> anyhow::Result<()> {
    let kb = FileStore::new(root)
        .load_knowledge_base(client)
        .with_context(|| format!("failed to load knowledge base for '{client}'"))?;
    let score = completeness::score(kb.as_ref());

    if json {
        let mut value = serde_json::to_value(&score)?;
        value["sections"] = serde_json::to_value(score.sections())?;
        print_json(&value)?;
        return Ok(());
    }

    println!(
        "{client}: {} {}/{} checks",
        progress_bar(score.completion_percentage, 20),
        score.filled_fields,
        score.total_fields
    );

    let rows = score
        .sections()
        .iter()
        .map(|s| {
            vec![
                s.section.as_str().to_string(),
                format!("{}/{}", s.filled, s.total),
            ]
        })
        .collect();
    print_table(&["SECTION", "FILLED"], rows);

    if !score.missing_fields.is_empty() {
        println!("\nMissing:");
        for label in &score.missing_fields {
            println!("  - {label}");
        }
    }

    if score.can_generate_content {
        println!("\nReady for content generation.");
    } else {
        println!(
            "\nNot ready: content generation needs at least {}%.",
            completeness::GENERATION_THRESHOLD
        );
    }
    Ok(())
}
