use crate::output::{print_json, print_yaml};
use anyhow::Context;
use clap::Subcommand;
use copyloom_core::client::Client;
use copyloom_core::completeness;
use copyloom_core::knowledge::{KnowledgeBase, KnowledgeEdit};
use copyloom_core::store::{FileStore, KnowledgeStore};
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum KbSubcommand {
    /// Print a client's knowledge base
    Show { client: String },
    /// Apply one edit and save
    ///
    /// OP is the edit name, e.g. set_value_proposition, add_faq or
    /// remove_product. VALUE is parsed as JSON when it is valid JSON
    /// (indexes, objects) and used as a plain string otherwise.
    Edit {
        client: String,
        op: String,
        value: Option<String>,
    },
    /// Replace a client's knowledge base with a YAML or JSON file
    Import { client: String, file: PathBuf },
}

pub fn run(root: &Path, subcmd: KbSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        KbSubcommand::Show { client } => show(root, &client, json),
        KbSubcommand::Edit { client, op, value } => edit(root, &client, &op, value, json),
        KbSubcommand::Import { client, file } => import(root, &client, &file, json),
    }
}

/// Build a typed edit from command-line words. The value is tried as JSON
/// first and as a plain string second, so `remove_faq 2` and
/// `set_market 2026` both do what they say.
pub fn parse_edit(op: &str, value: Option<&str>) -> anyhow::Result<KnowledgeEdit> {
    let Some(raw) = value else {
        return serde_json::from_value(serde_json::json!({ "op": op }))
            .with_context(|| format!("invalid edit '{op}'"));
    };

    if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(raw) {
        if let Ok(edit) = serde_json::from_value(serde_json::json!({ "op": op, "value": parsed })) {
            return Ok(edit);
        }
    }
    serde_json::from_value(serde_json::json!({ "op": op, "value": raw }))
        .with_context(|| format!("invalid edit '{op}' with value '{raw}'"))
}

fn save(root: &Path, client: &str, kb: &KnowledgeBase) -> anyhow::Result<()> {
    FileStore::new(root)
        .save_knowledge_base(client, kb)
        .with_context(|| format!("failed to save knowledge base for '{client}'"))?;
    let mut record = Client::load(root, client)?;
    record.touch();
    record.save(root)?;
    Ok(())
}

fn report(kb: &KnowledgeBase, json: bool, done: &str) -> anyhow::Result<()> {
    let score = completeness::score(Some(kb));
    if json {
        print_json(&serde_json::json!({
            "knowledge_base": kb,
            "completeness": score,
        }))?;
    } else {
        println!("{done}");
        println!(
            "Knowledge base: {}% ({}/{})",
            score.completion_percentage, score.filled_fields, score.total_fields
        );
    }
    Ok(())
}

fn show(root: &Path, client: &str, json: bool) -> anyhow::Result<()> {
    let kb = FileStore::new(root)
        .load_knowledge_base(client)
        .with_context(|| format!("failed to load knowledge base for '{client}'"))?
        .unwrap_or_default();

    if json {
        print_json(&kb)
    } else {
        print_yaml(&kb)
    }
}

fn edit(
    root: &Path,
    client: &str,
    op: &str,
    value: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let edit = parse_edit(op, value.as_deref())?;
    let store = FileStore::new(root);
    let mut kb = store.load_knowledge_base(client)?.unwrap_or_default();
    kb.apply(edit)?;
    save(root, client, &kb)?;
    tracing::debug!(client, op, "knowledge base edited");
    report(&kb, json, &format!("Applied {op} to {client}"))
}

fn import(root: &Path, client: &str, file: &Path, json: bool) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    // YAML is a superset of JSON, so one parser covers both.
    let kb: KnowledgeBase = serde_yaml::from_str(&data)
        .with_context(|| format!("failed to parse {}", file.display()))?;
    save(root, client, &kb)?;
    report(&kb, json, &format!("Imported {} into {client}", file.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use copyloom_core::knowledge::{Faq, PersonalityScale};

    #[test]
    fn plain_words_become_strings() {
        assert_eq!(
            parse_edit("set_sector", Some("Fintech")).unwrap(),
            KnowledgeEdit::SetSector("Fintech".into())
        );
    }

    #[test]
    fn numbers_become_indexes() {
        assert_eq!(
            parse_edit("remove_faq", Some("2")).unwrap(),
            KnowledgeEdit::RemoveFaq(2)
        );
    }

    #[test]
    fn objects_become_structured_values() {
        let edit = parse_edit(
            "add_faq",
            Some(r#"{"question":"Pricing?","answer":"Flat fee"}"#),
        )
        .unwrap();
        assert_eq!(
            edit,
            KnowledgeEdit::AddFaq(Faq {
                question: "Pricing?".into(),
                answer: "Flat fee".into(),
            })
        );

        let edit = parse_edit(
            "set_personality",
            Some(r#"{"scale":"formal_vs_informal","value":80}"#),
        )
        .unwrap();
        assert_eq!(
            edit,
            KnowledgeEdit::SetPersonality {
                scale: PersonalityScale::FormalVsInformal,
                value: 80
            }
        );
    }

    #[test]
    fn numeric_text_falls_back_to_string() {
        assert_eq!(
            parse_edit("set_market", Some("2026")).unwrap(),
            KnowledgeEdit::SetMarket("2026".into())
        );
    }

    #[test]
    fn unknown_op_is_an_error() {
        assert!(parse_edit("set_mood", Some("happy")).is_err());
    }
}
