use crate::cmd::generate::with_terminal_progress;
use crate::output::print_json;
use anyhow::Context;
use copyloom_core::config::ProgressConfig;
use copyloom_core::content::{ChatMessage, ContentRecord};
use content_agent::ContentGenerator;
use copyloom_core::progress::CHAT_STEPS;
use std::path::Path;

pub fn run(
    root: &Path,
    client: &str,
    content_id: &str,
    message: &str,
    json: bool,
) -> anyhow::Result<()> {
    let message = message.trim();
    if message.is_empty() {
        anyhow::bail!("message must not be empty");
    }

    let mut record = ContentRecord::load(root, client, content_id)
        .with_context(|| format!("content '{content_id}' not found for '{client}'"))?;
    let timing = ProgressConfig::load_or_default(root)
        .context("failed to load config")?
        .chat();
    let generator = copyloom_server::http_generator(root)?;

    let rt = tokio::runtime::Runtime::new()?;
    let reply = rt
        .block_on(with_terminal_progress(
            &CHAT_STEPS,
            timing,
            json,
            generator.send_chat_message(content_id, message),
        ))
        .map_err(|e| anyhow::anyhow!("{} ({e})", e.kind().message()))?;

    record.push_message(ChatMessage::from_user(message));
    record.push_message(reply.clone());
    record.save(root).context("failed to save conversation")?;

    if json {
        print_json(&reply)?;
    } else {
        println!("{}", reply.content);
    }
    Ok(())
}
