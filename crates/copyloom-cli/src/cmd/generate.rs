use crate::cmd::readiness::{score_client, SelectionArgs};
use crate::output::{print_json, progress_bar};
use anyhow::Context;
use content_agent::ContentGenerator;
use copyloom_core::config::ProgressConfig;
use copyloom_core::content::ContentRecord;
use copyloom_core::progress::{
    ProgressState, ProgressTiming, ProgressTracker, SystemClock, GENERATION_STEPS,
};
use copyloom_core::readiness::GenerationParams;
use copyloom_server::state::SseMessage;
use copyloom_server::ticker::ProgressTicker;
use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Await `call` while printing step changes to stderr. Nothing is printed in
/// JSON mode so stdout stays parseable.
pub async fn with_terminal_progress<T>(
    steps: &[&str],
    timing: ProgressTiming,
    quiet: bool,
    call: impl Future<Output = T>,
) -> T {
    let tracker = Arc::new(Mutex::new(ProgressTracker::new(
        steps,
        timing,
        SystemClock::new(),
    )));
    let (tx, mut rx) = broadcast::channel(64);
    let ticker = ProgressTicker::start(tracker, tx, "cli".to_string());

    let printer = tokio::spawn(async move {
        let mut last = None;
        while let Ok(SseMessage::Progress { snapshot, .. }) = rx.recv().await {
            if quiet || last == Some(snapshot.state) {
                continue;
            }
            last = Some(snapshot.state);
            match snapshot.state {
                ProgressState::Stepping(i) => {
                    if let Some(step) = snapshot.steps.get(i) {
                        eprintln!("  [{}/{}] {}", i + 1, snapshot.steps.len(), step.label);
                    }
                }
                ProgressState::BarFilling(v) => eprintln!("  {}", progress_bar(v, 20)),
                _ => {}
            }
        }
    });

    let outcome = call.await;
    drop(ticker);
    printer.abort();
    outcome
}

pub fn run(root: &Path, client: &str, args: SelectionArgs, json: bool) -> anyhow::Result<()> {
    let score = score_client(root, client)?;
    let params = GenerationParams::from_selection(&args.into_selection(client), &score)
        .map_err(|reason| anyhow::anyhow!("generation blocked: {}", reason.message()))?;
    let timing = ProgressConfig::load_or_default(root)
        .context("failed to load config")?
        .generation();
    let generator = copyloom_server::http_generator(root)?;

    if !json {
        eprintln!("Generating {} for {client}...", params.category);
    }

    let rt = tokio::runtime::Runtime::new()?;
    let created = rt
        .block_on(with_terminal_progress(
            &GENERATION_STEPS,
            timing,
            json,
            generator.generate_content(&params),
        ))
        .map_err(|e| anyhow::anyhow!("{} ({e})", e.kind().message()))?;

    let record = ContentRecord::new(
        created.id.clone(),
        params.client.clone(),
        params.category,
        params.objective.clone(),
    );
    record.save(root).context("failed to record generated content")?;
    tracing::info!(client, content = %record.id, "content generated");

    if json {
        print_json(&record)?;
    } else {
        println!("Created content: {}", record.id);
        println!("Next: copyloom chat {client} {} \"...\"", record.id);
    }
    Ok(())
}
