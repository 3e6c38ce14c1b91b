use content_agent::{ContentGenerator, FailureKind};
use copyloom_core::progress::{ProgressSnapshot, ProgressTiming, ProgressTracker, SystemClock};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

/// Finished runs kept for `/api/progress` lookups. Older ones are evicted as
/// new runs finish; running entries are never evicted.
pub const FINISHED_RUN_LIMIT: usize = 32;

/// Events pushed to `/api/events` subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SseMessage {
    /// Stored data changed (client, knowledge base or content).
    Update,
    Progress {
        run_id: String,
        snapshot: ProgressSnapshot,
    },
    RunStarted {
        run_id: String,
        client: String,
    },
    RunFinished {
        run_id: String,
        status: RunStatus,
    },
}

impl SseMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            SseMessage::Update => "update",
            SseMessage::Progress { .. } => "progress",
            SseMessage::RunStarted { .. } => "run_started",
            SseMessage::RunFinished { .. } => "run_finished",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Succeeded { content_id: String },
    Failed { kind: FailureKind, message: String },
}

/// One generation or chat call in flight (or finished) and its simulated
/// progress.
pub struct RunEntry {
    pub client: String,
    pub tracker: Arc<std::sync::Mutex<ProgressTracker<SystemClock>>>,
    pub status: RunStatus,
    /// Order in which the run finished; `None` while running.
    pub finished_seq: Option<u64>,
}

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub event_tx: broadcast::Sender<SseMessage>,
    pub generator: Arc<dyn ContentGenerator>,
    pub runs: Arc<Mutex<HashMap<String, RunEntry>>>,
    finish_seq: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(root: PathBuf, generator: Arc<dyn ContentGenerator>) -> Self {
        let (tx, _) = broadcast::channel(256);
        Self {
            root,
            event_tx: tx,
            generator,
            runs: Arc::new(Mutex::new(HashMap::new())),
            finish_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Broadcast a change notification. No subscribers is not an error.
    pub fn notify_update(&self) {
        let _ = self.event_tx.send(SseMessage::Update);
    }

    /// Register a new run with an idle tracker and announce it.
    pub async fn register_run(
        &self,
        client: &str,
        steps: &[&str],
        timing: ProgressTiming,
    ) -> (String, Arc<std::sync::Mutex<ProgressTracker<SystemClock>>>) {
        let run_id = generate_run_id();
        let tracker = Arc::new(std::sync::Mutex::new(ProgressTracker::new(
            steps,
            timing,
            SystemClock::new(),
        )));
        self.runs.lock().await.insert(
            run_id.clone(),
            RunEntry {
                client: client.to_string(),
                tracker: tracker.clone(),
                status: RunStatus::Running,
                finished_seq: None,
            },
        );
        let _ = self.event_tx.send(SseMessage::RunStarted {
            run_id: run_id.clone(),
            client: client.to_string(),
        });
        tracing::debug!(run_id = %run_id, client, "run registered");
        (run_id, tracker)
    }

    /// Record the final status of a run, evict the oldest finished runs past
    /// [`FINISHED_RUN_LIMIT`] and announce it.
    pub async fn finish_run(&self, run_id: &str, status: RunStatus) {
        {
            let mut runs = self.runs.lock().await;
            if let Some(entry) = runs.get_mut(run_id) {
                entry.status = status.clone();
                entry.finished_seq = Some(self.finish_seq.fetch_add(1, Ordering::Relaxed));
            }
            evict_finished(&mut runs, FINISHED_RUN_LIMIT);
        }
        let _ = self.event_tx.send(SseMessage::RunFinished {
            run_id: run_id.to_string(),
            status,
        });
    }
}

fn evict_finished(runs: &mut HashMap<String, RunEntry>, keep: usize) {
    let mut finished: Vec<(u64, String)> = runs
        .iter()
        .filter_map(|(id, entry)| entry.finished_seq.map(|seq| (seq, id.clone())))
        .collect();
    if finished.len() <= keep {
        return;
    }
    finished.sort();
    let excess = finished.len() - keep;
    for (_, id) in finished.into_iter().take(excess) {
        runs.remove(&id);
    }
    tracing::debug!(evicted = excess, "finished runs evicted");
}

pub fn generate_run_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
