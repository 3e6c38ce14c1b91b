use axum::extract::{Path, State};
use axum::Json;
use copyloom_core::content::{ChatMessage, ContentRecord};
use content_agent::{ContentAgentError, ContentGenerator, FailureKind};
use copyloom_core::config::ProgressConfig;
use copyloom_core::progress::{ProgressTracker, SystemClock, CHAT_STEPS};
use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::routes::generate::with_progress;
use crate::state::{AppState, RunStatus};

#[derive(serde::Deserialize)]
pub struct ChatBody {
    pub message: String,
}

/// GET /api/clients/{slug}/contents: content records, newest first.
pub async fn list_contents(
    State(app): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let records = ContentRecord::list(&root, &slug)?;
        let list: Vec<serde_json::Value> = records
            .iter()
            .map(|r| {
                serde_json::json!({
                    "id": r.id,
                    "category": r.category,
                    "objective": r.objective,
                    "created_at": r.created_at,
                    "message_count": r.messages.len(),
                    "last_reply": r.last_reply().map(|m| &m.content),
                })
            })
            .collect();
        Ok::<_, copyloom_core::CopyloomError>(serde_json::json!(list))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// POST /api/contents/{client}/{id}/chat: send a refinement request and wait
/// for the reply. Progress for the call is published on `/api/events` under
/// the returned run id.
pub async fn send_chat(
    State(app): State<AppState>,
    Path((client, id)): Path<(String, String)>,
    Json(body): Json<ChatBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let message = body.message.trim().to_string();
    if message.is_empty() {
        return Err(AppError::bad_request("message must not be empty"));
    }

    let root = app.root.clone();
    let (load_client, load_id) = (client.clone(), id.clone());
    let (record, progress) = tokio::task::spawn_blocking(move || {
        let record = ContentRecord::load(&root, &load_client, &load_id)?;
        let progress = ProgressConfig::load_or_default(&root)?;
        Ok::<_, copyloom_core::CopyloomError>((record, progress))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    let (run_id, tracker) = app.register_run(&client, &CHAT_STEPS, progress.chat()).await;

    // Spawned so the run still reaches a final status if the request is
    // dropped mid-call.
    let task_app = app.clone();
    let task_run_id = run_id.clone();
    let work = tokio::spawn(async move {
        let outcome = run_chat(&task_app, &task_run_id, tracker, id, message, record).await;
        let status = match &outcome {
            Ok((_, saved)) => RunStatus::Succeeded {
                content_id: saved.id.clone(),
            },
            Err(e) => {
                tracing::warn!(run_id = %task_run_id, error = %e, "chat failed");
                failed_status(e)
            }
        };
        task_app.finish_run(&task_run_id, status).await;
        outcome
    });

    let (reply, saved) = work
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?
        .map_err(AppError)?;
    app.notify_update();

    Ok(Json(serde_json::json!({
        "run_id": run_id,
        "reply": reply,
        "messages": saved.messages,
    })))
}

async fn run_chat(
    app: &AppState,
    run_id: &str,
    tracker: Arc<Mutex<ProgressTracker<SystemClock>>>,
    id: String,
    message: String,
    mut record: ContentRecord,
) -> anyhow::Result<(ChatMessage, ContentRecord)> {
    let reply = with_progress(
        app,
        run_id,
        tracker,
        app.generator.send_chat_message(&id, &message),
    )
    .await?;

    record.push_message(ChatMessage::from_user(message));
    record.push_message(reply.clone());
    let root = app.root.clone();
    let saved = tokio::task::spawn_blocking(move || record.save(&root).map(|_| record))
        .await
        .map_err(|e| anyhow::anyhow!("task join error: {e}"))??;
    Ok((reply, saved))
}

fn failed_status(e: &anyhow::Error) -> RunStatus {
    match e.downcast_ref::<ContentAgentError>() {
        Some(agent) => RunStatus::Failed {
            kind: agent.kind(),
            message: agent.kind().message().to_string(),
        },
        None => RunStatus::Failed {
            kind: FailureKind::ServerError,
            message: format!("{e:#}"),
        },
    }
}
