use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use content_agent::{ContentGenerator, FailureKind};
use copyloom_core::completeness::{self, CompletenessResult};
use copyloom_core::config::ProgressConfig;
use copyloom_core::content::ContentRecord;
use copyloom_core::progress::{ProgressTracker, SystemClock, GENERATION_STEPS};
use copyloom_core::readiness::{can_proceed, GenerationParams, GenerationSelection};
use copyloom_core::store::{FileStore, KnowledgeStore};
use copyloom_core::CopyloomError;
use std::future::Future;
use std::path::Path as FsPath;
use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::state::{AppState, RunStatus, SseMessage};
use crate::ticker::ProgressTicker;

// ---------------------------------------------------------------------------
// Helpers shared with chat
// ---------------------------------------------------------------------------

/// Drive `call` while the tracker's timers publish progress. The timers stop
/// as soon as `call` resolves or this future is dropped; the tracker is then
/// completed and its final snapshot published.
pub(crate) async fn with_progress<T>(
    app: &AppState,
    run_id: &str,
    tracker: Arc<Mutex<ProgressTracker<SystemClock>>>,
    call: impl Future<Output = T>,
) -> T {
    let ticker = ProgressTicker::start(tracker.clone(), app.event_tx.clone(), run_id.to_string());
    let outcome = call.await;
    drop(ticker);

    let snapshot = match tracker.lock() {
        Ok(mut t) => {
            t.complete();
            Some(t.snapshot())
        }
        Err(_) => None,
    };
    if let Some(snapshot) = snapshot {
        let _ = app.event_tx.send(SseMessage::Progress {
            run_id: run_id.to_string(),
            snapshot,
        });
    }
    outcome
}

fn score_client(root: &FsPath, slug: &str) -> copyloom_core::Result<CompletenessResult> {
    let kb = FileStore::new(root).load_knowledge_base(slug)?;
    Ok(completeness::score(kb.as_ref()))
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

/// POST /api/clients/{slug}/readiness: evaluate the generation gate for a
/// selection against the client's current knowledge base.
pub async fn check_readiness(
    State(app): State<AppState>,
    Path(slug): Path<String>,
    Json(mut selection): Json<GenerationSelection>,
) -> Result<Json<serde_json::Value>, AppError> {
    selection.client_id = Some(slug.clone());
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let score = score_client(&root, &slug)?;
        let readiness = can_proceed(&selection, &score);
        let mut json = serde_json::to_value(&readiness)?;
        if let Some(reason) = &readiness.reason {
            json["message"] = serde_json::Value::String(reason.message());
        }
        Ok::<_, CopyloomError>(json)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// POST /api/clients/{slug}/generate: re-check the gate and start a
/// generation run.
///
/// Returns 202 with the run id while the remote call proceeds in the
/// background; progress and the outcome arrive on `/api/events` and
/// `/api/progress/{run_id}`. A blocked selection returns 422 with the reason.
pub async fn generate_content(
    State(app): State<AppState>,
    Path(slug): Path<String>,
    Json(mut selection): Json<GenerationSelection>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    selection.client_id = Some(slug.clone());
    let root = app.root.clone();
    let check_slug = slug.clone();
    let (score, progress) = tokio::task::spawn_blocking(move || {
        let score = score_client(&root, &check_slug)?;
        let progress = ProgressConfig::load_or_default(&root)?;
        Ok::<_, CopyloomError>((score, progress))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    let params = match GenerationParams::from_selection(&selection, &score) {
        Ok(params) => params,
        Err(reason) => {
            tracing::info!(client = %slug, reason = reason.as_str(), "generation blocked");
            let body = serde_json::json!({
                "allowed": false,
                "reason": reason,
                "error": reason.message(),
            });
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(body)));
        }
    };

    let (run_id, tracker) = app
        .register_run(&slug, &GENERATION_STEPS, progress.generation())
        .await;
    tracing::info!(run_id = %run_id, client = %slug, category = %params.category, "generation started");

    let task_app = app.clone();
    let task_run_id = run_id.clone();
    tokio::spawn(async move {
        let outcome = with_progress(
            &task_app,
            &task_run_id,
            tracker,
            task_app.generator.generate_content(&params),
        )
        .await;

        let status = match outcome {
            Ok(created) => {
                let root = task_app.root.clone();
                let record = ContentRecord::new(
                    created.id.clone(),
                    params.client.clone(),
                    params.category,
                    params.objective.clone(),
                );
                let saved = tokio::task::spawn_blocking(move || record.save(&root)).await;
                match saved {
                    Ok(Ok(())) => RunStatus::Succeeded {
                        content_id: created.id,
                    },
                    Ok(Err(e)) => RunStatus::Failed {
                        kind: FailureKind::ServerError,
                        message: format!("content created but not recorded: {e}"),
                    },
                    Err(e) => RunStatus::Failed {
                        kind: FailureKind::ServerError,
                        message: format!("task join error: {e}"),
                    },
                }
            }
            Err(e) => {
                tracing::warn!(run_id = %task_run_id, error = %e, "generation failed");
                RunStatus::Failed {
                    kind: e.kind(),
                    message: e.kind().message().to_string(),
                }
            }
        };

        task_app.finish_run(&task_run_id, status).await;
        task_app.notify_update();
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "run_id": run_id,
            "status": "running",
            "steps": GENERATION_STEPS,
        })),
    ))
}

/// GET /api/progress/{run_id}: current snapshot and status of a run.
pub async fn get_progress(
    State(app): State<AppState>,
    Path(run_id): Path<String>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let runs = app.runs.lock().await;
    let Some(entry) = runs.get(&run_id) else {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": format!("run '{run_id}' not found") })),
        ));
    };

    let snapshot = entry
        .tracker
        .lock()
        .map_err(|_| AppError(anyhow::anyhow!("progress tracker poisoned")))?
        .snapshot();

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "run_id": run_id,
            "client": entry.client,
            "status": entry.status,
            "progress": snapshot,
        })),
    ))
}
