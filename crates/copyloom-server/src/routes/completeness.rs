use axum::extract::{Path, State};
use axum::Json;
use copyloom_core::completeness;
use copyloom_core::store::{FileStore, KnowledgeStore};

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/clients/{slug}/completeness: score plus per-section breakdown.
pub async fn get_completeness(
    State(app): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let kb = FileStore::new(&root).load_knowledge_base(&slug)?;
        let score = completeness::score(kb.as_ref());
        let mut json = serde_json::to_value(&score)?;
        json["sections"] = serde_json::to_value(score.sections())?;
        Ok::<_, copyloom_core::CopyloomError>(json)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
