use axum::extract::{Path, State};
use axum::Json;
use copyloom_core::client::Client;
use copyloom_core::completeness;
use copyloom_core::knowledge::{KnowledgeBase, KnowledgeEdit};
use copyloom_core::store::{FileStore, KnowledgeStore};
use std::path::Path as FsPath;

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct EditsBody {
    pub edits: Vec<KnowledgeEdit>,
}

fn knowledge_json(kb: &KnowledgeBase, persisted: bool) -> serde_json::Value {
    serde_json::json!({
        "knowledge_base": kb,
        "persisted": persisted,
        "completeness": completeness::score(Some(kb)),
    })
}

fn save_and_touch(
    root: &FsPath,
    slug: &str,
    kb: &KnowledgeBase,
) -> copyloom_core::Result<KnowledgeBase> {
    let saved = FileStore::new(root).save_knowledge_base(slug, kb)?;
    let mut client = Client::load(root, slug)?;
    client.touch();
    client.save(root)?;
    Ok(saved)
}

/// GET /api/clients/{slug}/knowledge: the stored knowledge base, or an empty
/// draft when none has been saved yet.
pub async fn get_knowledge(
    State(app): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let stored = FileStore::new(&root).load_knowledge_base(&slug)?;
        let persisted = stored.is_some();
        let kb = stored.unwrap_or_default();
        Ok::<_, copyloom_core::CopyloomError>(knowledge_json(&kb, persisted))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// PUT /api/clients/{slug}/knowledge: replace the whole knowledge base.
pub async fn put_knowledge(
    State(app): State<AppState>,
    Path(slug): Path<String>,
    Json(kb): Json<KnowledgeBase>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let saved = save_and_touch(&root, &slug, &kb)?;
        tracing::info!(client = %slug, "knowledge base replaced");
        Ok::<_, copyloom_core::CopyloomError>(knowledge_json(&saved, true))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.notify_update();
    Ok(Json(result))
}

/// POST /api/clients/{slug}/knowledge/edits: apply typed edits in order and
/// save. Nothing is written when any edit fails.
pub async fn apply_edits(
    State(app): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<EditsBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let store = FileStore::new(&root);
        let mut kb = store.load_knowledge_base(&slug)?.unwrap_or_default();
        let count = body.edits.len();
        kb.apply_all(body.edits)?;
        let saved = save_and_touch(&root, &slug, &kb)?;
        tracing::info!(client = %slug, edits = count, "knowledge base edited");
        Ok::<_, copyloom_core::CopyloomError>(knowledge_json(&saved, true))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.notify_update();
    Ok(Json(result))
}
