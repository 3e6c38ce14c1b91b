use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use copyloom_core::client::Client;
use copyloom_core::completeness;
use copyloom_core::store::{FileStore, KnowledgeStore};

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct CreateClientBody {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// GET /api/clients: list all clients with their completion percentage.
pub async fn list_clients(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let store = FileStore::new(&root);
        let clients = Client::list(&root)?;
        let mut list = Vec::with_capacity(clients.len());
        for c in clients {
            let kb = store.load_knowledge_base(&c.slug)?;
            let score = completeness::score(kb.as_ref());
            list.push(serde_json::json!({
                "slug": c.slug,
                "name": c.name,
                "description": c.description,
                "completion_percentage": score.completion_percentage,
                "can_generate_content": score.can_generate_content,
                "updated_at": c.updated_at,
            }));
        }
        Ok::<_, copyloom_core::CopyloomError>(serde_json::json!(list))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// POST /api/clients: create a client with an empty knowledge base.
pub async fn create_client(
    State(app): State<AppState>,
    Json(body): Json<CreateClientBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let name = body.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::bad_request("client name must not be empty"));
    }

    let root = app.root.clone();
    let client = tokio::task::spawn_blocking(move || {
        Client::create(&root, body.slug, name, body.description)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    tracing::info!(client = %client.slug, "client created");
    app.notify_update();
    Ok((StatusCode::CREATED, Json(serde_json::to_value(&client)?)))
}

/// GET /api/clients/{slug}: client detail with its completeness result.
pub async fn get_client(
    State(app): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let client = Client::load(&root, &slug)?;
        let kb = FileStore::new(&root).load_knowledge_base(&slug)?;
        let score = completeness::score(kb.as_ref());
        Ok::<_, copyloom_core::CopyloomError>(serde_json::json!({
            "slug": client.slug,
            "name": client.name,
            "description": client.description,
            "created_at": client.created_at,
            "updated_at": client.updated_at,
            "completeness": score,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
