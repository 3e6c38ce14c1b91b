pub mod error;
pub mod routes;
pub mod state;
pub mod ticker;

use axum::routing::{get, post};
use axum::Router;
use content_agent::{ContentGenerator, HttpContentClient};
use copyloom_core::config::{Config, GenerationConfig};
use copyloom_core::CopyloomError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the HTTP client for the remote content service from the workspace
/// config. An uninitialized workspace falls back to the default settings.
pub fn http_generator(root: &Path) -> anyhow::Result<Arc<dyn ContentGenerator>> {
    let generation = match Config::load(root) {
        Ok(config) => config.generation,
        Err(CopyloomError::NotInitialized) => GenerationConfig::default(),
        Err(e) => return Err(e.into()),
    };

    let mut client = HttpContentClient::with_timeout(
        generation.base_url.clone(),
        Duration::from_secs(generation.timeout_seconds),
    )?;
    match generation.api_key() {
        Some(key) => client = client.with_api_key(key),
        None => tracing::warn!(
            env = %generation.api_key_env,
            "no API key set; remote calls will be unauthenticated"
        ),
    }
    Ok(Arc::new(client))
}

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(root: PathBuf, generator: Arc<dyn ContentGenerator>) -> Router {
    let app_state = state::AppState::new(root, generator);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Events (SSE)
        .route("/api/events", get(routes::events::sse_events))
        // Clients
        .route(
            "/api/clients",
            get(routes::clients::list_clients).post(routes::clients::create_client),
        )
        .route("/api/clients/{slug}", get(routes::clients::get_client))
        // Knowledge base
        .route(
            "/api/clients/{slug}/knowledge",
            get(routes::knowledge::get_knowledge).put(routes::knowledge::put_knowledge),
        )
        .route(
            "/api/clients/{slug}/knowledge/edits",
            post(routes::knowledge::apply_edits),
        )
        .route(
            "/api/clients/{slug}/completeness",
            get(routes::completeness::get_completeness),
        )
        // Generation
        .route(
            "/api/clients/{slug}/readiness",
            post(routes::generate::check_readiness),
        )
        .route(
            "/api/clients/{slug}/generate",
            post(routes::generate::generate_content),
        )
        .route(
            "/api/progress/{run_id}",
            get(routes::generate::get_progress),
        )
        // Content
        .route(
            "/api/clients/{slug}/contents",
            get(routes::contents::list_contents),
        )
        .route(
            "/api/contents/{client}/{id}/chat",
            post(routes::contents::send_chat),
        )
        // Config
        .route("/api/config", get(routes::config::get_config))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the API server.
pub async fn serve(root: PathBuf, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(root, listener, open_browser).await
}

/// Start the API server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(
    root: PathBuf,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let generator = http_generator(&root)?;
    let app = build_router(root, generator);

    tracing::info!("copyloom API listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}/api/clients");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
