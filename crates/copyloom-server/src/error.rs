use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use content_agent::{ContentAgentError, FailureKind};
use copyloom_core::error::CopyloomError;

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(CopyloomError::InvalidInput(msg.into()).into())
    }
}

fn copyloom_status(e: &CopyloomError) -> StatusCode {
    match e {
        CopyloomError::NotInitialized => StatusCode::BAD_REQUEST,
        CopyloomError::ClientNotFound(_) | CopyloomError::ContentNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        CopyloomError::ClientExists(_) => StatusCode::CONFLICT,
        CopyloomError::InvalidSlug(_)
        | CopyloomError::InvalidCategory(_)
        | CopyloomError::InvalidSourceType(_)
        | CopyloomError::InvalidEdit(_)
        | CopyloomError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        CopyloomError::Io(_) | CopyloomError::Yaml(_) | CopyloomError::Json(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn agent_status(e: &ContentAgentError) -> StatusCode {
    match e.kind() {
        FailureKind::NotFound => StatusCode::NOT_FOUND,
        FailureKind::AuthExpired => StatusCode::UNAUTHORIZED,
        FailureKind::ClientError => StatusCode::UNPROCESSABLE_ENTITY,
        FailureKind::ServerError | FailureKind::Network => StatusCode::BAD_GATEWAY,
        FailureKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(e) = self.0.downcast_ref::<ContentAgentError>() {
            let kind = e.kind();
            let body = serde_json::json!({
                "error": kind.message(),
                "kind": kind,
                "detail": e.to_string(),
            });
            return (agent_status(e), axum::Json(body)).into_response();
        }

        let status = self
            .0
            .downcast_ref::<CopyloomError>()
            .map(copyloom_status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
