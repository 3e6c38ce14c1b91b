use std::time::Duration;

use async_trait::async_trait;
use copyloom_core::content::ChatMessage;
use copyloom_core::readiness::GenerationParams;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::types::{ChatRequest, GeneratedContent};
use crate::{ContentAgentError, ContentGenerator, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

// ─── HttpContentClient ────────────────────────────────────────────────────

/// [`ContentGenerator`] over the hosted edge functions.
#[derive(Debug, Clone)]
pub struct HttpContentClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpContentClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ContentAgentError::InvalidBaseUrl(base_url));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ContentAgentError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        function: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}/{function}", self.base_url);
        let mut request = self.client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(function, status = status.as_u16(), "content service call failed");
            return Err(ContentAgentError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<T>().await.map_err(|e| {
            ContentAgentError::InvalidResponse(format!("failed to parse {function} response: {e}"))
        })
    }
}

#[async_trait]
impl ContentGenerator for HttpContentClient {
    async fn generate_content(&self, params: &GenerationParams) -> Result<GeneratedContent> {
        debug!(client = %params.client, category = %params.category, "generate-content");
        let created: GeneratedContent = self.post("generate-content", params).await?;
        if created.id.trim().is_empty() {
            return Err(ContentAgentError::InvalidResponse(
                "generate-content returned an empty id".into(),
            ));
        }
        Ok(created)
    }

    async fn send_chat_message(&self, content_id: &str, message: &str) -> Result<ChatMessage> {
        debug!(content_id, "chat");
        let request = ChatRequest {
            content_id,
            message,
        };
        self.post("chat", &request).await
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FailureKind;
    use copyloom_core::types::{ContentCategory, Sender};

    fn params() -> GenerationParams {
        GenerationParams {
            client: "acme".into(),
            category: ContentCategory::Blog,
            source: None,
            objective: "Awareness".into(),
            context: "Autumn launch".into(),
            use_knowledge_base: true,
        }
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = HttpContentClient::new("localhost:54321").unwrap_err();
        assert!(matches!(err, ContentAgentError::InvalidBaseUrl(_)));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = HttpContentClient::new("https://example.test/functions/v1/").unwrap();
        assert_eq!(client.base_url(), "https://example.test/functions/v1");
    }

    #[tokio::test]
    async fn generate_returns_remote_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/generate-content")
            .match_header("authorization", "Bearer secret")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "client": "acme",
                "category": "blog",
                "use_knowledge_base": true,
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"content-123"}"#)
            .create_async()
            .await;

        let client = HttpContentClient::new(server.url()).unwrap().with_api_key("secret");
        let created = client.generate_content(&params()).await.unwrap();
        assert_eq!(created.id, "content-123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn generate_rejects_empty_id() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/generate-content")
            .with_status(200)
            .with_body(r#"{"id":""}"#)
            .create_async()
            .await;

        let client = HttpContentClient::new(server.url()).unwrap();
        let err = client.generate_content(&params()).await.unwrap_err();
        assert!(matches!(err, ContentAgentError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn chat_returns_assistant_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "content_id": "content-123",
                "message": "Shorter please",
            })))
            .with_status(200)
            .with_body(
                r#"{"id":"m-1","sender":"assistant","content":"Here is a shorter version.","timestamp":"2026-10-19T10:00:00Z"}"#,
            )
            .create_async()
            .await;

        let client = HttpContentClient::new(server.url()).unwrap();
        let reply = client
            .send_chat_message("content-123", "Shorter please")
            .await
            .unwrap();
        assert_eq!(reply.sender, Sender::Assistant);
        assert_eq!(reply.content, "Here is a shorter version.");
    }

    #[tokio::test]
    async fn http_errors_are_classified() {
        let mut server = mockito::Server::new_async().await;
        for (code, kind) in [
            (401, FailureKind::AuthExpired),
            (404, FailureKind::NotFound),
            (422, FailureKind::ClientError),
            (502, FailureKind::ServerError),
        ] {
            let mock = server
                .mock("POST", "/chat")
                .with_status(code)
                .with_body("nope")
                .create_async()
                .await;
            let client = HttpContentClient::new(server.url()).unwrap();
            let err = client.send_chat_message("c", "m").await.unwrap_err();
            assert_eq!(err.kind(), kind, "status {code}");
            mock.remove_async().await;
        }
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/generate-content")
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let client = HttpContentClient::new(server.url()).unwrap();
        let err = client.generate_content(&params()).await.unwrap_err();
        assert!(matches!(err, ContentAgentError::InvalidResponse(_)));
        assert_eq!(err.kind(), FailureKind::ServerError);
    }

    #[tokio::test]
    async fn unreachable_service_is_network_failure() {
        let client = HttpContentClient::new("http://127.0.0.1:1").unwrap();
        let err = client.generate_content(&params()).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Network);
    }
}
