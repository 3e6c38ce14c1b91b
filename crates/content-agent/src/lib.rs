//! `content-agent`: client for the remote AI functions that write and
//! refine marketing content.
//!
//! The service exposes two calls and reports no progress while they run:
//!
//! ```text
//! GenerationParams ──► POST {base}/generate-content ──► GeneratedContent { id }
//! (content_id, msg) ──► POST {base}/chat             ──► ChatMessage
//! ```
//!
//! Failures are classified by [`FailureKind`] so callers can pick a message
//! without inspecting transport details.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use content_agent::{ContentGenerator, HttpContentClient};
//!
//! let client = HttpContentClient::new("https://example.test/functions/v1")?
//!     .with_api_key(token);
//! let created = client.generate_content(&params).await?;
//! let reply = client.send_chat_message(&created.id, "Shorter, please").await?;
//! ```

pub mod client;
pub mod error;
pub mod types;

pub use client::HttpContentClient;
pub use error::{ContentAgentError, FailureKind};
pub use types::{ChatRequest, GeneratedContent};

use async_trait::async_trait;
use copyloom_core::content::ChatMessage;
use copyloom_core::readiness::GenerationParams;

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, ContentAgentError>;

/// The remote generation and chat endpoints.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate_content(&self, params: &GenerationParams) -> Result<GeneratedContent>;

    async fn send_chat_message(&self, content_id: &str, message: &str) -> Result<ChatMessage>;
}
