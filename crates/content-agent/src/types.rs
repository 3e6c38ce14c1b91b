use serde::{Deserialize, Serialize};

/// Reply to a generation request: the remote handle of the new piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub content_id: &'a str,
    pub message: &'a str,
}
