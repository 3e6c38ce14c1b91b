use crate::error::{CopyloomError, Result};
use crate::paths;
use crate::types::{ContentCategory, Sender};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ChatMessage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn from_user(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender: Sender::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// ContentRecord
// ---------------------------------------------------------------------------

/// Local record of a generated piece and its refinement conversation.
/// The body itself lives with the remote service; `id` is its handle there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: String,
    pub client: String,
    pub category: ContentCategory,
    #[serde(default)]
    pub objective: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl ContentRecord {
    pub fn new(
        id: impl Into<String>,
        client: impl Into<String>,
        category: ContentCategory,
        objective: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            client: client.into(),
            category,
            objective: objective.into(),
            created_at: Utc::now(),
            messages: Vec::new(),
        }
    }

    pub fn push_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Latest assistant reply, if any.
    pub fn last_reply(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.sender == Sender::Assistant)
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    pub fn load(root: &Path, client: &str, id: &str) -> Result<Self> {
        paths::validate_slug(client)?;
        paths::validate_content_id(id)?;
        let path = paths::content_path(root, client, id);
        if !path.exists() {
            return Err(CopyloomError::ContentNotFound(id.to_string()));
        }
        let data = std::fs::read_to_string(&path)?;
        let record: ContentRecord = serde_yaml::from_str(&data)?;
        Ok(record)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        paths::validate_content_id(&self.id)?;
        if !paths::client_manifest(root, &self.client).exists() {
            return Err(CopyloomError::ClientNotFound(self.client.clone()));
        }
        let path = paths::content_path(root, &self.client, &self.id);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// All content for a client, newest first.
    pub fn list(root: &Path, client: &str) -> Result<Vec<Self>> {
        if !paths::client_manifest(root, client).exists() {
            return Err(CopyloomError::ClientNotFound(client.to_string()));
        }
        let dir = paths::contents_dir(root, client);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            let data = std::fs::read_to_string(&path)?;
            records.push(serde_yaml::from_str::<ContentRecord>(&data)?);
        }
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Client;
    use tempfile::TempDir;

    #[test]
    fn save_and_load_with_messages() {
        let dir = TempDir::new().unwrap();
        Client::create(dir.path(), "acme", "Acme", None).unwrap();

        let mut record = ContentRecord::new("c-1", "acme", ContentCategory::Email, "Win back");
        record.push_message(ChatMessage::from_user("Make it shorter"));
        record.push_message(ChatMessage {
            id: "m-2".into(),
            sender: Sender::Assistant,
            content: "Done.".into(),
            timestamp: Utc::now(),
        });
        record.save(dir.path()).unwrap();

        let loaded = ContentRecord::load(dir.path(), "acme", "c-1").unwrap();
        assert_eq!(loaded.category, ContentCategory::Email);
        assert_eq!(loaded.messages.len(), 2);
        assert_eq!(loaded.last_reply().unwrap().content, "Done.");
    }

    #[test]
    fn save_for_unknown_client_fails() {
        let dir = TempDir::new().unwrap();
        let record = ContentRecord::new("c-1", "ghost", ContentCategory::Post, "");
        assert!(matches!(
            record.save(dir.path()),
            Err(CopyloomError::ClientNotFound(_))
        ));
    }

    #[test]
    fn load_missing_content() {
        let dir = TempDir::new().unwrap();
        Client::create(dir.path(), "acme", "Acme", None).unwrap();
        assert!(matches!(
            ContentRecord::load(dir.path(), "acme", "nope"),
            Err(CopyloomError::ContentNotFound(_))
        ));
    }

    #[test]
    fn list_empty_then_populated() {
        let dir = TempDir::new().unwrap();
        Client::create(dir.path(), "acme", "Acme", None).unwrap();
        assert!(ContentRecord::list(dir.path(), "acme").unwrap().is_empty());

        ContentRecord::new("c-1", "acme", ContentCategory::Blog, "")
            .save(dir.path())
            .unwrap();
        ContentRecord::new("c-2", "acme", ContentCategory::Carousel, "")
            .save(dir.path())
            .unwrap();
        assert_eq!(ContentRecord::list(dir.path(), "acme").unwrap().len(), 2);
    }
}
