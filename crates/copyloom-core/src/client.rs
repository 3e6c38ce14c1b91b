use crate::error::{CopyloomError, Result};
use crate::knowledge::KnowledgeBase;
use crate::paths;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// A company managed by the agency. Owns exactly one knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub slug: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            slug: slug.into(),
            name: name.into(),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    /// Create the client record together with an empty knowledge base.
    pub fn create(
        root: &Path,
        slug: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Result<Self> {
        let slug = slug.into();
        paths::validate_slug(&slug)?;

        if paths::client_manifest(root, &slug).exists() {
            return Err(CopyloomError::ClientExists(slug));
        }

        let mut client = Self::new(slug, name);
        client.description = description;
        client.save(root)?;

        let kb = serde_yaml::to_string(&KnowledgeBase::default())?;
        crate::io::atomic_write(&paths::knowledge_path(root, &client.slug), kb.as_bytes())?;

        tracing::debug!(client = %client.slug, "client created");
        Ok(client)
    }

    pub fn load(root: &Path, slug: &str) -> Result<Self> {
        let manifest = paths::client_manifest(root, slug);
        if !manifest.exists() {
            return Err(CopyloomError::ClientNotFound(slug.to_string()));
        }
        let data = std::fs::read_to_string(&manifest)?;
        let client: Client = serde_yaml::from_str(&data)?;
        Ok(client)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let manifest = paths::client_manifest(root, &self.slug);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&manifest, data.as_bytes())
    }

    /// All clients, sorted by slug.
    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let clients_dir = paths::clients_dir(root);
        if !clients_dir.exists() {
            return Ok(Vec::new());
        }

        let mut clients = Vec::new();
        for entry in std::fs::read_dir(&clients_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                let slug = entry.file_name().to_string_lossy().into_owned();
                match Self::load(root, &slug) {
                    Ok(c) => clients.push(c),
                    Err(CopyloomError::ClientNotFound(_)) => {}
                    Err(e) => return Err(e),
                }
            }
        }
        clients.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(clients)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
