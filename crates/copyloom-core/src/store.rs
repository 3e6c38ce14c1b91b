//! Knowledge base persistence.
//!
//! Writes replace the whole record atomically; concurrent writers are
//! last-write-wins.

use crate::error::{CopyloomError, Result};
use crate::knowledge::KnowledgeBase;
use crate::paths;
use std::path::PathBuf;

pub trait KnowledgeStore {
    /// `Ok(None)` when the client exists but has no knowledge base on record.
    fn load_knowledge_base(&self, client: &str) -> Result<Option<KnowledgeBase>>;

    /// Overwrite the client's knowledge base and return what was stored.
    fn save_knowledge_base(&self, client: &str, kb: &KnowledgeBase) -> Result<KnowledgeBase>;
}

/// YAML files under `<root>/.copyloom/clients/<slug>/knowledge.yaml`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn ensure_client(&self, client: &str) -> Result<()> {
        paths::validate_slug(client)?;
        if !paths::client_manifest(&self.root, client).exists() {
            return Err(CopyloomError::ClientNotFound(client.to_string()));
        }
        Ok(())
    }
}

impl KnowledgeStore for FileStore {
    fn load_knowledge_base(&self, client: &str) -> Result<Option<KnowledgeBase>> {
        self.ensure_client(client)?;
        let path = paths::knowledge_path(&self.root, client);
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path)?;
        let kb: KnowledgeBase = serde_yaml::from_str(&data)?;
        Ok(Some(kb))
    }

    fn save_knowledge_base(&self, client: &str, kb: &KnowledgeBase) -> Result<KnowledgeBase> {
        self.ensure_client(client)?;
        let mut stored = kb.clone();
        stored.normalize();
        let path = paths::knowledge_path(&self.root, client);
        let data = serde_yaml::to_string(&stored)?;
        crate::io::atomic_write(&path, data.as_bytes())?;
        tracing::debug!(client, "knowledge base saved");
        Ok(stored)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Client;
    use crate::completeness::score;
    use crate::knowledge::KnowledgeEdit;
    use tempfile::TempDir;

    #[test]
    fn new_client_loads_empty_knowledge_base() {
        let dir = TempDir::new().unwrap();
        Client::create(dir.path(), "acme", "Acme", None).unwrap();
        let store = FileStore::new(dir.path());
        let kb = store.load_knowledge_base("acme").unwrap().unwrap();
        assert_eq!(score(Some(&kb)).completion_percentage, 0);
    }

    #[test]
    fn unknown_client_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(
            store.load_knowledge_base("ghost"),
            Err(CopyloomError::ClientNotFound(_))
        ));
        assert!(matches!(
            store.save_knowledge_base("ghost", &KnowledgeBase::default()),
            Err(CopyloomError::ClientNotFound(_))
        ));
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        Client::create(dir.path(), "acme", "Acme", None).unwrap();
        std::fs::remove_file(paths::knowledge_path(dir.path(), "acme")).unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.load_knowledge_base("acme").unwrap().is_none());
        assert_eq!(score(None).missing_fields.len(), 15);
    }

    #[test]
    fn save_overwrites_whole_record() {
        let dir = TempDir::new().unwrap();
        Client::create(dir.path(), "acme", "Acme", None).unwrap();
        let store = FileStore::new(dir.path());

        let mut first = KnowledgeBase::default();
        first.apply(KnowledgeEdit::SetSector("Retail".into())).unwrap();
        first.apply(KnowledgeEdit::AddMainKeyword("shoes".into())).unwrap();
        store.save_knowledge_base("acme", &first).unwrap();

        let mut second = KnowledgeBase::default();
        second.apply(KnowledgeEdit::SetMarket("B2C".into())).unwrap();
        store.save_knowledge_base("acme", &second).unwrap();

        let loaded = store.load_knowledge_base("acme").unwrap().unwrap();
        assert_eq!(loaded, second);
        assert!(loaded.seo.main_keywords.is_empty());
    }

    #[test]
    fn save_clamps_personality_sliders() {
        let dir = TempDir::new().unwrap();
        Client::create(dir.path(), "acme", "Acme", None).unwrap();
        let store = FileStore::new(dir.path());

        let mut kb = KnowledgeBase::default();
        kb.positioning.personality.formal_vs_informal = 200;
        let stored = store.save_knowledge_base("acme", &kb).unwrap();
        assert_eq!(stored.positioning.personality.formal_vs_informal, 100);

        let loaded = store.load_knowledge_base("acme").unwrap().unwrap();
        assert_eq!(loaded.positioning.personality.formal_vs_informal, 100);
    }

    #[test]
    fn path_traversal_slug_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(
            store.load_knowledge_base("../etc"),
            Err(CopyloomError::InvalidSlug(_))
        ));
    }
}
