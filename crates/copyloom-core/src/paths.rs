use crate::error::{CopyloomError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const COPYLOOM_DIR: &str = ".copyloom";
pub const CLIENTS_DIR: &str = ".copyloom/clients";
pub const CONFIG_FILE: &str = ".copyloom/config.yaml";

pub const MANIFEST_FILE: &str = "manifest.yaml";
pub const KNOWLEDGE_FILE: &str = "knowledge.yaml";
pub const CONTENTS_DIR: &str = "contents";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn copyloom_dir(root: &Path) -> PathBuf {
    root.join(COPYLOOM_DIR)
}

pub fn clients_dir(root: &Path) -> PathBuf {
    root.join(CLIENTS_DIR)
}

pub fn client_dir(root: &Path, slug: &str) -> PathBuf {
    clients_dir(root).join(slug)
}

pub fn client_manifest(root: &Path, slug: &str) -> PathBuf {
    client_dir(root, slug).join(MANIFEST_FILE)
}

pub fn knowledge_path(root: &Path, slug: &str) -> PathBuf {
    client_dir(root, slug).join(KNOWLEDGE_FILE)
}

pub fn contents_dir(root: &Path, slug: &str) -> PathBuf {
    client_dir(root, slug).join(CONTENTS_DIR)
}

pub fn content_path(root: &Path, slug: &str, id: &str) -> PathBuf {
    contents_dir(root, slug).join(format!("{id}.yaml"))
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

// ---------------------------------------------------------------------------
// Slug validation
// ---------------------------------------------------------------------------

static SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn slug_re() -> &'static Regex {
    SLUG_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() || slug.len() > 64 || !slug_re().is_match(slug) {
        return Err(CopyloomError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

/// Content ids come from the remote service, so only reject what could
/// escape the contents directory.
pub fn validate_content_id(id: &str) -> Result<()> {
    if id.trim().is_empty() || id.starts_with('.') || id.contains(['/', '\\']) {
        return Err(CopyloomError::InvalidSlug(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
