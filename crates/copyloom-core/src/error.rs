use thiserror::Error;

#[derive(Debug, Error)]
pub enum CopyloomError {
    #[error("not initialized: run 'copyloom init'")]
    NotInitialized,

    #[error("client not found: {0}")]
    ClientNotFound(String),

    #[error("client already exists: {0}")]
    ClientExists(String),

    #[error("content not found: {0}")]
    ContentNotFound(String),

    #[error("invalid slug '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidSlug(String),

    #[error("invalid content category: {0}")]
    InvalidCategory(String),

    #[error("invalid source type: {0}")]
    InvalidSourceType(String),

    #[error("invalid knowledge base edit: {0}")]
    InvalidEdit(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CopyloomError>;
