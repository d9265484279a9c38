use crate::types::{ArtifactKind, LookupLevel};
use thiserror::Error;

/// Service-level failures: the AI provider, the storage backend, or the
/// serialization boundary between them.
#[derive(Error, Debug)]
pub enum EdumateError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("AI provider is not configured: {0}")]
    MissingAiProvider(String),
    #[error("Course store is not configured")]
    MissingStore,
    #[error("Storage connection error: {0}")]
    StorageConnection(String),
    #[error("Storage operation failed: {0}")]
    StorageOperationFailed(String),
    #[error("Database error: {0}")]
    Database(#[from] turso::Error),
    #[error("Failed to encode or decode stored JSON: {0}")]
    JsonSerialization(#[from] serde_json::Error),
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl EdumateError {
    /// Whether the failure came from the upstream AI provider rather than
    /// local storage.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            EdumateError::AiRequest(_) | EdumateError::AiDeserialization(_) | EdumateError::AiApi(_)
        )
    }
}

/// The outcome kinds a generation request can end in besides success.
///
/// `NotFound` and the `Empty*` variants are recoverable, per-request conditions;
/// `Service` wraps a failure of a collaborator and nothing was persisted.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("{0} not found")]
    NotFound(LookupLevel),
    #[error("{0} generation produced no content")]
    EmptyGeneration(ArtifactKind),
    #[error("outline generation produced no content")]
    EmptyOutline,
    #[error("tutor produced an empty reply")]
    EmptyReply,
    #[error(transparent)]
    Service(#[from] EdumateError),
}

impl From<turso::Error> for GenerationError {
    fn from(err: turso::Error) -> Self {
        GenerationError::Service(EdumateError::Database(err))
    }
}
