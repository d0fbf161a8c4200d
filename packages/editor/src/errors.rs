//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] crate::versioning::PersistenceError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
