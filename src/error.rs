//! Collaborator error types

use thiserror::Error;

/// Failure to fetch window content
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("no content for {0}")]
    NotFound(String),

    #[error("content source unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure to write a layout snapshot
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("layout store unavailable: {0}")]
    Unavailable(String),

    #[error("failed to encode layout: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
