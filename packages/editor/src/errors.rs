//! Error types for the editor

use crate::content::ContentError;
use crate::document::PageStatus;
use crate::mutations::MutationError;
use crate::publish::PublishValidationError;
use pagecraft_common::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Permission denied for document {0}")]
    PermissionDenied(String),

    #[error("Unknown component type: {0}")]
    UnknownComponentType(String),

    #[error("Invalid content: {0}")]
    Content(ContentError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("Save failed: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid publish settings: {0}")]
    Validation(#[from] PublishValidationError),

    #[error("Cannot change status from {from} to {to}")]
    InvalidTransition { from: PageStatus, to: PageStatus },

    #[error("Malformed document {id}: {message}")]
    Decode { id: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No document loaded")]
    NotLoaded,
}

impl From<ContentError> for EditorError {
    fn from(e: ContentError) -> Self {
        match e {
            ContentError::UnknownType(tag) => EditorError::UnknownComponentType(tag),
            other => EditorError::Content(other),
        }
    }
}
