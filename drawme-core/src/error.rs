//! Error types for editor operations.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Errors that can occur in editor operations.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Component not found in the registry.
    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    /// Category not found in the registry.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Placement not found on the canvas.
    #[error("Placement not found: {0}")]
    PlacementNotFound(String),

    /// The category cannot be deleted.
    #[error("Category is protected: {0}")]
    ProtectedCategory(String),

    /// A category with this id already exists.
    #[error("Duplicate category id: {0}")]
    DuplicateCategory(String),

    /// Invalid editor operation.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A gesture is already in flight.
    #[error("A gesture is already in progress")]
    GestureInProgress,

    /// The command needs an active gesture.
    #[error("No gesture in progress")]
    NoGesture,

    /// The command needs an open rename field.
    #[error("No layer is being renamed")]
    RenameNotActive,

    /// A transform string could not be parsed.
    #[error("Invalid transform: {0}")]
    InvalidTransform(String),

    /// A layer order is not a permutation of the placements.
    #[error("Invalid layer order: {0}")]
    InvalidOrder(String),

    /// A drag payload could not be decoded.
    #[error("Malformed drag payload: {0}")]
    MalformedPayload(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persistence backend error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
