//! Typed failures of a snapshot session. Orchestration code wraps these in
//! `anyhow::Error`; callers recover them with `downcast_ref`.

use thiserror::Error;

/// Failures while cloning a document into a sandbox. None of them are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloneError {
    #[error("Cloned element does not have an owner document")]
    NoOwnerDocument,
    #[error("Document has no root element to clone")]
    MissingDocumentElement,
    #[error("Unable to find iframe window")]
    SandboxWindowUnavailable,
    #[error("Error finding the {node_name} in the cloned document")]
    ReferenceNotFound { node_name: String },
}

/// Precondition failures of [`crate::render_element`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("Invalid element provided as first argument")]
    InvalidElement,
    #[error("Document is not attached to a Window")]
    NoDefaultView,
}
