use thiserror::Error;

use crate::domain::product::ProductId;

/// Client-visible failures, rejected before any retrieval work begins.
///
/// Everything else in the pipeline degrades instead of failing: upstream
/// outages and malformed generative output produce a smaller but valid
/// [`crate::fusion::FusionResult`].
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FusionError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("customer `{0}` was not found")]
    CustomerNotFound(String),
    #[error("anchor product `{0}` was not found")]
    AnchorNotFound(ProductId),
    #[error("profile lookup failed: {0}")]
    ProfileUnavailable(String),
}

/// Upstream collaborator failure. Never aborts a fusion request; the stage
/// that hit it records a degraded outcome and the pipeline continues.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RetrievalError {
    #[error("upstream `{backend}` unavailable: {message}")]
    Unavailable { backend: String, message: String },
    #[error("upstream `{backend}` timed out after {timeout_ms}ms")]
    Timeout { backend: String, timeout_ms: u64 },
}

impl RetrievalError {
    pub fn unavailable(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable { backend: backend.into(), message: message.into() }
    }

    pub fn timeout(backend: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout { backend: backend.into(), timeout_ms }
    }

    pub fn backend(&self) -> &str {
        match self {
            Self::Unavailable { backend, .. } | Self::Timeout { backend, .. } => backend,
        }
    }
}
