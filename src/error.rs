//! Error types for the declarative resource layer.

use thiserror::Error;

use crate::client::{ClientError, ErrorKind};
use crate::schema::Diagnostic;

/// Errors surfaced to the host by provider operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested resource was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A validation error occurred.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A configuration error occurred.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A call to the FireHydrant API failed.
    #[error("API error: {0}")]
    Api(#[from] ClientError),

    /// An internal provider error occurred.
    #[error("Provider error: {0}")]
    Sdk(String),
}

impl ProviderError {
    /// Get the error message without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            Self::NotFound(msg)
            | Self::Validation(msg)
            | Self::Configuration(msg)
            | Self::UnknownResource(msg)
            | Self::Sdk(msg) => msg.clone(),
            Self::Serialization(err) => err.to_string(),
            Self::Api(err) => err.to_string(),
        }
    }

    /// Returns `true` if the error means the remote entity does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Api(err) => err.kind() == ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Render this error as the diagnostic handed back to the host.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = Diagnostic::error(self.to_string());
        match self {
            Self::Api(ClientError::Status { body, .. }) if !body.is_empty() => {
                diagnostic.with_detail(body.clone())
            },
            Self::Api(err @ ClientError::CreatedWithoutItems { .. }) => diagnostic.with_detail(
                format!(
                    "task list {} exists remotely without its items",
                    err.created_id().unwrap_or_default()
                ),
            ),
            _ => diagnostic,
        }
    }
}

impl From<ProviderError> for Diagnostic {
    fn from(err: ProviderError) -> Self {
        err.to_diagnostic()
    }
}
