//! Error types for the REST client layer.

use reqwest::StatusCode;
use thiserror::Error;

/// Coarse classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The HTTP exchange failed or the API answered with a non-success status.
    Transport,
    /// The requested entity does not exist.
    NotFound,
    /// The request could not be built from the given input.
    Validation,
}

/// Errors returned by the FireHydrant REST clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a usable response.
    #[error("{context}: {source}")]
    Transport {
        /// The operation that was attempted.
        context: String,
        /// The underlying transport failure.
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-success status code.
    #[error("{context}: API responded with {status}")]
    Status {
        /// The operation that was attempted.
        context: String,
        /// The status code returned by the API.
        status: StatusCode,
        /// The response body, kept for debugging.
        body: String,
    },

    /// No entity matched the lookup.
    #[error("{0}")]
    NotFound(String),

    /// The request could not be built.
    #[error("{0}")]
    Validation(String),

    /// A task list was created but attaching its items failed.
    #[error("could not update created task list {id}: {source}")]
    CreatedWithoutItems {
        /// ID assigned by the API in the first phase.
        id: String,
        /// Why the second phase failed.
        #[source]
        source: Box<ClientError>,
    },
}

impl ClientError {
    pub(crate) fn transport(context: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            context: context.into(),
            source,
        }
    }

    /// Classify this error.
    ///
    /// A 404 response counts as [`ErrorKind::NotFound`]; every other
    /// non-success status is a transport failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Status { status, .. } if *status == StatusCode::NOT_FOUND => ErrorKind::NotFound,
            Self::Status { .. } => ErrorKind::Transport,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::CreatedWithoutItems { source, .. } => source.kind(),
        }
    }

    /// Returns `true` if the entity does not exist remotely.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// The ID of a task list that exists remotely despite this error, if any.
    pub fn created_id(&self) -> Option<&str> {
        match self {
            Self::CreatedWithoutItems { id, .. } => Some(id),
            _ => None,
        }
    }
}
