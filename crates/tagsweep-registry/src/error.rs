//! Error types for registry operations.

use std::path::PathBuf;
use tagsweep_core::ValidationErrors;
use thiserror::Error;

/// How far the effect of a failure reaches during a cleanup run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureScope {
    /// Nothing can be cleaned; the run stops.
    Run,
    /// Only the affected repository is skipped.
    Repository,
    /// Only the affected tag is skipped.
    Tag,
}

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Failed to build the HTTP transport.
    #[error("Failed to set up connection to registry at {url}: {source}")]
    ConnectionFailed {
        /// Registry URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// Credentials could not be encoded into a request header.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Error message.
        message: String,
    },

    /// The client configuration failed validation.
    #[error("Invalid registry configuration: {0}")]
    InvalidConfig(#[from] ValidationErrors),

    /// No project matches the requested name exactly.
    #[error("Project not found: {name}")]
    ProjectNotFound {
        /// Project name that was looked up.
        name: String,
    },

    /// The registry failed or answered with something unexpected.
    ///
    /// Covers transport failures, non-success statuses and undecodable bodies.
    #[error("Registry protocol error during {operation}: {message}")]
    Protocol {
        /// The operation in progress (e.g., `list tags of library/nginx`).
        operation: String,
        /// What went wrong.
        message: String,
    },

    /// A repository's tag listing failed the ordering check after sorting.
    #[error("Tag ordering check failed for repository {repository}: {source}")]
    Ordering {
        /// Repository name.
        repository: String,
        /// Underlying ordering error.
        #[source]
        source: tagsweep_core::Error,
    },

    /// A single tag could not be deleted.
    #[error("Failed to delete {repository}:{tag}: {reason}")]
    DeleteFailed {
        /// Repository name.
        repository: String,
        /// Tag name.
        tag: String,
        /// Underlying cause.
        reason: String,
    },

    /// TLS material could not be loaded.
    #[error("TLS configuration error: {message}")]
    Tls {
        /// Error message.
        message: String,
    },

    /// File I/O error.
    #[error("File I/O error at {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl RegistryError {
    /// Creates a protocol error for `operation`.
    pub fn protocol(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Protocol {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Returns how far this failure reaches during a cleanup run.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagsweep_registry::{FailureScope, RegistryError};
    ///
    /// let err = RegistryError::ProjectNotFound { name: "library".into() };
    /// assert_eq!(err.scope(), FailureScope::Run);
    /// ```
    #[must_use]
    pub const fn scope(&self) -> FailureScope {
        match self {
            Self::Protocol { .. } | Self::Ordering { .. } => FailureScope::Repository,
            Self::DeleteFailed { .. } => FailureScope::Tag,
            Self::ConnectionFailed { .. }
            | Self::AuthenticationFailed { .. }
            | Self::InvalidConfig(_)
            | Self::ProjectNotFound { .. }
            | Self::Tls { .. }
            | Self::Io { .. } => FailureScope::Run,
        }
    }
}

/// Describes a transport-level failure without the noisy `reqwest` prefix.
pub(crate) fn describe_transport(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else if err.is_decode() {
        format!("undecodable response body: {err}")
    } else {
        err.to_string()
    }
}
