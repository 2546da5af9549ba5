//! Error types for the cleanup crate.
//!
//! Only failures that leave nothing to clean surface as [`CleanupError`].
//! Repository- and tag-scoped failures are recorded in the run report.

use tagsweep_core::ValidationErrors;
use tagsweep_registry::RegistryError;
use thiserror::Error;

/// Result type alias for cleanup operations.
pub type Result<T> = std::result::Result<T, CleanupError>;

/// Run-fatal cleanup errors.
#[derive(Error, Debug)]
pub enum CleanupError {
    /// The cleanup configuration is invalid; no remote call was made.
    #[error("invalid cleanup configuration: {0}")]
    InvalidConfig(#[from] ValidationErrors),

    /// The project could not be resolved; no repository was touched.
    #[error("failed to resolve project '{project}': {source}")]
    ProjectResolution {
        /// Project name.
        project: String,
        /// Underlying registry error.
        #[source]
        source: RegistryError,
    },

    /// The project's repositories could not be listed.
    #[error("failed to list repositories of project '{project}': {source}")]
    RepositoryListing {
        /// Project name.
        project: String,
        /// Underlying registry error.
        #[source]
        source: RegistryError,
    },
}

impl CleanupError {
    /// Returns true if the project does not exist.
    #[must_use]
    pub const fn is_project_not_found(&self) -> bool {
        matches!(
            self,
            Self::ProjectResolution {
                source: RegistryError::ProjectNotFound { .. },
                ..
            }
        )
    }
}
