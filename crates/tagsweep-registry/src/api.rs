//! Registry operations and their wire types.

use async_trait::async_trait;
use serde::Deserialize;
use tagsweep_core::SortedTags;

use crate::error::RegistryError;

/// Numeric identifier of a project, as assigned by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub i64);

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The registry operations a cleanup run depends on.
///
/// Implemented by [`RegistryClient`](crate::RegistryClient) for a live
/// registry; tests substitute in-memory implementations.
#[async_trait]
pub trait RegistryApi: Send + Sync {
    /// Resolves a project name to its identifier.
    ///
    /// The match is exact and case-sensitive.
    ///
    /// # Errors
    ///
    /// [`RegistryError::ProjectNotFound`] if no project has exactly this
    /// name, [`RegistryError::Protocol`] if the listing could not be
    /// obtained or decoded.
    async fn resolve_project_id(&self, name: &str) -> Result<ProjectId, RegistryError>;

    /// Lists the names of all repositories in a project.
    ///
    /// A project without repositories yields an empty list.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Protocol`] on transport failure, non-success status
    /// or undecodable body.
    async fn list_repositories(&self, project: ProjectId) -> Result<Vec<String>, RegistryError>;

    /// Lists the tags of a repository, oldest first.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Protocol`] on transport failure, non-success status
    /// or undecodable body; [`RegistryError::Ordering`] if the sorted list
    /// fails its ordering check.
    async fn list_tags(&self, repository: &str) -> Result<SortedTags, RegistryError>;

    /// Deletes exactly one tag.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DeleteFailed`] on transport failure or non-success status.
    async fn delete_tag(&self, repository: &str, tag: &str) -> Result<(), RegistryError>;
}

/// Entry of `GET /api/projects`.
#[derive(Debug, Deserialize)]
pub(crate) struct ProjectRecord {
    pub project_id: ProjectId,
    pub name: String,
}

/// Entry of `GET /api/repositories`.
#[derive(Debug, Deserialize)]
pub(crate) struct RepositoryRecord {
    pub name: String,
}
