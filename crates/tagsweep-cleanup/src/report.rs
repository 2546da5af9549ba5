//! Per-repository and per-run cleanup reports.

use serde::Serialize;
use tagsweep_core::{RetentionPlan, Tag};
use tagsweep_registry::RegistryError;

/// How a repository's processing ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RepositoryOutcome {
    /// The repository holds no more tags than the policy keeps.
    NoDeletionNeeded,

    /// Every selected tag was attempted; see `failures` for the ones that failed.
    Cleaned,

    /// Dry run: the deletion set was computed but nothing was deleted.
    DryRun,

    /// Cancellation stopped processing; `deleted` holds what was removed before it.
    Cancelled,

    /// The tag listing could not be obtained; the repository was skipped.
    FetchFailed {
        /// Underlying cause.
        reason: String,
    },
}

/// A tag whose deletion failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagFailure {
    /// The tag that was not deleted.
    pub tag: Tag,
    /// Underlying cause.
    pub reason: String,
}

/// Outcome of processing one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryReport {
    /// Repository name.
    pub repository: String,

    /// How processing ended.
    pub outcome: RepositoryOutcome,

    /// Number of tags before cleanup.
    pub tags_before: usize,

    /// Number of tags the policy intends to leave.
    pub tags_after: usize,

    /// Tags selected for deletion, oldest first.
    pub planned: Vec<Tag>,

    /// Tags actually deleted, in deletion order.
    pub deleted: Vec<Tag>,

    /// Tags whose deletion failed.
    pub failures: Vec<TagFailure>,

    /// Bytes reclaimed in this repository (successful deletions only).
    pub reclaimed_bytes: u64,
}

impl RepositoryReport {
    /// Starts a report from a computed retention plan.
    pub(crate) fn planned(repository: &str, plan: &RetentionPlan<'_>) -> Self {
        Self {
            repository: repository.to_string(),
            outcome: if plan.is_noop() {
                RepositoryOutcome::NoDeletionNeeded
            } else {
                RepositoryOutcome::Cleaned
            },
            tags_before: plan.total(),
            tags_after: plan.keep().len(),
            planned: plan.delete().to_vec(),
            deleted: Vec::new(),
            failures: Vec::new(),
            reclaimed_bytes: 0,
        }
    }

    /// A repository whose tags could not be fetched.
    pub(crate) fn fetch_failed(repository: &str, error: &RegistryError) -> Self {
        Self::empty(
            repository,
            RepositoryOutcome::FetchFailed {
                reason: error.to_string(),
            },
        )
    }

    /// A repository never started because the run was cancelled.
    pub(crate) fn not_started(repository: &str) -> Self {
        Self::empty(repository, RepositoryOutcome::Cancelled)
    }

    fn empty(repository: &str, outcome: RepositoryOutcome) -> Self {
        Self {
            repository: repository.to_string(),
            outcome,
            tags_before: 0,
            tags_after: 0,
            planned: Vec::new(),
            deleted: Vec::new(),
            failures: Vec::new(),
            reclaimed_bytes: 0,
        }
    }

    pub(crate) fn record_deleted(&mut self, tag: &Tag) {
        self.reclaimed_bytes += tag.size;
        self.deleted.push(tag.clone());
    }

    pub(crate) fn record_failure(&mut self, tag: &Tag, error: &RegistryError) {
        let reason = match error {
            RegistryError::DeleteFailed { reason, .. } => reason.clone(),
            other => other.to_string(),
        };
        self.failures.push(TagFailure {
            tag: tag.clone(),
            reason,
        });
    }

    /// Sum of the sizes of all tags selected for deletion.
    #[must_use]
    pub fn planned_bytes(&self) -> u64 {
        self.planned.iter().map(|t| t.size).sum()
    }

    /// Returns true if the tag listing could not be fetched.
    #[must_use]
    pub const fn is_fetch_failure(&self) -> bool {
        matches!(self.outcome, RepositoryOutcome::FetchFailed { .. })
    }

    /// Returns true if the repository was skipped or any deletion failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.is_fetch_failure() || !self.failures.is_empty()
    }
}

/// Outcome of a whole cleanup run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Project name.
    pub project: String,

    /// Project identifier as resolved by the registry.
    pub project_id: i64,

    /// Number of tags kept per repository.
    pub keep: usize,

    /// Whether this was a dry run.
    pub dry_run: bool,

    /// Whether cancellation left any repository unfinished.
    pub cancelled: bool,

    /// One report per repository, in listing order.
    pub repositories: Vec<RepositoryReport>,

    /// Bytes reclaimed across all repositories.
    pub reclaimed_bytes: u64,
}

impl RunReport {
    /// Number of tags deleted across all repositories.
    #[must_use]
    pub fn deleted_count(&self) -> usize {
        self.repositories.iter().map(|r| r.deleted.len()).sum()
    }

    /// Number of tags whose deletion failed.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.repositories.iter().map(|r| r.failures.len()).sum()
    }

    /// Repositories skipped because their tags could not be fetched.
    pub fn skipped_repositories(&self) -> impl Iterator<Item = &RepositoryReport> {
        self.repositories.iter().filter(|r| r.is_fetch_failure())
    }

    /// Bytes that a non-dry run would try to reclaim.
    #[must_use]
    pub fn planned_bytes(&self) -> u64 {
        self.repositories.iter().map(RepositoryReport::planned_bytes).sum()
    }

    /// Returns true if any repository was skipped or any deletion failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.repositories.iter().any(RepositoryReport::has_failures)
    }
}
