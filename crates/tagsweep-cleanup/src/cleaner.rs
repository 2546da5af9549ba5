//! The cleanup run driver.

use futures::stream::{self, StreamExt};
use tagsweep_core::{format_size, select_for_deletion, Validate};
use tagsweep_registry::RegistryApi;

use crate::config::CleanupConfig;
use crate::error::{CleanupError, Result};
use crate::report::{RepositoryOutcome, RepositoryReport, RunReport};
use crate::shutdown::ShutdownSignal;

/// Applies a retention policy to every repository of a project.
#[derive(Debug)]
pub struct Cleaner<R> {
    registry: R,
    config: CleanupConfig,
    shutdown: ShutdownSignal,
}

impl<R: RegistryApi> Cleaner<R> {
    /// Creates a cleaner over the given registry.
    ///
    /// # Errors
    ///
    /// Returns [`CleanupError::InvalidConfig`] if the configuration is invalid.
    pub fn new(registry: R, config: CleanupConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            registry,
            config,
            shutdown: ShutdownSignal::new(),
        })
    }

    /// Uses an existing shutdown signal instead of a private one.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Returns a handle that cancels this cleaner's runs when triggered.
    #[must_use]
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Returns the underlying registry.
    pub const fn registry(&self) -> &R {
        &self.registry
    }

    /// Runs cleanup for a project.
    ///
    /// # Errors
    ///
    /// Returns an error only if the project cannot be resolved or its
    /// repositories cannot be listed. Everything else is recorded in the
    /// returned report.
    pub async fn run(&self, project: &str) -> Result<RunReport> {
        self.run_with_progress(project, |_| {}).await
    }

    /// Runs cleanup for a project, calling `progress` as each repository finishes.
    ///
    /// Reports are delivered in repository listing order regardless of
    /// concurrency.
    ///
    /// # Errors
    ///
    /// See [`Cleaner::run`].
    pub async fn run_with_progress<F>(&self, project: &str, mut progress: F) -> Result<RunReport>
    where
        F: FnMut(&RepositoryReport),
    {
        let project_id = self
            .registry
            .resolve_project_id(project)
            .await
            .map_err(|source| CleanupError::ProjectResolution {
                project: project.to_string(),
                source,
            })?;

        tracing::info!(project = %project, project_id = %project_id, "resolved project");

        let repositories = self
            .registry
            .list_repositories(project_id)
            .await
            .map_err(|source| CleanupError::RepositoryListing {
                project: project.to_string(),
                source,
            })?;

        tracing::info!(
            project = %project,
            repositories = repositories.len(),
            keep = self.config.policy.keep(),
            dry_run = self.config.dry_run,
            "starting cleanup"
        );

        let mut reports = Vec::with_capacity(repositories.len());
        let mut reclaimed_bytes = 0u64;

        let mut results = stream::iter(repositories.iter())
            .map(|repository| self.clean_repository(repository))
            .buffered(self.config.concurrency);

        while let Some(report) = results.next().await {
            reclaimed_bytes += report.reclaimed_bytes;
            progress(&report);
            reports.push(report);
        }

        // A signal that arrives after the last repository finished cancels nothing.
        let cancelled = reports
            .iter()
            .any(|r| r.outcome == RepositoryOutcome::Cancelled);
        let report = RunReport {
            project: project.to_string(),
            project_id: project_id.0,
            keep: self.config.policy.keep(),
            dry_run: self.config.dry_run,
            cancelled,
            repositories: reports,
            reclaimed_bytes,
        };

        tracing::info!(
            project = %project,
            deleted = report.deleted_count(),
            failed = report.failed_count(),
            reclaimed = %format_size(report.reclaimed_bytes),
            cancelled,
            "cleanup finished"
        );

        Ok(report)
    }

    async fn clean_repository(&self, repository: &str) -> RepositoryReport {
        if self.shutdown.is_triggered() {
            tracing::debug!(repository = %repository, "cancelled before start");
            return RepositoryReport::not_started(repository);
        }

        let tags = match self.registry.list_tags(repository).await {
            Ok(tags) => tags,
            Err(e) => {
                tracing::warn!(
                    repository = %repository,
                    error = %e,
                    scope = ?e.scope(),
                    "failed to fetch tags, skipping repository"
                );
                return RepositoryReport::fetch_failed(repository, &e);
            }
        };

        let plan = select_for_deletion(&tags, self.config.policy);
        let mut report = RepositoryReport::planned(repository, &plan);

        if plan.is_noop() {
            tracing::info!(
                repository = %repository,
                tags = plan.total(),
                "no deletion needed"
            );
            return report;
        }

        tracing::info!(
            repository = %repository,
            tags = plan.total(),
            deleting = plan.delete().len(),
            "selected tags for deletion"
        );

        if self.config.dry_run {
            report.outcome = RepositoryOutcome::DryRun;
            return report;
        }

        for tag in plan.delete() {
            if self.shutdown.is_triggered() {
                tracing::warn!(
                    repository = %repository,
                    remaining = report.planned.len() - report.deleted.len() - report.failures.len(),
                    "cancelled, leaving remaining tags"
                );
                report.outcome = RepositoryOutcome::Cancelled;
                break;
            }

            match self.registry.delete_tag(repository, &tag.name).await {
                Ok(()) => {
                    tracing::info!(
                        repository = %repository,
                        tag = %tag.name,
                        size = %format_size(tag.size),
                        "deleted tag"
                    );
                    report.record_deleted(tag);
                }
                Err(e) => {
                    tracing::warn!(
                        repository = %repository,
                        tag = %tag.name,
                        error = %e,
                        "failed to delete tag"
                    );
                    report.record_failure(tag, &e);
                }
            }
        }

        report
    }
}
