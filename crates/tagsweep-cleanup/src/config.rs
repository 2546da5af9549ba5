//! Cleanup run configuration.

use tagsweep_core::{RetentionPolicy, Validate, ValidationError, ValidationErrors};

/// Upper bound on repositories processed at once.
pub const MAX_CONCURRENCY: usize = 32;

/// Configuration for a cleanup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupConfig {
    /// Retention policy applied to every repository.
    pub policy: RetentionPolicy,

    /// Number of repositories processed concurrently (1 = sequential).
    pub concurrency: usize,

    /// Compute and report the deletion sets without deleting anything.
    pub dry_run: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            policy: RetentionPolicy::default(),
            concurrency: 1,
            dry_run: false,
        }
    }
}

impl CleanupConfig {
    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> CleanupConfigBuilder {
        CleanupConfigBuilder::default()
    }
}

impl Validate for CleanupConfig {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.concurrency == 0 || self.concurrency > MAX_CONCURRENCY {
            errors.add(ValidationError::range(
                "concurrency",
                format!("must be between 1 and {MAX_CONCURRENCY}, got {}", self.concurrency),
            ));
        }
        errors.into_result()
    }
}

/// Builder for `CleanupConfig`.
#[derive(Debug, Default)]
pub struct CleanupConfigBuilder {
    policy: Option<RetentionPolicy>,
    concurrency: Option<usize>,
    dry_run: Option<bool>,
}

impl CleanupConfigBuilder {
    /// Sets the retention policy.
    #[must_use]
    pub const fn policy(mut self, policy: RetentionPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Sets the number of repositories processed concurrently.
    #[must_use]
    pub const fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Enables or disables dry-run mode.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = Some(dry_run);
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> CleanupConfig {
        let defaults = CleanupConfig::default();
        CleanupConfig {
            policy: self.policy.unwrap_or(defaults.policy),
            concurrency: self.concurrency.unwrap_or(defaults.concurrency),
            dry_run: self.dry_run.unwrap_or(defaults.dry_run),
        }
    }
}
