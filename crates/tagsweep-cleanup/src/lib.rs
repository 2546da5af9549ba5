//! # Tagsweep Cleanup
//!
//! Applies a keep-N retention policy to every repository of a registry
//! project and reports what was reclaimed.
//!
//! ## Overview
//!
//! The [`Cleaner`] drives one run:
//!
//! 1. Resolve the project name (run-fatal on failure)
//! 2. List the project's repositories (run-fatal on failure)
//! 3. For each repository: fetch tags, select the deletion set, delete the
//!    selected tags oldest first, and produce a [`RepositoryReport`]
//! 4. Return a [`RunReport`] with per-repository and run-wide totals
//!
//! A repository whose tags cannot be fetched is reported and skipped. A tag
//! that cannot be deleted is reported and skipped. Neither stops the run.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tagsweep_cleanup::{Cleaner, CleanupConfig};
//! use tagsweep_core::RetentionPolicy;
//! use tagsweep_registry::{RegistryAuth, RegistryClient, RegistryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = RegistryClient::new(
//!         RegistryConfig::new("https://harbor.example.com")
//!             .with_auth(RegistryAuth::basic("admin", "secret")),
//!     )?;
//!
//!     let config = CleanupConfig::builder()
//!         .policy(RetentionPolicy::new(5)?)
//!         .build();
//!
//!     let report = Cleaner::new(registry, config)?.run("library").await?;
//!     println!("reclaimed {} bytes", report.reclaimed_bytes);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cleaner;
pub mod config;
pub mod error;
pub mod report;
pub mod reporter;
pub mod shutdown;

pub use cleaner::Cleaner;
pub use config::{CleanupConfig, CleanupConfigBuilder};
pub use error::{CleanupError, Result};
pub use report::{RepositoryOutcome, RepositoryReport, RunReport, TagFailure};
pub use reporter::{ConsoleReporter, JsonReporter, Reporter};
pub use shutdown::ShutdownSignal;
