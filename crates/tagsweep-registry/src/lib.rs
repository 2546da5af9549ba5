//! # Tagsweep Registry
//!
//! Client for the Harbor v1 REST API, limited to the four calls tag
//! retention needs:
//!
//! | Operation                 | Request                                          |
//! |---------------------------|--------------------------------------------------|
//! | resolve project name → id | `GET {base}/api/projects?name={name}`            |
//! | list repositories         | `GET {base}/api/repositories?project_id={id}`    |
//! | list tags                 | `GET {base}/api/repositories/{repo}/tags`        |
//! | delete a tag              | `DELETE {base}/api/repositories/{repo}/tags/{tag}` |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tagsweep_registry::{RegistryApi, RegistryAuth, RegistryClient, RegistryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RegistryConfig::new("https://harbor.example.com")
//!         .with_auth(RegistryAuth::basic("admin", "secret"));
//!
//!     let client = RegistryClient::new(config)?;
//!     let project = client.resolve_project_id("library").await?;
//!
//!     for repository in client.list_repositories(project).await? {
//!         let tags = client.list_tags(&repository).await?;
//!         println!("{repository}: {} tags", tags.len());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! Callers that only need the operations should depend on [`RegistryApi`]
//! rather than on [`RegistryClient`] directly.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod api;
mod client;
mod config;
mod error;

pub use api::{ProjectId, RegistryApi};
pub use client::RegistryClient;
pub use config::{RegistryAuth, RegistryConfig, TlsConfig, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use error::{FailureScope, RegistryError};
