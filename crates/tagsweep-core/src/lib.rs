//! # Tagsweep Core
//!
//! Registry-independent building blocks for tag retention.
//!
//! This crate holds the pieces of tagsweep that never talk to the network:
//!
//! - [`Tag`] - A named, timestamped, sized image tag
//! - [`ordering`] - Oldest-first ordering of a repository's tags, with a
//!   checked post-condition ([`SortedTags`])
//! - [`retention`] - The keep-N policy that splits an ordered tag list into
//!   a deletion prefix and a keep suffix ([`RetentionPlan`])
//! - [`validation`] - Validation framework shared by all configuration types
//!
//! ## Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use tagsweep_core::{select_for_deletion, sort_by_creation, RetentionPolicy, Tag};
//!
//! let tags = vec![
//!     Tag::new("v3", Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(), 30),
//!     Tag::new("v1", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), 10),
//!     Tag::new("v2", Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(), 20),
//! ];
//!
//! let sorted = sort_by_creation(tags)?;
//! let policy = RetentionPolicy::new(2)?;
//! let plan = select_for_deletion(&sorted, policy);
//!
//! assert_eq!(plan.delete().len(), 1);
//! assert_eq!(plan.delete()[0].name, "v1");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod ordering;
pub mod retention;
pub mod tag;
pub mod validation;

#[cfg(test)]
mod proptest_tests;

pub use error::{Error, Result};
pub use ordering::{is_sorted_by_creation, sort_by_creation, SortedTags};
pub use retention::{select_for_deletion, RetentionPlan, RetentionPolicy, DEFAULT_KEEP};
pub use tag::{format_size, Tag};
pub use validation::{Validate, ValidationError, ValidationErrors};
