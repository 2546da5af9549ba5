//! Image tag model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single tag of a repository.
///
/// Tags are immutable once created remotely; locally a tag is either present
/// in a listing or it is not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name, unique within its repository.
    pub name: String,

    /// Creation timestamp reported by the registry.
    pub created: DateTime<Utc>,

    /// Image size in bytes.
    pub size: u64,

    /// Content digest, when the registry reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl Tag {
    /// Creates a new tag without a digest.
    #[must_use]
    pub fn new(name: impl Into<String>, created: DateTime<Utc>, size: u64) -> Self {
        Self {
            name: name.into(),
            created,
            size,
            digest: None,
        }
    }
}

/// Formats a byte count as mebibytes with two decimals, e.g. `"12.50 MB"`.
///
/// # Examples
///
/// ```
/// use tagsweep_core::format_size;
///
/// assert_eq!(format_size(0), "0.00 MB");
/// assert_eq!(format_size(3 * 1024 * 1024 / 2), "1.50 MB");
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}
