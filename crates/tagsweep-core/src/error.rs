//! Error types for tagsweep core operations.

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tagsweep core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The tag list was not in ascending creation order after sorting.
    ///
    /// This is a data-integrity failure, not a transient one.
    #[error("tags not sorted by creation time: tag '{tag}' at position {index} is older than its predecessor")]
    OrderingViolation {
        /// Position of the first out-of-order tag.
        index: usize,
        /// Name of the first out-of-order tag.
        tag: String,
    },
}
