//! Oldest-first ordering of a repository's tags.
//!
//! Tag A precedes tag B iff A was created strictly earlier than B. Tags with
//! identical timestamps keep the order in which the registry listed them, so
//! the relation is total and deterministic. The sorted list is checked after
//! sorting; only a list that passed the check can reach the retention engine.

use std::ops::Deref;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::tag::Tag;

/// A tag list in ascending creation order (oldest first).
///
/// Only constructed by [`sort_by_creation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SortedTags(Vec<Tag>);

impl SortedTags {
    /// Returns the tags as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Tag] {
        &self.0
    }
}

impl Deref for SortedTags {
    type Target = [Tag];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> IntoIterator for &'a SortedTags {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Sorts tags oldest first and verifies the result.
///
/// # Errors
///
/// Returns [`Error::OrderingViolation`] if the sorted list fails the
/// ascending-order check.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use tagsweep_core::{sort_by_creation, Tag};
///
/// let sorted = sort_by_creation(vec![
///     Tag::new("new", Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(), 1),
///     Tag::new("old", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), 1),
/// ])?;
/// assert_eq!(sorted[0].name, "old");
/// # Ok::<(), tagsweep_core::Error>(())
/// ```
pub fn sort_by_creation(mut tags: Vec<Tag>) -> Result<SortedTags> {
    // `sort_by` is stable: equal timestamps keep response order.
    tags.sort_by(|a, b| a.created.cmp(&b.created));
    check_order(&tags)?;
    Ok(SortedTags(tags))
}

/// Returns true if `tags` is in ascending creation order.
#[must_use]
pub fn is_sorted_by_creation(tags: &[Tag]) -> bool {
    check_order(tags).is_ok()
}

fn check_order(tags: &[Tag]) -> Result<()> {
    match tags
        .windows(2)
        .position(|pair| pair[0].created > pair[1].created)
    {
        Some(i) => Err(Error::OrderingViolation {
            index: i + 1,
            tag: tags[i + 1].name.clone(),
        }),
        None => Ok(()),
    }
}
