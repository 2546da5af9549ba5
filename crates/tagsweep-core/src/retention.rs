//! Keep-N retention policy.
//!
//! Given a repository's tags in ascending age order, the newest `keep` tags
//! survive and everything older is selected for deletion.

use serde::{Deserialize, Serialize};

use crate::ordering::SortedTags;
use crate::tag::Tag;
use crate::validation::ValidationError;

/// Number of tags kept per repository when nothing else is configured.
pub const DEFAULT_KEEP: usize = 5;

/// A validated retention count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RetentionPolicy {
    keep: usize,
}

impl RetentionPolicy {
    /// Creates a policy from a raw, possibly negative, retention count.
    ///
    /// # Errors
    ///
    /// Returns a `Range` validation error if `keep` is negative or does not
    /// fit in `usize`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagsweep_core::RetentionPolicy;
    ///
    /// assert_eq!(RetentionPolicy::new(3).unwrap().keep(), 3);
    /// assert!(RetentionPolicy::new(-1).is_err());
    /// ```
    pub fn new(keep: i64) -> Result<Self, ValidationError> {
        if keep < 0 {
            return Err(ValidationError::range(
                "keep",
                format!("retention count must not be negative, got {keep}"),
            ));
        }
        usize::try_from(keep)
            .map(Self::keeping)
            .map_err(|_| ValidationError::range("keep", format!("retention count {keep} is too large")))
    }

    /// Creates a policy keeping `keep` tags.
    #[must_use]
    pub const fn keeping(keep: usize) -> Self {
        Self { keep }
    }

    /// Returns the number of tags kept per repository.
    #[must_use]
    pub const fn keep(self) -> usize {
        self.keep
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::keeping(DEFAULT_KEEP)
    }
}

/// The partition of one repository's tags into a deletion set and a keep set.
///
/// Both halves borrow from the same [`SortedTags`], so they never overlap and
/// together always cover the whole list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPlan<'a> {
    delete: &'a [Tag],
    keep: &'a [Tag],
}

impl<'a> RetentionPlan<'a> {
    /// Tags to delete, oldest first.
    #[must_use]
    pub const fn delete(&self) -> &'a [Tag] {
        self.delete
    }

    /// Tags that survive, oldest first.
    #[must_use]
    pub const fn keep(&self) -> &'a [Tag] {
        self.keep
    }

    /// Returns true when nothing needs to be deleted.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.delete.is_empty()
    }

    /// Total number of tags the plan was computed from.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.delete.len() + self.keep.len()
    }

    /// Sum of the sizes of all tags selected for deletion.
    #[must_use]
    pub fn reclaimable_bytes(&self) -> u64 {
        self.delete.iter().map(|t| t.size).sum()
    }
}

/// Splits `tags` into the oldest `len - keep` tags (deleted) and the newest
/// `keep` tags (kept).
///
/// If the repository holds `keep` tags or fewer the deletion set is empty.
/// A policy keeping zero tags deletes everything.
#[must_use]
pub fn select_for_deletion(tags: &SortedTags, policy: RetentionPolicy) -> RetentionPlan<'_> {
    let tags = tags.as_slice();
    let cut = tags.len().saturating_sub(policy.keep());
    let (delete, keep) = tags.split_at(cut);
    RetentionPlan { delete, keep }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::sort_by_creation;
    use chrono::{TimeZone, Utc};

    fn repository(count: u32) -> SortedTags {
        let tags = (1..=count)
            .map(|i| {
                Tag::new(
                    format!("T{i}"),
                    Utc.with_ymd_and_hms(2024, 1, i, 0, 0, 0).unwrap(),
                    u64::from(i) * 100,
                )
            })
            .collect();
        sort_by_creation(tags).unwrap()
    }

    fn names(tags: &[Tag]) -> Vec<&str> {
        tags.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_seven_tags_keep_five() {
        let tags = repository(7);
        let plan = select_for_deletion(&tags, RetentionPolicy::keeping(5));

        assert_eq!(names(plan.delete()), vec!["T1", "T2"]);
        assert_eq!(names(plan.keep()), vec!["T3", "T4", "T5", "T6", "T7"]);
        assert_eq!(plan.reclaimable_bytes(), 300);
    }

    #[test]
    fn test_fewer_tags_than_keep_is_noop() {
        let tags = repository(3);
        let plan = select_for_deletion(&tags, RetentionPolicy::keeping(5));

        assert!(plan.is_noop());
        assert_eq!(plan.keep().len(), 3);
        assert_eq!(plan.total(), 3);
    }

    #[test]
    fn test_exactly_keep_is_noop() {
        let tags = repository(5);
        assert!(select_for_deletion(&tags, RetentionPolicy::keeping(5)).is_noop());
    }

    #[test]
    fn test_keep_zero_deletes_everything() {
        let tags = repository(4);
        let plan = select_for_deletion(&tags, RetentionPolicy::keeping(0));

        assert_eq!(plan.delete().len(), 4);
        assert!(plan.keep().is_empty());
    }

    #[test]
    fn test_empty_repository() {
        let tags = repository(0);
        let plan = select_for_deletion(&tags, RetentionPolicy::keeping(0));
        assert!(plan.is_noop());
        assert_eq!(plan.total(), 0);
    }

    #[test]
    fn test_negative_keep_rejected() {
        let err = RetentionPolicy::new(-3).unwrap_err();
        assert_eq!(err.field, "keep");
        assert!(err.message.contains("-3"));
    }

    #[test]
    fn test_default_keeps_five() {
        assert_eq!(RetentionPolicy::default().keep(), DEFAULT_KEEP);
        assert_eq!(RetentionPolicy::new(0).unwrap().keep(), 0);
    }
}
