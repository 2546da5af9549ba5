//! Property-based tests for ordering and retention.
//!
//! These tests use proptest to verify invariants across many randomly generated inputs.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

use crate::{is_sorted_by_creation, select_for_deletion, sort_by_creation, RetentionPolicy, Tag};

/// Strategy for generating creation timestamps.
///
/// Drawn from a narrow window so that ties are common.
fn created_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..50).prop_map(|offset| Utc.timestamp_opt(1_600_000_000 + offset, 0).unwrap())
}

/// Strategy for generating a repository's tag listing in response order.
///
/// Names are made unique by suffixing the listing position.
fn tags_strategy() -> impl Strategy<Value = Vec<Tag>> {
    prop::collection::vec(
        ("(v|release-|build-)[0-9]{1,3}", created_strategy(), 0u64..5_000_000_000),
        0..40,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (name, created, size))| Tag::new(format!("{name}-{i}"), created, size))
            .collect()
    })
}

fn policy_strategy() -> impl Strategy<Value = RetentionPolicy> {
    (0usize..50).prop_map(RetentionPolicy::keeping)
}

proptest! {
    /// The deletion set always has max(0, len - keep) members.
    #[test]
    fn deletion_count_matches_policy(tags in tags_strategy(), policy in policy_strategy()) {
        let total = tags.len();
        let sorted = sort_by_creation(tags).unwrap();
        let plan = select_for_deletion(&sorted, policy);

        prop_assert_eq!(plan.delete().len(), total.saturating_sub(policy.keep()));
        prop_assert_eq!(plan.keep().len(), total.min(policy.keep()));
    }

    /// Delete and keep sets partition the listing exactly.
    #[test]
    fn plan_partitions_listing(tags in tags_strategy(), policy in policy_strategy()) {
        let sorted = sort_by_creation(tags).unwrap();
        let plan = select_for_deletion(&sorted, policy);

        let mut rebuilt: Vec<&Tag> = plan.delete().iter().collect();
        rebuilt.extend(plan.keep());
        let original: Vec<&Tag> = sorted.iter().collect();
        prop_assert_eq!(rebuilt, original);

        for deleted in plan.delete() {
            prop_assert!(plan.keep().iter().all(|kept| kept.name != deleted.name));
        }
    }

    /// Every deleted tag is no newer than every kept tag.
    #[test]
    fn deleted_tags_are_oldest(tags in tags_strategy(), policy in policy_strategy()) {
        let sorted = sort_by_creation(tags).unwrap();
        let plan = select_for_deletion(&sorted, policy);

        if let (Some(newest_deleted), Some(oldest_kept)) = (plan.delete().last(), plan.keep().first()) {
            prop_assert!(newest_deleted.created <= oldest_kept.created);
        }
    }

    /// Keeping at least as many tags as exist deletes nothing.
    #[test]
    fn large_keep_is_noop(tags in tags_strategy(), extra in 0usize..10) {
        let keep = tags.len() + extra;
        let sorted = sort_by_creation(tags).unwrap();
        prop_assert!(select_for_deletion(&sorted, RetentionPolicy::keeping(keep)).is_noop());
    }

    /// Applying the policy to what it kept selects nothing further.
    #[test]
    fn second_pass_is_noop(tags in tags_strategy(), policy in policy_strategy()) {
        let sorted = sort_by_creation(tags).unwrap();
        let survivors = select_for_deletion(&sorted, policy).keep().to_vec();

        let resorted = sort_by_creation(survivors).unwrap();
        prop_assert!(select_for_deletion(&resorted, policy).is_noop());
    }

    /// Sorting yields ascending order and keeps response order for ties.
    #[test]
    fn sort_is_stable(tags in tags_strategy()) {
        let sorted = sort_by_creation(tags.clone()).unwrap();
        prop_assert!(is_sorted_by_creation(&sorted));

        let position = |name: &str| tags.iter().position(|t| t.name == name).unwrap();
        for pair in sorted.windows(2) {
            if pair[0].created == pair[1].created {
                prop_assert!(position(&pair[0].name) < position(&pair[1].name));
            }
        }
    }
}
