// crates/sm-authz-core/src/runtime/diff/tests.rs
// ============================================================================
// Module: Grant Diffing Tests
// Description: Unit tests for new-grant computation.
// ============================================================================

//! Grant diffing unit tests.

use std::collections::BTreeSet;

use proptest::prelude::*;

use super::GrantDiffEngine;
use crate::core::identifiers::ProjectId;

#[test]
fn first_time_grant_checks_everything() {
    let proposed: BTreeSet<_> = (0..4).map(|_| ProjectId::new()).collect();
    let new = GrantDiffEngine::new_grants(&BTreeSet::new(), &proposed);
    assert_eq!(new, proposed);
}

#[test]
fn existing_grant_is_not_rechecked() {
    let existing = ProjectId::new();
    let added = ProjectId::new();
    let current = BTreeSet::from([existing]);
    let proposed = BTreeSet::from([existing, added]);
    assert_eq!(GrantDiffEngine::new_grants(&current, &proposed), BTreeSet::from([added]));
}

#[test]
fn removals_introduce_nothing() {
    let kept = ProjectId::new();
    let current = BTreeSet::from([kept, ProjectId::new()]);
    let proposed = BTreeSet::from([kept]);
    assert!(GrantDiffEngine::new_grants(&current, &proposed).is_empty());
}

proptest! {
    #[test]
    fn new_grants_are_proposed_and_not_current(
        current in prop::collection::btree_set(0u16..64, 0..32),
        proposed in prop::collection::btree_set(0u16..64, 0..32),
    ) {
        let new = GrantDiffEngine::new_grants(&current, &proposed);
        prop_assert!(new.is_subset(&proposed));
        prop_assert!(new.is_disjoint(&current));
        let kept: BTreeSet<u16> = current.intersection(&proposed).copied().collect();
        let restored: BTreeSet<u16> = new.union(&kept).copied().collect();
        prop_assert_eq!(restored, proposed);
    }
}
