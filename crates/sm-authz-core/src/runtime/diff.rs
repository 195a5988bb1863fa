// crates/sm-authz-core/src/runtime/diff.rs
// ============================================================================
// Module: Grant Diffing
// Description: Computes grants introduced by a proposed replacement set.
// Purpose: Limit access lookups to grants that are actually new.
// ============================================================================

//! Grant-set diffing. Pure; performs no lookups.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

// ============================================================================
// SECTION: Diff Engine
// ============================================================================

/// Computes newly introduced grants.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrantDiffEngine;

impl GrantDiffEngine {
    /// Returns the ids in `proposed` that are absent from `current`.
    ///
    /// An empty `current` set yields every proposed id.
    #[must_use]
    pub fn new_grants<K: Ord + Copy>(current: &BTreeSet<K>, proposed: &BTreeSet<K>) -> BTreeSet<K> {
        proposed.difference(current).copied().collect()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
