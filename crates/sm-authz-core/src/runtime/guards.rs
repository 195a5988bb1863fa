// crates/sm-authz-core/src/runtime/guards.rs
// ============================================================================
// Module: Guard Combinators
// Description: Fail-closed guard results and concurrent/sequential joins.
// Purpose: Combine independent lookups with AND and stop at the first failure.
// Dependencies: crate::{interfaces, runtime}, tokio
// ============================================================================

//! ## Overview
//! A guard is an async check that either passes or fails with a
//! [`GuardFailure`]. Independent guards are joined with [`all2`]/[`all3`].
//! In concurrent mode the join is `tokio::try_join!`: the first failure
//! returns immediately and the remaining futures are dropped, which cancels
//! their in-flight lookups. In sequential mode guards run in order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;

use crate::interfaces::LookupError;
use crate::runtime::engine::LookupMode;
use crate::runtime::outcome::DenyReason;
use crate::runtime::outcome::Outcome;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Reason a guard did not pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardFailure {
    /// Definitive business denial.
    Denied(DenyReason),
    /// Lookup failure; propagated unchanged.
    Lookup(LookupError),
}

impl From<LookupError> for GuardFailure {
    fn from(value: LookupError) -> Self {
        Self::Lookup(value)
    }
}

/// Guard result.
pub type Guard = Result<(), GuardFailure>;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Passes when `condition` holds, otherwise denies with `reason`.
pub fn ensure(condition: bool, reason: DenyReason) -> Guard {
    if condition { Ok(()) } else { Err(GuardFailure::Denied(reason)) }
}

/// Awaits a boolean lookup and denies with `reason` when it returns false.
pub async fn require<F>(lookup: F, reason: DenyReason) -> Guard
where
    F: Future<Output = Result<bool, LookupError>> + Send,
{
    ensure(lookup.await?, reason)
}

/// Converts a finished guard chain into a handler outcome.
///
/// # Errors
///
/// Returns [`LookupError`] when a lookup in the chain failed.
pub fn conclude(result: Guard) -> Result<Outcome, LookupError> {
    match result {
        Ok(()) => Ok(Outcome::Allowed),
        Err(GuardFailure::Denied(reason)) => Ok(Outcome::Denied(reason)),
        Err(GuardFailure::Lookup(err)) => Err(err),
    }
}

/// Requires both guards to pass.
pub async fn all2<A, B>(mode: LookupMode, first: A, second: B) -> Guard
where
    A: Future<Output = Guard> + Send,
    B: Future<Output = Guard> + Send,
{
    pair(mode, first, second).await.map(|_| ())
}

/// Runs two fallible loads and returns both values.
///
/// # Errors
///
/// Returns the first [`GuardFailure`] observed.
pub async fn pair<A, B, T, U>(mode: LookupMode, first: A, second: B) -> Result<(T, U), GuardFailure>
where
    A: Future<Output = Result<T, GuardFailure>> + Send,
    B: Future<Output = Result<U, GuardFailure>> + Send,
{
    match mode {
        LookupMode::Concurrent => tokio::try_join!(first, second),
        LookupMode::Sequential => {
            let first = first.await?;
            let second = second.await?;
            Ok((first, second))
        }
    }
}

/// Requires all three guards to pass.
pub async fn all3<A, B, C>(mode: LookupMode, first: A, second: B, third: C) -> Guard
where
    A: Future<Output = Guard> + Send,
    B: Future<Output = Guard> + Send,
    C: Future<Output = Guard> + Send,
{
    match mode {
        LookupMode::Concurrent => tokio::try_join!(first, second, third).map(|_| ()),
        LookupMode::Sequential => {
            first.await?;
            second.await?;
            third.await
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
