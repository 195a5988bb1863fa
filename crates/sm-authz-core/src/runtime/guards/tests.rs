// crates/sm-authz-core/src/runtime/guards/tests.rs
// ============================================================================
// Module: Guard Combinator Tests
// Description: Unit tests for guard joins and outcome conversion.
// ============================================================================

//! Guard combinator unit tests.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use super::Guard;
use super::GuardFailure;
use super::all2;
use super::all3;
use super::conclude;
use super::ensure;
use crate::interfaces::LookupError;
use crate::runtime::engine::LookupMode;
use crate::runtime::outcome::DenyReason;
use crate::runtime::outcome::Outcome;

async fn never_finishes() -> Guard {
    std::future::pending::<()>().await;
    Ok(())
}

#[tokio::test]
async fn concurrent_join_short_circuits_on_first_denial() {
    let result = all2(
        LookupMode::Concurrent,
        never_finishes(),
        async { ensure(false, DenyReason::InsufficientAccess) },
    )
    .await;
    assert_eq!(result, Err(GuardFailure::Denied(DenyReason::InsufficientAccess)));
}

#[tokio::test]
async fn sequential_join_never_polls_after_denial() {
    let polled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&polled);
    let result = all3(
        LookupMode::Sequential,
        async { Ok(()) },
        async { ensure(false, DenyReason::OrganizationMismatch) },
        async move {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        },
    )
    .await;
    assert_eq!(result, Err(GuardFailure::Denied(DenyReason::OrganizationMismatch)));
    assert!(!polled.load(Ordering::SeqCst));
}

#[tokio::test]
async fn all_passing_guards_allow() {
    for mode in [LookupMode::Concurrent, LookupMode::Sequential] {
        let result = all3(mode, async { Ok(()) }, async { Ok(()) }, async { Ok(()) }).await;
        assert_eq!(conclude(result), Ok(Outcome::Allowed));
    }
}

#[test]
fn lookup_failures_propagate() {
    let err = LookupError::Unavailable("down".to_string());
    let result: Guard = Err(GuardFailure::from(err.clone()));
    assert_eq!(conclude(result), Err(err));
}
