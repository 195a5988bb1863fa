// crates/sm-authz-core/tests/properties.rs
// ============================================================================
// Module: Authorization Property Tests
// Description: Randomized checks of the decision rules across callers and batches.
// Purpose: Ensure allow decisions always imply the required caller capabilities.
// Dependencies: sm-authz-core, proptest, tokio
// ============================================================================

//! ## Overview
//! Property tests drive the engine with generated callers, access bits and
//! batches and compare every decision against the closed-form rule it must
//! follow.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::unwrap_in_result,
    reason = "Test setup uses unwraps for clarity."
)]

mod common;

use proptest::prelude::*;
use sm_authz_core::AccessBits;
use sm_authz_core::AccessPolicy;
use sm_authz_core::AccessPolicyOperation;
use sm_authz_core::AccessPolicyUpdate;
use sm_authz_core::AuthorizationTarget;
use sm_authz_core::ClientClass;
use sm_authz_core::SecretAccessPoliciesOperation;
use sm_authz_core::SecretAccessPoliciesUpdates;
use sm_authz_core::ServiceAccountGrant;
use sm_authz_core::UserProjectAccessPolicy;

use crate::common::Fixture;
use crate::common::TestCaller;
use crate::common::block_on;
use crate::common::decide;

// ============================================================================
// SECTION: Strategies
// ============================================================================

/// Strategy over caller classes.
fn client_class() -> impl Strategy<Value = ClientClass> {
    prop_oneof![
        Just(ClientClass::User),
        Just(ClientClass::ServiceAccount),
        Just(ClientClass::Organization),
    ]
}

/// Strategy over single-edge operations.
fn operation() -> impl Strategy<Value = AccessPolicyOperation> {
    prop_oneof![
        Just(AccessPolicyOperation::Create),
        Just(AccessPolicyOperation::Update),
        Just(AccessPolicyOperation::Delete),
    ]
}

/// Strategy over access bits.
fn bits() -> impl Strategy<Value = AccessBits> {
    (any::<bool>(), any::<bool>()).prop_map(|(read, write)| AccessBits::new(read, write))
}

// ============================================================================
// SECTION: Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Tests a single project edge is allowed exactly for capable user callers.
    #[test]
    fn single_edge_allow_requires_capable_user(
        class in client_class(),
        admin in any::<bool>(),
        secrets_manager in any::<bool>(),
        project_bits in bits(),
        operation in operation(),
    ) {
        let fixture = Fixture::seeded();
        fixture.project_access(project_bits);
        let caller = TestCaller {
            client_class: class,
            caller_id: Some(fixture.caller_id),
            secrets_manager_access: secrets_manager,
            organization_admin: admin,
        };
        let target = AuthorizationTarget::AccessPolicy(AccessPolicy::UserProject(
            UserProjectAccessPolicy {
                organization_user_id: fixture.organization_user.id,
                granted_project_id: fixture.project.id,
                granted_project: None,
                access: AccessBits::FULL,
            },
        ));

        let decision = block_on(decide(&fixture.authorizer(), &caller, operation, target));

        let expected = secrets_manager
            && class == ClientClass::User
            && (admin || project_bits.write);
        prop_assert_eq!(decision.is_allowed(), expected);
    }

    /// Tests a secret batch is allowed only with write on the secret and every created account.
    #[test]
    fn secret_batch_allow_requires_write_on_created_accounts(
        secret_bits in bits(),
        accounts in prop::collection::vec((bits(), any::<bool>()), 1..6),
    ) {
        let fixture = Fixture::seeded();
        fixture.secret_access(secret_bits);
        let mut updates = SecretAccessPoliciesUpdates {
            secret_id: fixture.secret.id,
            organization_id: fixture.organization_id,
            user_updates: Vec::new(),
            group_updates: Vec::new(),
            service_account_updates: Vec::new(),
        };
        let mut created_writable = true;
        for (account_bits, created) in &accounts {
            let service_account = fixture.add_service_account();
            fixture.store.set_service_account_access(
                fixture.caller_id,
                service_account.id,
                *account_bits,
            );
            let grant = ServiceAccountGrant {
                service_account_id: service_account.id,
                access: AccessBits::new(true, false),
            };
            if *created {
                created_writable &= account_bits.write;
                updates.service_account_updates.push(AccessPolicyUpdate::create(grant));
            } else {
                updates.service_account_updates.push(AccessPolicyUpdate::update(grant));
            }
        }

        let decision = block_on(decide(
            &fixture.authorizer(),
            &fixture.user(),
            SecretAccessPoliciesOperation::Updates,
            AuthorizationTarget::SecretAccessPoliciesUpdates(updates),
        ));

        prop_assert_eq!(decision.is_allowed(), secret_bits.write && created_writable);
    }
}
