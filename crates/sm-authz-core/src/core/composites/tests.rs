// crates/sm-authz-core/src/core/composites/tests.rs
// ============================================================================
// Module: Composite Grant Request Tests
// Description: Unit tests for composite id collection helpers.
// ============================================================================

//! Composite helper unit tests.

use super::AccessPolicyUpdate;
use super::SecretAccessPoliciesUpdates;
use super::ServiceAccountGrant;
use super::UserGrant;
use crate::core::access::AccessBits;
use crate::core::identifiers::OrganizationId;
use crate::core::identifiers::OrganizationUserId;
use crate::core::identifiers::SecretId;
use crate::core::identifiers::ServiceAccountId;

fn service_account_grant(id: ServiceAccountId) -> ServiceAccountGrant {
    ServiceAccountGrant {
        service_account_id: id,
        access: AccessBits::FULL,
    }
}

#[test]
fn created_ids_ignore_updates_and_deletes() {
    let created = ServiceAccountId::new();
    let updated = ServiceAccountId::new();
    let deleted = ServiceAccountId::new();
    let updates = SecretAccessPoliciesUpdates {
        secret_id: SecretId::new(),
        organization_id: OrganizationId::new(),
        user_updates: Vec::new(),
        group_updates: Vec::new(),
        service_account_updates: vec![
            AccessPolicyUpdate::create(service_account_grant(created)),
            AccessPolicyUpdate::create(service_account_grant(created)),
            AccessPolicyUpdate::update(service_account_grant(updated)),
            AccessPolicyUpdate::delete(service_account_grant(deleted)),
        ],
    };

    assert_eq!(updates.created_service_account_ids().into_iter().collect::<Vec<_>>(), vec![
        created
    ]);
    assert_eq!(updates.service_account_ids().len(), 3);
    assert!(!updates.all_creates());
    assert_eq!(updates.edge_count(), 4);
}

#[test]
fn empty_batch_reports_empty() {
    let updates = SecretAccessPoliciesUpdates {
        secret_id: SecretId::new(),
        organization_id: OrganizationId::new(),
        user_updates: Vec::new(),
        group_updates: Vec::new(),
        service_account_updates: Vec::new(),
    };
    assert!(updates.is_empty());
    assert!(updates.all_creates());
}

#[test]
fn user_ids_are_distinct() {
    let user = OrganizationUserId::new();
    let grant = UserGrant {
        organization_user_id: user,
        access: AccessBits::new(true, false),
    };
    let updates = SecretAccessPoliciesUpdates {
        secret_id: SecretId::new(),
        organization_id: OrganizationId::new(),
        user_updates: vec![AccessPolicyUpdate::create(grant), AccessPolicyUpdate::update(grant)],
        group_updates: Vec::new(),
        service_account_updates: Vec::new(),
    };
    assert_eq!(updates.organization_user_ids().len(), 1);
}
