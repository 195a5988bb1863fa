// crates/sm-authz-core/src/core/access/tests.rs
// ============================================================================
// Module: Access Classification Tests
// Description: Unit tests for client-class mapping and access bit helpers.
// ============================================================================

//! Access classification unit tests.

use super::AccessBits;
use super::AccessClientType;
use super::ClientClass;

#[test]
fn admin_user_maps_to_no_access_check() {
    assert_eq!(
        AccessClientType::from_client_class(ClientClass::User, true),
        AccessClientType::NoAccessCheck
    );
    assert_eq!(AccessClientType::from_client_class(ClientClass::User, false), AccessClientType::User);
}

#[test]
fn admin_flag_does_not_elevate_machine_callers() {
    for admin in [false, true] {
        assert_eq!(
            AccessClientType::from_client_class(ClientClass::ServiceAccount, admin),
            AccessClientType::ServiceAccount
        );
        assert_eq!(
            AccessClientType::from_client_class(ClientClass::Organization, admin),
            AccessClientType::Organization
        );
    }
}

#[test]
fn only_user_and_admin_may_mutate() {
    assert!(AccessClientType::NoAccessCheck.may_mutate_policies());
    assert!(AccessClientType::User.may_mutate_policies());
    assert!(!AccessClientType::ServiceAccount.may_mutate_policies());
    assert!(!AccessClientType::Organization.may_mutate_policies());
}

#[test]
fn and_requires_both_sides() {
    let project = AccessBits::new(true, true);
    let service_account = AccessBits::new(true, false);
    assert_eq!(project.and(service_account), AccessBits::new(true, false));
    assert_eq!(AccessBits::FULL.and(AccessBits::FULL), AccessBits::FULL);
    assert_eq!(AccessBits::from((false, true)).and(AccessBits::NONE), AccessBits::NONE);
}
