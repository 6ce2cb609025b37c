// tests/integration/organizations.rs

use kbm_service::models::{unix_now, Organization, RecordStatus};
use kbm_service::services::organization::{ORGANIZATION_DELETED, ORGANIZATION_UPDATED};
use kbm_service::{ErrorCode, QueryParams};
use tokio_test::{assert_err, assert_ok};

use crate::setup;

#[tokio::test]
async fn create_returns_positive_id() {
    let (_, organizations, _) = setup();

    let id = assert_ok!(organizations.create("New Organization", "123 Main St").await);
    assert!(id > 0);

    let other = assert_ok!(organizations.create("Another Organization", "").await);
    assert_ne!(id, other);
}

#[tokio::test]
async fn create_without_name_is_rejected() {
    let (store, organizations, _) = setup();

    for name in ["", "   "] {
        let err = assert_err!(organizations.create(name, "123 Main St").await);
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
        assert_eq!(err.to_string(), "Organization name is required.");
    }

    assert!(assert_ok!(store.organizations.find_by_id(1).await).is_none());
}

#[tokio::test]
async fn duplicate_name_is_rejected_until_deleted() {
    let (_, organizations, _) = setup();

    let first = assert_ok!(organizations.create("Acme", "1 Rd").await);
    assert_eq!(first, 1);

    let err = assert_err!(organizations.create("Acme", "").await);
    assert_eq!(err.code(), ErrorCode::AlreadyExists);

    let message = assert_ok!(organizations.delete(first).await);
    assert_eq!(message, "Organization deleted successfully.");

    let err = assert_err!(organizations.get(first).await);
    assert_eq!(err.code(), ErrorCode::NotFound);

    let second = assert_ok!(organizations.create("Acme", "").await);
    assert!(second > first);
}

#[tokio::test]
async fn get_returns_stored_fields() {
    let (store, organizations, _) = setup();
    let seeded = assert_ok!(
        store
            .organizations
            .insert(Organization::new("Test Org", Some("123 Main St".to_string()), 1_700_000_000))
            .await
    );

    let organization = assert_ok!(organizations.get(seeded.id).await);

    assert_eq!(organization.name, "Test Org");
    assert_eq!(organization.address_or_empty(), "123 Main St");
    assert_eq!(organization.created_at, 1_700_000_000);
}

#[tokio::test]
async fn get_missing_or_deleted_is_not_found() {
    let (store, organizations, _) = setup();

    let err = assert_err!(organizations.get(999).await);
    assert_eq!(err.code(), ErrorCode::NotFound);

    let mut deleted = Organization::new("Deleted Org", None, unix_now());
    deleted.mark_deleted(unix_now());
    let deleted = assert_ok!(store.organizations.insert(deleted).await);

    let err = assert_err!(organizations.get(deleted.id).await);
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn update_overwrites_name_and_address_only() {
    let (store, organizations, _) = setup();
    let seeded = assert_ok!(
        store
            .organizations
            .insert(Organization::new("Org to Update", Some("Old Address".to_string()), 42))
            .await
    );

    let message = assert_ok!(organizations.update(seeded.id, "Updated Org", "New Address").await);
    assert_eq!(message, ORGANIZATION_UPDATED);

    let stored = assert_ok!(store.organizations.find_by_id(seeded.id).await).unwrap();
    assert_eq!(stored.id, seeded.id);
    assert_eq!(stored.created_at, 42);
    assert_eq!(stored.name, "Updated Org");
    assert_eq!(stored.address.as_deref(), Some("New Address"));
    assert!(stored.updated_at.is_some_and(|t| t > 0));
    assert_eq!(stored.status, RecordStatus::Active);
}

#[tokio::test]
async fn update_rejects_missing_deleted_and_blank_name() {
    let (_, organizations, _) = setup();

    let err = assert_err!(organizations.update(999, "Non-existent Org", "Address").await);
    assert_eq!(err.code(), ErrorCode::NotFound);

    let id = assert_ok!(organizations.create("Keep", "").await);
    let err = assert_err!(organizations.update(id, "", "Address").await);
    assert_eq!(err.code(), ErrorCode::InvalidArgument);

    let unchanged = assert_ok!(organizations.get(id).await);
    assert_eq!(unchanged.name, "Keep");

    assert_ok!(organizations.delete(id).await);
    let err = assert_err!(organizations.update(id, "Renamed", "").await);
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn delete_is_soft_and_not_repeatable() {
    let (store, organizations, _) = setup();
    let id = assert_ok!(organizations.create("Org to Delete", "Address").await);

    let message = assert_ok!(organizations.delete(id).await);
    assert_eq!(message, ORGANIZATION_DELETED);

    let stored = assert_ok!(store.organizations.find_by_id(id).await).unwrap();
    assert!(!stored.is_live());
    assert!(stored.status.deleted_at().is_some_and(|t| t > 0));

    let err = assert_err!(organizations.delete(id).await);
    assert_eq!(err.code(), ErrorCode::NotFound);

    let err = assert_err!(organizations.delete(999).await);
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn query_pages_live_matches() {
    let (_, organizations, _) = setup();
    for name in ["Delta", "Alpha", "Echo", "Charlie", "Bravo"] {
        assert_ok!(organizations.create(name, "Main Street").await);
    }
    let doomed = assert_ok!(organizations.create("Zulu", "Main Street").await);
    assert_ok!(organizations.delete(doomed).await);

    let result = assert_ok!(organizations.query(&QueryParams::new("", "Name", 2, 2)).await);

    let names: Vec<_> = result.items.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["Charlie", "Delta"]);
    assert_eq!(result.total, 5);
    assert_eq!(result.page, 2);
    assert_eq!(result.page_size, 2);

    let last = assert_ok!(organizations.query(&QueryParams::new("", "Name", 3, 2)).await);
    assert_eq!(last.items.len(), 1);
    assert_eq!(last.total, 5);
}

#[tokio::test]
async fn query_filters_by_name_or_address() {
    let (_, organizations, _) = setup();
    assert_ok!(organizations.create("Acme", "1 Rd").await);
    assert_ok!(organizations.create("Globex", "Acme Tower").await);
    assert_ok!(organizations.create("Initech", "2 Rd").await);

    let result = assert_ok!(organizations.query(&QueryParams::new("Acme", "Name", 1, 10)).await);
    assert_eq!(result.total, 2);

    let result = assert_ok!(organizations.query(&QueryParams::new("Rd", "", 1, 10)).await);
    assert_eq!(result.total, 2);

    // пробелы — без фильтра
    let result = assert_ok!(organizations.query(&QueryParams::new("  ", "", 1, 10)).await);
    assert_eq!(result.total, 3);
}

#[tokio::test]
async fn query_defaults_to_creation_order() {
    let (store, organizations, _) = setup();
    for (name, created_at) in [("Late", 300), ("Early", 100), ("Middle", 200)] {
        assert_ok!(
            store
                .organizations
                .insert(Organization::new(name, None, created_at))
                .await
        );
    }

    let result = assert_ok!(organizations.query(&QueryParams::new("", "CreatedAt", 1, 10)).await);
    let names: Vec<_> = result.items.iter().map(|o| o.name.as_str()).collect();

    assert_eq!(names, vec!["Early", "Middle", "Late"]);
}

#[tokio::test]
async fn query_rejects_bad_paging() {
    let (_, organizations, _) = setup();

    let err = assert_err!(organizations.query(&QueryParams::new("", "Name", 0, 10)).await);
    assert_eq!(err.code(), ErrorCode::InvalidArgument);

    let err = assert_err!(organizations.query(&QueryParams::new("", "Name", 1, 0)).await);
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
}
