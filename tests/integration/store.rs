// tests/integration/store.rs

use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

use kbm_service::models::{Organization, User};
use kbm_service::store::{
    MemoryTable, QuerySpec, RadDB, RadDbError, RadDbTable, Repository, SortOrder, StoreError,
};
use kbm_service::{ErrorCode, OrganizationService, Store, UserService};

fn all(order: SortOrder) -> QuerySpec {
    QuerySpec {
        search: None,
        order,
        offset: 0,
        limit: usize::MAX,
    }
}

#[tokio::test]
async fn memory_ids_are_sequential() {
    let table = MemoryTable::<Organization>::new();

    let a = assert_ok!(table.insert(Organization::new("A", None, 1)).await);
    let b = assert_ok!(table.insert(Organization::new("B", None, 2)).await);

    assert_eq!((a.id, b.id), (1, 2));
}

#[tokio::test]
async fn update_of_unknown_record_fails() {
    let table = MemoryTable::<User>::new();
    let mut ghost = User::new("Ghost", "ghost", "ghost@example.com", 1);
    ghost.id = 7;

    let err = assert_err!(table.update(&ghost).await);
    assert!(matches!(err, StoreError::MissingRecord { id: 7, .. }));
}

#[tokio::test]
async fn raddb_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kbm.db");
    let key = RadDB::generate_key();

    {
        let store = assert_ok!(Store::open(&path, &key));
        let organizations = OrganizationService::new(&store);
        let users = UserService::new(&store);

        let org_id = assert_ok!(organizations.create("Acme", "1 Rd").await);
        let user_id = assert_ok!(users.create("Alice", "alice", "alice@example.com").await);
        users.associate_user_to_organization(user_id, org_id).await;
        assert_ok!(organizations.delete(org_id).await);
    }

    let store = assert_ok!(Store::open(&path, &key));
    let users = UserService::new(&store);

    let user = assert_ok!(users.get(1).await);
    assert_eq!(user.organization_id, Some(1));

    let org = assert_ok!(store.organizations.find_by_id(1).await).unwrap();
    assert!(!org.is_live());

    // id не переиспользуются после удаления и переоткрытия
    let next = assert_ok!(OrganizationService::new(&store).create("Acme", "").await);
    assert_eq!(next, 2);
}

#[tokio::test]
async fn raddb_table_queries_in_id_order() {
    let dir = tempfile::tempdir().unwrap();
    let db = Arc::new(assert_ok!(RadDB::open(dir.path().join("q.db"), &RadDB::generate_key())));
    let table = RadDbTable::<Organization>::new(db);

    for (name, created_at) in [("Same", 5), ("Same", 5), ("Other", 5)] {
        assert_ok!(table.insert(Organization::new(name, None, created_at)).await);
    }

    let page = assert_ok!(table.query(&all(SortOrder::CreatedAt)).await);
    let ids: Vec<_> = page.items.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let first = assert_ok!(table.find_first(&|o: &Organization| o.name == "Same").await);
    assert_eq!(first.map(|o| o.id), Some(1));
}

#[test]
fn raddb_rejects_wrong_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("locked.db");

    {
        let db = RadDB::open(&path, &[1u8; 32]).unwrap();
        db.set("probe".to_string(), vec![1, 2, 3]).unwrap();
    }

    match RadDB::open(&path, &[2u8; 32]) {
        Err(RadDbError::Decryption(_)) => {}
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("opened with a wrong key"),
    }
}

#[tokio::test]
async fn failed_write_leaves_store_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    std::fs::create_dir(&data).unwrap();
    let key = RadDB::generate_key();

    let store = assert_ok!(Store::open(data.join("kbm.db"), &key));
    let organizations = OrganizationService::new(&store);
    let id = assert_ok!(organizations.create("Acme", "1 Rd").await);

    std::fs::remove_dir_all(&data).unwrap();

    let err = assert_err!(organizations.delete(id).await);
    assert_eq!(err.code(), ErrorCode::Internal);
    let err = assert_err!(organizations.create("Globex", "").await);
    assert_eq!(err.code(), ErrorCode::Internal);

    let org = assert_ok!(organizations.get(id).await);
    assert!(org.is_live());
    let page = assert_ok!(store.organizations.query(&all(SortOrder::Name)).await);
    assert_eq!(page.total, 1);

    // неудачная вставка не расходует id
    std::fs::create_dir(&data).unwrap();
    let next = assert_ok!(organizations.create("Globex", "").await);
    assert_eq!(next, 2);
}

#[test]
fn failed_set_is_not_visible() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    std::fs::create_dir(&data).unwrap();

    let db = RadDB::open(data.join("kv.db"), &[3u8; 32]).unwrap();
    db.set("kept".to_string(), vec![1]).unwrap();
    std::fs::remove_dir_all(&data).unwrap();

    assert!(db.set("lost".to_string(), vec![2]).is_err());
    assert!(db.next_sequence("org").is_err());

    assert_eq!(db.get("lost").unwrap(), None);
    assert_eq!(db.get("seq:org").unwrap(), None);
    assert_eq!(db.get("kept").unwrap(), Some(vec![1]));
}
