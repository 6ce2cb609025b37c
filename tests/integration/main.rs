// tests/integration/main.rs

mod organizations;
mod store;

use kbm_service::{OrganizationService, Store, UserService};

/// Свежее хранилище в памяти и оба сервиса поверх него
pub fn setup() -> (Store, OrganizationService, UserService) {
    let store = Store::in_memory();
    let organizations = OrganizationService::new(&store);
    let users = UserService::new(&store);
    (store, organizations, users)
}
