// src/models/user.rs

use serde::{Deserialize, Serialize};

use crate::models::{RecordId, RecordStatus};
use crate::store::{Record, SortOrder};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: RecordId,
    pub name: String,
    pub username: String,
    pub email: String,

    /// Организация пользователя; `None` — не привязан
    pub organization_id: Option<RecordId>,

    pub created_at: i64,
    pub updated_at: Option<i64>,
    pub status: RecordStatus,
}

impl User {
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            username: username.into(),
            email: email.into(),
            organization_id: None,
            created_at,
            updated_at: None,
            status: RecordStatus::Active,
        }
    }

    pub fn is_live(&self) -> bool {
        self.status.is_active()
    }

    pub fn apply_changes(&mut self, name: String, username: String, email: String, now: i64) {
        self.name = name;
        self.username = username;
        self.email = email;
        self.updated_at = Some(now);
    }

    /// Привязать к организации (`None` — отвязать)
    pub fn set_organization(&mut self, organization_id: Option<RecordId>, now: i64) {
        self.organization_id = organization_id;
        self.updated_at = Some(now);
    }

    pub fn mark_deleted(&mut self, at: i64) {
        self.status = RecordStatus::Deleted { at };
    }
}

impl Record for User {
    const COLLECTION: &'static str = "user";

    fn id(&self) -> RecordId {
        self.id
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn status(&self) -> RecordStatus {
        self.status
    }

    fn matches(&self, needle: &str) -> bool {
        self.name.contains(needle) || self.username.contains(needle) || self.email.contains(needle)
    }

    fn sort_key(&self, order: SortOrder) -> String {
        match order {
            SortOrder::Name => self.name.clone(),
            SortOrder::CreatedAt => self.created_at.to_string(),
        }
    }
}
