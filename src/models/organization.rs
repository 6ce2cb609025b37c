// src/models/organization.rs

use serde::{Deserialize, Serialize};

use crate::models::{RecordId, RecordStatus};
use crate::store::{Record, SortOrder};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Organization {
    pub id: RecordId,
    pub name: String,
    pub address: Option<String>,
    pub created_at: i64,
    pub updated_at: Option<i64>,
    pub status: RecordStatus,
}

impl Organization {
    /// Новая организация без id — id назначит хранилище при вставке
    pub fn new(name: impl Into<String>, address: Option<String>, created_at: i64) -> Self {
        Self {
            id: 0,
            name: name.into(),
            address: normalize_address(address),
            created_at,
            updated_at: None,
            status: RecordStatus::Active,
        }
    }

    pub fn is_live(&self) -> bool {
        self.status.is_active()
    }

    /// Перезаписать изменяемые поля
    pub fn apply_changes(&mut self, name: String, address: Option<String>, now: i64) {
        self.name = name;
        self.address = normalize_address(address);
        self.updated_at = Some(now);
    }

    pub fn mark_deleted(&mut self, at: i64) {
        self.status = RecordStatus::Deleted { at };
    }

    /// Адрес в виде строки для ответов (пустая строка = не задан)
    pub fn address_or_empty(&self) -> &str {
        self.address.as_deref().unwrap_or_default()
    }
}

fn normalize_address(address: Option<String>) -> Option<String> {
    address.filter(|a| !a.is_empty())
}

impl Record for Organization {
    const COLLECTION: &'static str = "org";

    fn id(&self) -> RecordId {
        self.id
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn status(&self) -> RecordStatus {
        self.status
    }

    // Поиск по name или address, с учётом регистра
    fn matches(&self, needle: &str) -> bool {
        self.name.contains(needle)
            || self.address.as_deref().is_some_and(|a| a.contains(needle))
    }

    fn sort_key(&self, order: SortOrder) -> String {
        match order {
            SortOrder::Name => self.name.clone(),
            SortOrder::CreatedAt => self.created_at.to_string(),
        }
    }
}
