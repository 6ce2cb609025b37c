// src/store/mod.rs

//! Хранилище записей: репозитории по сущностям и их реализации.
//!
//! Сервисы не знают о конкретном бэкенде — они получают
//! `Arc<dyn Repository<_>>` при создании. Сам репозиторий атомарен
//! только на уровне отдельных вызовов.

pub mod memory;
pub mod query;
pub mod raddb;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::models::{Organization, RecordId, RecordStatus, User};

pub use memory::MemoryTable;
pub use query::{Page, QuerySpec, SortOrder};
pub use raddb::{MasterKey, RadDB, RadDbError, RadDbTable};

/// Ошибки хранилища
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("RadDB error: {0}")]
    RadDb(#[from] RadDbError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Record {collection}:{id} not found")]
    MissingRecord {
        collection: &'static str,
        id: RecordId,
    },

    #[error("Id sequence for {0} is exhausted")]
    SequenceExhausted(&'static str),

    #[error("Storage task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Запись, которую умеет хранить репозиторий
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Имя коллекции (префикс ключей)
    const COLLECTION: &'static str;

    fn id(&self) -> RecordId;
    fn assign_id(&mut self, id: RecordId);
    fn status(&self) -> RecordStatus;

    /// Совпадает ли запись с подстрокой поиска
    fn matches(&self, needle: &str) -> bool;

    /// Ключ сортировки для `order`
    fn sort_key(&self, order: SortOrder) -> String;
}

#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    /// Найти запись по id (включая удалённые)
    async fn find_by_id(&self, id: RecordId) -> StoreResult<Option<T>>;

    /// Вставить запись, назначив ей следующий id
    async fn insert(&self, record: T) -> StoreResult<T>;

    /// Перезаписать существующую запись
    async fn update(&self, record: &T) -> StoreResult<()>;

    /// Первая запись (в порядке id), подходящая под предикат
    async fn find_first(
        &self,
        predicate: &(dyn for<'a> Fn(&'a T) -> bool + Send + Sync),
    ) -> StoreResult<Option<T>>;

    /// Фильтрация, сортировка и страница
    async fn query(&self, spec: &QuerySpec) -> StoreResult<Page<T>>;
}

/// Набор репозиториев процесса
#[derive(Clone)]
pub struct Store {
    pub organizations: Arc<dyn Repository<Organization>>,
    pub users: Arc<dyn Repository<User>>,
}

impl Store {
    /// Хранилище в памяти процесса
    pub fn in_memory() -> Self {
        Self {
            organizations: Arc::new(MemoryTable::<Organization>::new()),
            users: Arc::new(MemoryTable::<User>::new()),
        }
    }

    /// Зашифрованное файловое хранилище
    pub fn open<P: AsRef<Path>>(path: P, key: &MasterKey) -> StoreResult<Self> {
        let db = Arc::new(RadDB::open(path, key)?);
        Ok(Self {
            organizations: Arc::new(RadDbTable::<Organization>::new(db.clone())),
            users: Arc::new(RadDbTable::<User>::new(db)),
        })
    }
}
