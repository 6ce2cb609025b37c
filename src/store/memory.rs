// src/store/memory.rs

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::models::RecordId;
use crate::store::{Page, QuerySpec, Record, Repository, StoreError, StoreResult};

struct Table<T> {
    rows: BTreeMap<RecordId, T>,
    last_id: RecordId,
}

/// Коллекция в памяти процесса
pub struct MemoryTable<T> {
    inner: RwLock<Table<T>>,
}

impl<T: Record> MemoryTable<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Table {
                rows: BTreeMap::new(),
                last_id: 0,
            }),
        }
    }
}

impl<T: Record> Default for MemoryTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record> Repository<T> for MemoryTable<T> {
    async fn find_by_id(&self, id: RecordId) -> StoreResult<Option<T>> {
        let table = self.inner.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn insert(&self, mut record: T) -> StoreResult<T> {
        let mut table = self.inner.write().await;
        let id = table
            .last_id
            .checked_add(1)
            .ok_or(StoreError::SequenceExhausted(T::COLLECTION))?;

        table.last_id = id;
        record.assign_id(id);
        table.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn update(&self, record: &T) -> StoreResult<()> {
        let mut table = self.inner.write().await;
        match table.rows.get_mut(&record.id()) {
            Some(row) => {
                *row = record.clone();
                Ok(())
            }
            None => Err(StoreError::MissingRecord {
                collection: T::COLLECTION,
                id: record.id(),
            }),
        }
    }

    async fn find_first(
        &self,
        predicate: &(dyn for<'a> Fn(&'a T) -> bool + Send + Sync),
    ) -> StoreResult<Option<T>> {
        let table = self.inner.read().await;
        Ok(table.rows.values().find(|r| predicate(*r)).cloned())
    }

    async fn query(&self, spec: &QuerySpec) -> StoreResult<Page<T>> {
        let rows: Vec<T> = {
            let table = self.inner.read().await;
            table.rows.values().cloned().collect()
        };
        Ok(spec.apply(rows))
    }
}
