// src/store/raddb.rs

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Key, Nonce,
};
use async_trait::async_trait;
use rand::{rngs::OsRng, RngCore};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;

use crate::models::RecordId;
use crate::store::{Page, QuerySpec, Record, Repository, StoreError, StoreResult};

#[derive(Debug, Error)]
pub enum RadDbError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Decryption error: {0}")]
    Decryption(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("RadDB lock poisoned")]
    Poisoned,
}

/// Ключ шифрования (32 байта = 256 бит)
pub type MasterKey = [u8; 32];

const NONCE_LEN: usize = 12;

/// RadDB — зашифрованная embedded база
pub struct RadDB {
    path: PathBuf,
    cipher: Aes256Gcm,
    cache: RwLock<HashMap<String, Vec<u8>>>,
    // сериализует запись файла на диск
    io_lock: Mutex<()>,
}

impl RadDB {
    /// Открыть базу по пути с мастер-ключом
    pub fn open<P: AsRef<Path>>(path: P, key: &MasterKey) -> Result<Self, RadDbError> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
        let db = Self {
            path: path.as_ref().to_path_buf(),
            cipher,
            cache: RwLock::new(HashMap::new()),
            io_lock: Mutex::new(()),
        };
        db.load()?;
        Ok(db)
    }

    /// Создать новый мастер-ключ (надо сохранить!)
    pub fn generate_key() -> MasterKey {
        let mut key = [0u8; 32];
        OsRng.fill_bytes(&mut key);
        key
    }

    /// Загрузить данные из файла
    fn load(&self) -> Result<(), RadDbError> {
        // Файл не существует → пустая база
        if !self.path.exists() {
            return Ok(());
        }

        let mut file = OpenOptions::new().read(true).open(&self.path)?;
        let mut encrypted = Vec::new();
        file.read_to_end(&mut encrypted)?;

        if encrypted.is_empty() {
            return Ok(());
        }

        if encrypted.len() < NONCE_LEN {
            return Err(RadDbError::Decryption("File too short".to_string()));
        }

        let (nonce_bytes, ciphertext) = encrypted.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let payload = Payload {
            msg: ciphertext,
            aad: &[],
        };

        let plaintext = self
            .cipher
            .decrypt(nonce, payload)
            .map_err(|_| RadDbError::Decryption("AES-GCM decryption failed".to_string()))?;

        let data: HashMap<String, Vec<u8>> = bincode::deserialize(&plaintext)
            .map_err(|e| RadDbError::Serialization(e.to_string()))?;

        let mut cache = self.cache.write().map_err(|_| RadDbError::Poisoned)?;
        *cache = data;

        Ok(())
    }

    /// Сохранить данные на диск
    pub fn flush(&self) -> Result<(), RadDbError> {
        let _io = self.io_lock.lock().map_err(|_| RadDbError::Poisoned)?;
        let cache = self.cache.read().map_err(|_| RadDbError::Poisoned)?;
        self.write_snapshot(&cache)
    }

    /// Применить изменение: сначала на диск, потом в кэш.
    ///
    /// Если запись не удалась, кэш остаётся прежним.
    fn commit<R>(
        &self,
        change: impl FnOnce(&mut HashMap<String, Vec<u8>>) -> Result<R, RadDbError>,
    ) -> Result<R, RadDbError> {
        let _io = self.io_lock.lock().map_err(|_| RadDbError::Poisoned)?;

        let mut staged = self.cache.read().map_err(|_| RadDbError::Poisoned)?.clone();
        let out = change(&mut staged)?;
        self.write_snapshot(&staged)?;

        *self.cache.write().map_err(|_| RadDbError::Poisoned)? = staged;
        Ok(out)
    }

    // Шифрует снимок и атомарно подменяет файл через rename
    fn write_snapshot(&self, data: &HashMap<String, Vec<u8>>) -> Result<(), RadDbError> {
        let plaintext =
            bincode::serialize(data).map_err(|e| RadDbError::Serialization(e.to_string()))?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let payload = Payload {
            msg: &plaintext,
            aad: &[],
        };

        let ciphertext = self
            .cipher
            .encrypt(nonce, payload)
            .map_err(|_| RadDbError::Encryption("AES-GCM encryption failed".to_string()))?;

        let tmp = self.path.with_extension("tmp");
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp)?;

        file.write_all(&nonce_bytes)?;
        file.write_all(&ciphertext)?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;

        Ok(())
    }

    /// Получить значение по ключу
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RadDbError> {
        let cache = self.cache.read().map_err(|_| RadDbError::Poisoned)?;
        Ok(cache.get(key).cloned())
    }

    /// Все пары, ключ которых начинается с `prefix`
    pub fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, RadDbError> {
        let cache = self.cache.read().map_err(|_| RadDbError::Poisoned)?;
        Ok(cache
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    /// Установить значение
    pub fn set(&self, key: String, value: Vec<u8>) -> Result<(), RadDbError> {
        self.commit(|data| {
            data.insert(key, value);
            Ok(())
        })
    }

    /// Следующее значение счётчика `name` (начиная с 1), атомарно
    pub fn next_sequence(&self, name: &str) -> Result<u64, RadDbError> {
        let key = format!("seq:{}", name);
        self.commit(|data| {
            let current = match data.get(&key) {
                Some(bytes) => {
                    let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                        RadDbError::Serialization(format!("corrupt sequence {}", key))
                    })?;
                    u64::from_le_bytes(raw)
                }
                None => 0,
            };
            let next = current + 1;
            data.insert(key, next.to_le_bytes().to_vec());
            Ok(next)
        })
    }
}

// Автоматическое сохранение при выходе
impl Drop for RadDB {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// Коллекция записей `T` поверх RadDB: ключи вида `<collection>:<id>`
pub struct RadDbTable<T> {
    db: Arc<RadDB>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> RadDbTable<T> {
    pub fn new(db: Arc<RadDB>) -> Self {
        Self {
            db,
            _record: PhantomData,
        }
    }

    fn key(id: RecordId) -> String {
        format!("{}:{}", T::COLLECTION, id)
    }

    /// Сохранить объект в базу
    fn store(db: &RadDB, record: &T) -> StoreResult<()> {
        let data =
            bincode::serialize(record).map_err(|e| StoreError::Serialization(e.to_string()))?;
        db.set(Self::key(record.id()), data)?;
        Ok(())
    }

    // Запись на диск блокирует поток, поэтому уходит в spawn_blocking
    async fn blocking<R, F>(&self, f: F) -> StoreResult<R>
    where
        F: FnOnce(&RadDB) -> StoreResult<R> + Send + 'static,
        R: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&*db)).await?
    }

    /// Загрузить объект из базы
    fn load(&self, id: RecordId) -> StoreResult<Option<T>> {
        match self.db.get(&Self::key(id))? {
            Some(data) => {
                let record = bincode::deserialize(&data)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Все записи коллекции в порядке id
    fn load_all(&self) -> StoreResult<Vec<T>> {
        let prefix = format!("{}:", T::COLLECTION);
        let mut records = self
            .db
            .scan_prefix(&prefix)?
            .into_iter()
            .map(|(_, data)| {
                bincode::deserialize::<T>(&data)
                    .map_err(|e| StoreError::Serialization(e.to_string()))
            })
            .collect::<StoreResult<Vec<T>>>()?;
        records.sort_by_key(|r| r.id());
        Ok(records)
    }
}

#[async_trait]
impl<T: Record> Repository<T> for RadDbTable<T> {
    async fn find_by_id(&self, id: RecordId) -> StoreResult<Option<T>> {
        self.load(id)
    }

    async fn insert(&self, mut record: T) -> StoreResult<T> {
        self.blocking(move |db| {
            let next = db.next_sequence(T::COLLECTION)?;
            let id = RecordId::try_from(next)
                .map_err(|_| StoreError::SequenceExhausted(T::COLLECTION))?;
            record.assign_id(id);
            Self::store(db, &record)?;
            Ok(record)
        })
        .await
    }

    async fn update(&self, record: &T) -> StoreResult<()> {
        if self.db.get(&Self::key(record.id()))?.is_none() {
            return Err(StoreError::MissingRecord {
                collection: T::COLLECTION,
                id: record.id(),
            });
        }
        let record = record.clone();
        self.blocking(move |db| Self::store(db, &record)).await
    }

    async fn find_first(
        &self,
        predicate: &(dyn for<'a> Fn(&'a T) -> bool + Send + Sync),
    ) -> StoreResult<Option<T>> {
        Ok(self.load_all()?.into_iter().find(|r| predicate(r)))
    }

    async fn query(&self, spec: &QuerySpec) -> StoreResult<Page<T>> {
        Ok(spec.apply(self.load_all()?))
    }
}
