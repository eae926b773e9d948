//! Key-value storage tiers.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::error::StorageError;

/// Storage scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageArea {
    /// Per-tab, ephemeral.
    Session,
    /// Durable, cross-session defaults.
    Global,
}

impl fmt::Display for StorageArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageArea::Session => f.write_str("session"),
            StorageArea::Global => f.write_str("global"),
        }
    }
}

/// Flat key-value storage with a session and a global tier.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Read a value. Missing keys are `Ok(None)`.
    async fn get(&self, area: StorageArea, key: &str) -> Result<Option<Value>, StorageError>;

    /// Write a value, replacing any previous one.
    async fn set(&self, area: StorageArea, key: &str, value: Value) -> Result<(), StorageError>;

    /// Remove a value. Removing a missing key is not an error.
    async fn remove(&self, area: StorageArea, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage, for tests and for runs without a data directory.
pub struct MemoryStorage {
    records: RwLock<HashMap<StorageArea, Map<String, Value>>>,
    available: AtomicBool,
}

impl MemoryStorage {
    /// Create an empty, available store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Create a store whose every call fails with [`StorageError::Unavailable`].
    pub fn unavailable() -> Self {
        let storage = Self::new();
        storage.set_available(false);
        storage
    }

    /// Toggle availability without losing stored records.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check(&self, area: StorageArea) -> Result<(), StorageError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable(format!("{} storage", area)))
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get(&self, area: StorageArea, key: &str) -> Result<Option<Value>, StorageError> {
        self.check(area)?;
        let records = self.records.read().await;
        Ok(records.get(&area).and_then(|record| record.get(key)).cloned())
    }

    async fn set(&self, area: StorageArea, key: &str, value: Value) -> Result<(), StorageError> {
        self.check(area)?;
        let mut records = self.records.write().await;
        records.entry(area).or_default().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, area: StorageArea, key: &str) -> Result<(), StorageError> {
        self.check(area)?;
        let mut records = self.records.write().await;
        if let Some(record) = records.get_mut(&area) {
            record.remove(key);
        }
        Ok(())
    }
}

/// File system storage: one flat JSON object per tier.
///
/// ```text
/// {storage_dir}/
/// ├── session.json
/// └── global.json
/// ```
pub struct FileStorage {
    storage_dir: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Create a file store rooted at `storage_dir`, creating the directory.
    pub async fn new(storage_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let storage_dir = storage_dir.into();
        fs::create_dir_all(&storage_dir).await?;

        debug!("FileStorage initialized at {:?}", storage_dir);

        Ok(Self {
            storage_dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    fn record_path(&self, area: StorageArea) -> PathBuf {
        self.storage_dir.join(format!("{}.json", area))
    }

    async fn read_record(&self, area: StorageArea) -> Result<Map<String, Value>, StorageError> {
        let path = self.record_path(area);
        if !path.exists() {
            return Ok(Map::new());
        }

        let content = fs::read_to_string(&path).await?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(record)) => Ok(record),
            Ok(_) => Err(StorageError::Corrupt(format!("{:?} is not a JSON object", path))),
            Err(e) => Err(StorageError::Corrupt(format!("{:?}: {}", path, e))),
        }
    }

    async fn write_record(
        &self,
        area: StorageArea,
        record: &Map<String, Value>,
    ) -> Result<(), StorageError> {
        let path = self.record_path(area);
        let tmp_path = path.with_extension("json.tmp");

        let content = serde_json::to_string_pretty(record)
            .map_err(|e| StorageError::Serialization(format!("Failed to serialize record: {}", e)))?;

        fs::write(&tmp_path, content).await?;
        fs::rename(&tmp_path, &path).await?;
        Ok(())
    }

    /// Read the current record for a rewrite; a corrupt record is replaced.
    async fn record_for_update(&self, area: StorageArea) -> Result<Map<String, Value>, StorageError> {
        match self.read_record(area).await {
            Ok(record) => Ok(record),
            Err(StorageError::Corrupt(reason)) => {
                warn!("Replacing corrupt {} record: {}", area, reason);
                Ok(Map::new())
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get(&self, area: StorageArea, key: &str) -> Result<Option<Value>, StorageError> {
        let record = self.read_record(area).await?;
        Ok(record.get(key).cloned())
    }

    async fn set(&self, area: StorageArea, key: &str, value: Value) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut record = self.record_for_update(area).await?;
        record.insert(key.to_string(), value);
        self.write_record(area, &record).await?;

        debug!("Stored '{}' in {} record", key, area);
        Ok(())
    }

    async fn remove(&self, area: StorageArea, key: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut record = self.record_for_update(area).await?;
        if record.remove(key).is_some() {
            self.write_record(area, &record).await?;
            debug!("Removed '{}' from {} record", key, area);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "storage_tests.rs"]
mod tests;
