use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use urlcutter_core::error::{Result, StorageError};
use urlcutter_core::repository::{ReadRepository, Repository, UrlRecord};
use urlcutter_core::shortcode::ShortCode;

/// Collection name reported by [`InMemoryRepository`] lookups before any insert.
const COLLECTION: &str = "memory";

/// In-memory implementation of the Repository trait using DashMap.
///
/// Inserts hold the sequence lock while writing the record, so codes are
/// issued in the same strict order as [`RedbRepository`](crate::RedbRepository)
/// issues them. Reads never take the sequence lock; they only touch the map
/// shard holding the code and a flag set by the first insert.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    storage: DashMap<String, UrlRecord>,
    sequence: Mutex<u64>,
    created: AtomicBool,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last issued counter value, `0` if nothing was inserted.
    pub fn current_sequence(&self) -> u64 {
        *self.sequence.lock()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn get(&self, code: &ShortCode) -> Result<UrlRecord> {
        if let Some(record) = self.storage.get(code.as_str()) {
            return Ok(record.clone());
        }

        if !self.created.load(Ordering::Acquire) {
            Err(StorageError::CollectionMissing(COLLECTION.to_string()))
        } else {
            Err(StorageError::NotFound(code.to_string()))
        }
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert(&self, target_url: &str) -> Result<ShortCode> {
        let mut sequence = self.sequence.lock();
        let next = sequence
            .checked_add(1)
            .ok_or_else(|| StorageError::Transaction("sequence exhausted".to_string()))?;

        let key = ShortCode::generated(next);
        self.storage.insert(
            key.as_str().to_owned(),
            UrlRecord {
                key: key.clone(),
                target_url: target_url.to_owned(),
            },
        );
        *sequence = next;
        self.created.store(true, Ordering::Release);

        Ok(key)
    }
}
