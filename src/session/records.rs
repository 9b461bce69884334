//! Published record cache

use crate::types::PublishedRecord;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Process-wide map from record number to its last known summary
///
/// Unbounded unless a capacity is given; when full, the entry with the oldest
/// `updated_at` is evicted to make room.
#[derive(Debug, Default)]
pub struct RecordCache {
    records: RwLock<HashMap<u64, PublishedRecord>>,
    capacity: Option<usize>,
}

impl RecordCache {
    /// Create a cache; `None` means no limit
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Configured capacity
    pub const fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Cached summary for a record
    pub fn get(&self, number: u64) -> Option<PublishedRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&number)
            .cloned()
    }

    /// Insert or replace a summary
    pub fn insert(&self, record: PublishedRecord) {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(capacity) = self.capacity {
            if !records.contains_key(&record.number) && records.len() >= capacity {
                let oldest = records
                    .values()
                    .min_by_key(|r| (r.updated_at, r.number))
                    .map(|r| r.number);
                if let Some(number) = oldest {
                    records.remove(&number);
                }
            }
            if capacity == 0 {
                return;
            }
        }

        records.insert(record.number, record);
    }

    /// Drop a summary; returns whether one was cached
    pub fn remove(&self, number: u64) -> bool {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&number)
            .is_some()
    }

    /// Number of cached records
    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
