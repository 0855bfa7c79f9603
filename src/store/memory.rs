//! In-memory [`LogStore`] implementation for tests.
//!
//! Keeps records in a `Vec` behind `std::sync::RwLock` and mirrors the
//! backend contract: AND-combined exact-match filters, inclusive timestamp
//! range, timestamp-descending order with id as tiebreaker, offset/size
//! pagination, and a store-wide total.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{LogInput, LogPage, LogQuery, LogRecord};
use crate::query;

use super::LogStore;

/// In-memory store for tests and local development.
pub struct InMemoryStore {
    records: RwLock<Vec<LogRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn matches(record: &LogRecord, query: &LogQuery) -> bool {
    if let Some(ref service) = query.service_name {
        if &record.service_name != service {
            return false;
        }
    }
    if let Some(ref level) = query.level {
        if &record.level != level {
            return false;
        }
    }
    if let Some(start) = query.start_date {
        if record.timestamp < start {
            return false;
        }
    }
    if let Some(end) = query.end_date {
        if record.timestamp > end {
            return false;
        }
    }
    true
}

#[async_trait]
impl LogStore for InMemoryStore {
    async fn index_log(&self, input: LogInput) -> StoreResult<LogRecord> {
        let record = input.into_record();
        let mut records = self.records.write().unwrap();
        // Indexing by id: a record with the same id replaces the old one.
        records.retain(|r| r.id != record.id);
        records.push(record.clone());
        Ok(record)
    }

    async fn search(&self, query: &LogQuery) -> StoreResult<LogPage> {
        let records = self.records.read().unwrap();
        let mut matched: Vec<LogRecord> = records
            .iter()
            .filter(|record| matches(record, query))
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matched.len() as u64;
        let data = matched
            .into_iter()
            .skip(query::offset(query) as usize)
            .take(query.page_size as usize)
            .collect();

        Ok(LogPage {
            data,
            total,
            page: query.page,
            page_size: query.page_size,
        })
    }

    async fn ping(&self) -> bool {
        true
    }
}
