//! Core data models for the log store.
//!
//! These types represent the log records, filter/pagination requests, and
//! result pages that flow through the ingestion and query pipeline. Wire
//! field names are camelCase to match the documents persisted in the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default number of records per result page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Upper bound on the number of records per result page.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A stored log record.
///
/// `id` and `timestamp` are always present on a record returned by the
/// store, even when they were absent on input. `context` is an opaque,
/// order-preserving JSON value persisted and returned verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub service_name: String,
    pub level: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

/// Input payload for creating a log record.
///
/// `id` and `timestamp` may be supplied by the caller (reusing an `id`
/// makes re-indexing idempotent); when absent the writer assigns them.
/// `level` is free text; the recommended set is INFO, WARN, ERROR, DEBUG,
/// but membership is not enforced here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    pub service_name: String,
    pub level: String,
    pub message: String,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub context: Option<serde_json::Value>,
}

impl LogInput {
    /// Materialize the record to persist, assigning `id` and `timestamp`
    /// when the caller did not provide them.
    pub fn into_record(self) -> LogRecord {
        LogRecord {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            service_name: self.service_name,
            level: self.level,
            message: self.message,
            request_id: self.request_id,
            context: self.context,
        }
    }
}

/// A filter + pagination request against the store.
///
/// Absent filters impose no constraint; present filters combine with
/// logical AND. `page` is 1-based. Callers are expected to supply
/// validated values (`page >= 1`, `1 <= page_size <= MAX_PAGE_SIZE`).
#[derive(Debug, Clone)]
pub struct LogQuery {
    pub service_name: Option<String>,
    pub level: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            service_name: None,
            level: None,
            start_date: None,
            end_date: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of query results, newest first.
///
/// `total` counts all matching records store-wide, not just this page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPage {
    pub data: Vec<LogRecord>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}
