//! Storage abstraction for the log service.
//!
//! The [`LogStore`] trait defines the operations the service layer needs,
//! enabling pluggable backends (Elasticsearch in production, in-memory for
//! tests). Implementations must be `Send + Sync` to be shared across
//! request handlers.

pub mod memory;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{LogInput, LogPage, LogQuery, LogRecord};

/// Abstract log storage backend.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`index_log`](LogStore::index_log) | Persist one record, visible to an immediately following search |
/// | [`search`](LogStore::search) | Filtered, paginated query, newest first |
/// | [`ping`](LogStore::ping) | Liveness check; never fails |
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Persist a single log record.
    ///
    /// Assigns `id` and `timestamp` when absent and returns the stored
    /// record. The write must be visible to a `search` issued immediately
    /// after this call returns.
    async fn index_log(&self, input: LogInput) -> StoreResult<LogRecord>;

    /// Run a filtered, paginated query.
    ///
    /// Present filters combine with logical AND; results are ordered by
    /// timestamp descending (id descending on ties). A page past the end
    /// of the result set yields empty `data` with the correct `total`.
    async fn search(&self, query: &LogQuery) -> StoreResult<LogPage>;

    /// Check whether the backend is reachable.
    ///
    /// Never returns an error: unreachability is logged and reported as
    /// `false` so health checks can degrade instead of crash.
    async fn ping(&self) -> bool;
}
