//! Elasticsearch-backed [`LogStore`] implementation.
//!
//! Talks to the search engine's HTTP document API with a pooled
//! [`reqwest::Client`]. Every call goes through the logical alias, never a
//! physical index name, so rollover can retire write indices underneath
//! without callers noticing.
//!
//! # Consistency
//!
//! Every write is followed by an explicit refresh on the alias, so a record
//! is visible to a search issued immediately after `index_log` returns.
//! This trades write throughput for read-after-write consistency and bounds
//! the service to low/medium ingestion rates.
//!
//! # Error handling
//!
//! Transport failures and error statuses surface as [`StoreError`]; this
//! layer performs no retries. Liveness probes are the one exception: they
//! log the failure and report `false` instead of raising.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::models::{LogInput, LogPage, LogQuery, LogRecord};
use crate::query;
use crate::store::LogStore;

/// Connector to an Elasticsearch-compatible search engine.
pub struct ElasticStore {
    client: reqwest::Client,
    base_url: String,
    config: StoreConfig,
}

impl ElasticStore {
    /// Create a connector from configuration.
    ///
    /// Builds the underlying HTTP client with the configured per-request
    /// timeout. Connection pooling lives inside the client; the store
    /// itself holds no locks and supports many concurrent in-flight
    /// requests.
    pub fn new(config: &StoreConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            config: config.clone(),
        })
    }

    /// The logical alias all reads and writes go through.
    pub fn alias(&self) -> &str {
        &self.config.alias
    }

    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub(crate) fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

/// Trim a backend error body for inclusion in an error message.
fn excerpt(body: String) -> String {
    body.chars().take(500).collect()
}

#[async_trait]
impl LogStore for ElasticStore {
    async fn index_log(&self, input: LogInput) -> StoreResult<LogRecord> {
        let record = input.into_record();

        // Index by id under the alias; the same id overwrites in place.
        let url = self.url(&format!("{}/_doc/{}", self.alias(), record.id));
        let resp = self.client.put(&url).json(&record).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                body: excerpt(body),
            });
        }

        // Explicit refresh so the record is immediately searchable.
        let url = self.url(&format!("{}/_refresh", self.alias()));
        let resp = self.client.post(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                body: excerpt(body),
            });
        }

        Ok(record)
    }

    async fn search(&self, query: &LogQuery) -> StoreResult<LogPage> {
        let body = query::build_search_body(query);

        let url = self.url(&format!("{}/_search", self.alias()));
        let resp = self.client.post(&url).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                body: excerpt(body),
            });
        }

        let json: Value = resp.json().await?;
        let hits = json
            .get("hits")
            .ok_or_else(|| StoreError::InvalidResponse("response is missing hits".to_string()))?;

        let total = query::normalize_total(hits)?;

        let raw_hits = hits
            .get("hits")
            .and_then(Value::as_array)
            .ok_or_else(|| StoreError::InvalidResponse("hits.hits is not an array".to_string()))?;

        let mut data = Vec::with_capacity(raw_hits.len());
        for hit in raw_hits {
            let source = hit.get("_source").cloned().ok_or_else(|| {
                StoreError::InvalidResponse("hit is missing _source".to_string())
            })?;
            let record: LogRecord = serde_json::from_value(source)
                .map_err(|e| StoreError::InvalidResponse(format!("bad _source: {e}")))?;
            data.push(record);
        }

        Ok(LogPage {
            data,
            total,
            page: query.page,
            page_size: query.page_size,
        })
    }

    async fn ping(&self) -> bool {
        match self.client.get(&self.base_url).send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                warn!("search backend ping returned HTTP {}", resp.status());
                false
            }
            Err(e) => {
                warn!("search backend unreachable: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;

    fn test_config() -> StoreConfig {
        StoreConfig {
            url: "http://localhost:9200/".to_string(),
            alias: "logs".to_string(),
            rollover_max_age: "7d".to_string(),
            rollover_max_size: "5gb".to_string(),
            retention: "30d".to_string(),
            shards: 1,
            replicas: 1,
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let store = ElasticStore::new(&test_config()).unwrap();
        assert_eq!(
            store.url("logs/_search"),
            "http://localhost:9200/logs/_search"
        );
    }

    #[test]
    fn test_document_urls_use_the_alias() {
        let store = ElasticStore::new(&test_config()).unwrap();
        assert_eq!(store.alias(), "logs");
        assert_eq!(
            store.url(&format!("{}/_doc/abc", store.alias())),
            "http://localhost:9200/logs/_doc/abc"
        );
    }
}
