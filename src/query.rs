//! Translation of [`LogQuery`] requests into backend search bodies.
//!
//! Query construction rules:
//!
//! - Each present scalar filter (`serviceName`, `level`) becomes an
//!   exact-match `term` clause.
//! - `startDate`/`endDate` become one inclusive `range` clause on
//!   `timestamp` (`gte`/`lte`; either side may be open-ended).
//! - Present clauses combine in a non-scoring `bool.filter`; with no
//!   filters the query is `match_all`.
//! - Sort is fixed: `timestamp` descending, then `id` descending so that
//!   records sharing a timestamp still paginate deterministically.
//! - `from` is the zero-based offset `(page - 1) * page_size`; `page` is
//!   not capped, so a page past the end yields empty hits with the
//!   correct total.
//! - `track_total_hits` is requested so the match count is exact
//!   store-wide rather than a 10k lower bound.

use serde_json::{json, Value};

use crate::error::StoreError;
use crate::models::LogQuery;

/// Zero-based offset of the first record on the requested page.
pub fn offset(query: &LogQuery) -> u64 {
    u64::from(query.page.saturating_sub(1)) * u64::from(query.page_size)
}

/// Build the full `_search` request body for a query.
pub fn build_search_body(query: &LogQuery) -> Value {
    let mut filters: Vec<Value> = Vec::new();

    if let Some(ref service) = query.service_name {
        filters.push(json!({ "term": { "serviceName": service } }));
    }
    if let Some(ref level) = query.level {
        filters.push(json!({ "term": { "level": level } }));
    }
    if query.start_date.is_some() || query.end_date.is_some() {
        let mut bounds = serde_json::Map::new();
        if let Some(start) = query.start_date {
            bounds.insert("gte".to_string(), json!(start));
        }
        if let Some(end) = query.end_date {
            bounds.insert("lte".to_string(), json!(end));
        }
        filters.push(json!({ "range": { "timestamp": Value::Object(bounds) } }));
    }

    let query_clause = if filters.is_empty() {
        json!({ "match_all": {} })
    } else {
        json!({ "bool": { "filter": filters } })
    };

    json!({
        "from": offset(query),
        "size": query.page_size,
        "sort": [
            { "timestamp": { "order": "desc" } },
            { "id": { "order": "desc" } }
        ],
        "track_total_hits": true,
        "query": query_clause,
    })
}

/// Normalize the backend's match count to a plain integer.
///
/// Accepts both the bare-number form and the `{value, relation}` object
/// newer backends return.
pub fn normalize_total(hits: &Value) -> Result<u64, StoreError> {
    match hits.get("total") {
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| StoreError::InvalidResponse("hits.total is not an integer".to_string())),
        Some(Value::Object(obj)) => obj
            .get("value")
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                StoreError::InvalidResponse("hits.total.value is not an integer".to_string())
            }),
        _ => Err(StoreError::InvalidResponse(
            "response is missing hits.total".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LogQuery;
    use chrono::{DateTime, Utc};

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let body = build_search_body(&LogQuery::default());

        assert_eq!(body["query"], json!({ "match_all": {} }));
        assert_eq!(body["from"], json!(0));
        assert_eq!(body["size"], json!(20));
        assert_eq!(body["track_total_hits"], json!(true));
    }

    #[test]
    fn test_sort_is_timestamp_then_id_descending() {
        let body = build_search_body(&LogQuery::default());
        assert_eq!(
            body["sort"],
            json!([
                { "timestamp": { "order": "desc" } },
                { "id": { "order": "desc" } }
            ])
        );
    }

    #[test]
    fn test_scalar_filters_become_term_clauses() {
        let query = LogQuery {
            service_name: Some("auth-service".to_string()),
            level: Some("ERROR".to_string()),
            ..LogQuery::default()
        };
        let body = build_search_body(&query);

        let filters = body["query"]["bool"]["filter"].as_array().unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0], json!({ "term": { "serviceName": "auth-service" } }));
        assert_eq!(filters[1], json!({ "term": { "level": "ERROR" } }));
    }

    #[test]
    fn test_both_dates_make_one_inclusive_range() {
        let query = LogQuery {
            start_date: Some(ts("2025-01-01T00:00:00Z")),
            end_date: Some(ts("2025-01-31T23:59:59Z")),
            ..LogQuery::default()
        };
        let body = build_search_body(&query);

        let filters = body["query"]["bool"]["filter"].as_array().unwrap();
        assert_eq!(filters.len(), 1);
        let range = &filters[0]["range"]["timestamp"];
        assert!(range.get("gte").is_some());
        assert!(range.get("lte").is_some());
    }

    #[test]
    fn test_start_date_alone_is_open_ended() {
        let query = LogQuery {
            start_date: Some(ts("2025-01-01T00:00:00Z")),
            ..LogQuery::default()
        };
        let body = build_search_body(&query);

        let range = &body["query"]["bool"]["filter"][0]["range"]["timestamp"];
        assert!(range.get("gte").is_some());
        assert!(range.get("lte").is_none());
    }

    #[test]
    fn test_offset_arithmetic() {
        let query = LogQuery {
            page: 3,
            page_size: 20,
            ..LogQuery::default()
        };
        assert_eq!(offset(&query), 40);

        let body = build_search_body(&query);
        assert_eq!(body["from"], json!(40));
        assert_eq!(body["size"], json!(20));
    }

    #[test]
    fn test_normalize_total_plain_number() {
        let hits = json!({ "total": 17 });
        assert_eq!(normalize_total(&hits).unwrap(), 17);
    }

    #[test]
    fn test_normalize_total_object_form() {
        let hits = json!({ "total": { "value": 10000, "relation": "eq" } });
        assert_eq!(normalize_total(&hits).unwrap(), 10000);
    }

    #[test]
    fn test_normalize_total_missing_is_error() {
        let hits = json!({ "hits": [] });
        assert!(normalize_total(&hits).is_err());
    }
}
