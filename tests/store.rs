//! Store contract tests, run against the in-memory implementation.
//!
//! These exercise the behavior both backends promise: write-then-read
//! visibility, AND-combined filters, inclusive ranges, fixed descending
//! sort, and offset pagination with a store-wide total.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use logwell::models::{LogInput, LogQuery};
use logwell::store::memory::InMemoryStore;
use logwell::store::LogStore;

fn input(service: &str, level: &str, message: &str) -> LogInput {
    LogInput {
        id: None,
        timestamp: None,
        service_name: service.to_string(),
        level: level.to_string(),
        message: message.to_string(),
        request_id: None,
        context: None,
    }
}

fn input_at(service: &str, level: &str, timestamp: &str) -> LogInput {
    LogInput {
        timestamp: Some(timestamp.parse::<DateTime<Utc>>().unwrap()),
        ..input(service, level, "msg")
    }
}

#[tokio::test]
async fn test_write_then_read_visibility() {
    let store = InMemoryStore::new();

    let record = store
        .index_log(input("auth-service", "ERROR", "login failed"))
        .await
        .unwrap();

    let page = store.search(&LogQuery::default()).await.unwrap();
    assert!(page.data.iter().any(|r| r.id == record.id));
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn test_filter_correctness() {
    let store = InMemoryStore::new();
    for (service, level) in [("a", "ERROR"), ("a", "INFO"), ("b", "ERROR"), ("b", "INFO")] {
        store.index_log(input(service, level, "msg")).await.unwrap();
    }

    let query = LogQuery {
        service_name: Some("a".to_string()),
        level: Some("ERROR".to_string()),
        ..LogQuery::default()
    };
    let page = store.search(&query).await.unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].service_name, "a");
    assert_eq!(page.data[0].level, "ERROR");
}

#[tokio::test]
async fn test_single_filter_does_not_constrain_the_rest() {
    let store = InMemoryStore::new();
    for (service, level) in [("a", "ERROR"), ("a", "INFO"), ("b", "ERROR")] {
        store.index_log(input(service, level, "msg")).await.unwrap();
    }

    let query = LogQuery {
        level: Some("ERROR".to_string()),
        ..LogQuery::default()
    };
    let page = store.search(&query).await.unwrap();

    assert_eq!(page.total, 2);
    assert!(page.data.iter().all(|r| r.level == "ERROR"));
}

#[tokio::test]
async fn test_range_inclusivity() {
    let store = InMemoryStore::new();
    store
        .index_log(input_at("svc", "INFO", "2025-01-01T00:00:00Z"))
        .await
        .unwrap();
    store
        .index_log(input_at("svc", "INFO", "2025-01-15T12:00:00Z"))
        .await
        .unwrap();
    store
        .index_log(input_at("svc", "INFO", "2025-01-31T23:59:59Z"))
        .await
        .unwrap();

    // Both bounds sit exactly on record timestamps: inclusive on each side.
    let query = LogQuery {
        start_date: Some("2025-01-01T00:00:00Z".parse().unwrap()),
        end_date: Some("2025-01-31T23:59:59Z".parse().unwrap()),
        ..LogQuery::default()
    };
    assert_eq!(store.search(&query).await.unwrap().total, 3);

    // Tighten the start past the first record.
    let query = LogQuery {
        start_date: Some("2025-01-01T00:00:01Z".parse().unwrap()),
        ..LogQuery::default()
    };
    assert_eq!(store.search(&query).await.unwrap().total, 2);

    // A start-only filter excludes nothing on the end side.
    let query = LogQuery {
        start_date: Some("2025-01-15T12:00:00Z".parse().unwrap()),
        ..LogQuery::default()
    };
    assert_eq!(store.search(&query).await.unwrap().total, 2);

    // And vice versa.
    let query = LogQuery {
        end_date: Some("2025-01-15T12:00:00Z".parse().unwrap()),
        ..LogQuery::default()
    };
    assert_eq!(store.search(&query).await.unwrap().total, 2);
}

#[tokio::test]
async fn test_pagination_consistency() {
    let store = InMemoryStore::new();
    for i in 0..25 {
        let ts = format!("2025-03-01T00:00:{i:02}Z");
        store.index_log(input_at("svc", "INFO", &ts)).await.unwrap();
    }

    let mut seen = HashSet::new();
    for page_no in 1..=3 {
        let query = LogQuery {
            page: page_no,
            page_size: 10,
            ..LogQuery::default()
        };
        let page = store.search(&query).await.unwrap();

        assert_eq!(page.total, 25, "total must be store-wide on every page");
        for record in &page.data {
            assert!(seen.insert(record.id.clone()), "duplicate id across pages");
        }
    }
    assert_eq!(seen.len(), 25);

    // Far past the end: empty data, correct total.
    let query = LogQuery {
        page: 100,
        page_size: 10,
        ..LogQuery::default()
    };
    let page = store.search(&query).await.unwrap();
    assert!(page.data.is_empty());
    assert_eq!(page.total, 25);
}

#[tokio::test]
async fn test_empty_filter_sorted_newest_first() {
    let store = InMemoryStore::new();
    for ts in [
        "2025-02-03T00:00:00Z",
        "2025-02-01T00:00:00Z",
        "2025-02-05T00:00:00Z",
        "2025-02-04T00:00:00Z",
    ] {
        store.index_log(input_at("svc", "INFO", ts)).await.unwrap();
    }

    let page = store.search(&LogQuery::default()).await.unwrap();
    let timestamps: Vec<_> = page.data.iter().map(|r| r.timestamp).collect();

    let mut expected = timestamps.clone();
    expected.sort();
    expected.reverse();
    assert_eq!(timestamps, expected);
}

#[tokio::test]
async fn test_timestamp_ties_paginate_deterministically() {
    let store = InMemoryStore::new();
    for _ in 0..4 {
        store
            .index_log(input_at("svc", "INFO", "2025-02-01T00:00:00Z"))
            .await
            .unwrap();
    }

    // With a tied sort key, single-record pages must still cover all four
    // records exactly once; the id tiebreaker keeps the order stable.
    let mut seen = HashSet::new();
    for page_no in 1..=4 {
        let query = LogQuery {
            page: page_no,
            page_size: 1,
            ..LogQuery::default()
        };
        let page = store.search(&query).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert!(seen.insert(page.data[0].id.clone()));
    }
    assert_eq!(seen.len(), 4);
}

#[tokio::test]
async fn test_reindexing_the_same_id_does_not_duplicate() {
    let store = InMemoryStore::new();

    let mut payload = input("svc", "INFO", "first");
    payload.id = Some("fixed-id".to_string());
    store.index_log(payload.clone()).await.unwrap();

    payload.message = "second".to_string();
    store.index_log(payload).await.unwrap();

    let page = store.search(&LogQuery::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].message, "second");
}
