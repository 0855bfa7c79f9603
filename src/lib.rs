//! # logwell
//!
//! A centralized log ingestion and query service backed by a
//! document-search engine (any Elasticsearch-compatible HTTP API).
//!
//! Client services POST structured log records; logwell stores them in
//! time-partitioned indices behind one stable alias (rolled over and
//! expired by a lifecycle policy) and serves filtered, paginated queries
//! over the data.
//!
//! ```text
//! ┌──────────┐   ┌─────────────┐   ┌───────────────────┐
//! │ Clients  │──▶│  HTTP API    │──▶│  Search engine     │
//! │ (POST/   │   │ (axum)      │   │  alias ▸ logs-0001 │
//! │  GET)    │   │             │   │        ▸ logs-0002 │
//! └──────────┘   └─────────────┘   └───────────────────┘
//! ```
//!
//! On startup the provisioner idempotently creates the lifecycle policy,
//! the index template, and the initial write index, so the rest of the
//! service only ever addresses the logical alias.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`error`] | Store-level error type |
//! | [`store`] | Storage trait + in-memory implementation |
//! | [`elastic`] | Elasticsearch-backed store |
//! | [`provision`] | Startup provisioning (policy, template, alias) |
//! | [`query`] | Filter/pagination → search-body translation |
//! | [`server`] | HTTP API |

pub mod config;
pub mod elastic;
pub mod error;
pub mod models;
pub mod provision;
pub mod query;
pub mod server;
pub mod store;
