//! Startup provisioning of the log store.
//!
//! Ensures the lifecycle policy, the index template, and the initial
//! write-alias/index exist before the service accepts traffic. Each step is
//! individually idempotent, so [`ensure_provisioned`] is safe to call
//! repeatedly across restarts and across concurrent process instances:
//! losing a creation race (HTTP 409 or a `resource_already_exists_exception`
//! body) is treated as success, not failure.
//!
//! One degraded mode exists: a physical index that carries the exact alias
//! name (left over from a pre-alias deployment) is kept as the de-facto
//! write target with a warning, since an alias with the same name cannot
//! be created over it.
//!
//! Any other backend failure here is fatal; the process must not serve
//! traffic against a half-provisioned store. Transient connectivity errors
//! are the startup supervisor's problem, not swallowed here.

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::elastic::ElasticStore;

/// Provision the store: lifecycle policy, then template, then write alias.
pub async fn ensure_provisioned(store: &ElasticStore) -> Result<()> {
    ensure_policy(store).await?;
    ensure_template(store).await?;
    ensure_write_alias(store).await?;
    Ok(())
}

/// True when a create call failed only because the resource already exists.
///
/// Concurrent instances may race through these steps; the loser of any
/// creation race must treat this outcome as success.
fn already_exists(status: u16, body: &str) -> bool {
    status == 409 || body.contains("resource_already_exists_exception")
}

/// Physical index created when the alias does not exist yet. Rollover
/// continues the `-NNNNNN` sequence from here.
fn bootstrap_index_name(alias: &str) -> String {
    format!("{alias}-000001")
}

fn policy_body(config: &StoreConfig) -> Value {
    json!({
        "policy": {
            "phases": {
                "hot": {
                    "actions": {
                        "rollover": {
                            "max_age": config.rollover_max_age,
                            "max_size": config.rollover_max_size,
                        }
                    }
                },
                "delete": {
                    "min_age": config.retention,
                    "actions": { "delete": {} }
                }
            }
        }
    })
}

fn template_body(config: &StoreConfig) -> Value {
    json!({
        "index_patterns": [config.index_pattern()],
        "template": {
            "settings": {
                "index.lifecycle.name": config.policy_name(),
                "index.lifecycle.rollover_alias": config.alias,
                "index.number_of_shards": config.shards,
                "index.number_of_replicas": config.replicas,
            },
            "mappings": {
                "properties": {
                    "id": { "type": "keyword" },
                    "timestamp": { "type": "date" },
                    "serviceName": { "type": "keyword" },
                    "level": { "type": "keyword" },
                    "message": { "type": "text" },
                    "requestId": { "type": "keyword" },
                    "context": { "type": "object", "enabled": true },
                }
            }
        },
        "priority": 200,
    })
}

fn bootstrap_index_body(alias: &str) -> Value {
    let mut aliases = serde_json::Map::new();
    aliases.insert(alias.to_string(), json!({ "is_write_index": true }));
    json!({ "aliases": aliases })
}

/// Step 1: the lifecycle policy, by name. An existing policy is left
/// untouched; drifted settings are not reconciled.
async fn ensure_policy(store: &ElasticStore) -> Result<()> {
    let name = store.config().policy_name();
    let url = store.url(&format!("_ilm/policy/{name}"));

    let resp = store
        .client()
        .get(&url)
        .send()
        .await
        .with_context(|| format!("Failed to check lifecycle policy '{name}'"))?;
    let status = resp.status();

    if status.is_success() {
        debug!("lifecycle policy '{name}' already exists");
        return Ok(());
    }
    if status.as_u16() != 404 {
        let body = resp.text().await.unwrap_or_default();
        bail!("checking lifecycle policy '{name}' failed (HTTP {status}): {body}");
    }

    let resp = store
        .client()
        .put(&url)
        .json(&policy_body(store.config()))
        .send()
        .await
        .with_context(|| format!("Failed to create lifecycle policy '{name}'"))?;
    let status = resp.status();
    if status.is_success() {
        info!("created lifecycle policy '{name}'");
        return Ok(());
    }

    let body = resp.text().await.unwrap_or_default();
    if already_exists(status.as_u16(), &body) {
        debug!("lost creation race for lifecycle policy '{name}'");
        return Ok(());
    }
    bail!("creating lifecycle policy '{name}' failed (HTTP {status}): {body}");
}

/// Step 2: the index template binding new physical indices to the policy
/// and the field mapping.
async fn ensure_template(store: &ElasticStore) -> Result<()> {
    let name = store.config().template_name();
    let url = store.url(&format!("_index_template/{name}"));

    let resp = store
        .client()
        .head(&url)
        .send()
        .await
        .with_context(|| format!("Failed to check index template '{name}'"))?;
    let status = resp.status();

    if status.is_success() {
        debug!("index template '{name}' already exists");
        return Ok(());
    }
    if status.as_u16() != 404 {
        bail!("checking index template '{name}' failed (HTTP {status})");
    }

    let resp = store
        .client()
        .put(&url)
        .json(&template_body(store.config()))
        .send()
        .await
        .with_context(|| format!("Failed to create index template '{name}'"))?;
    let status = resp.status();
    if status.is_success() {
        info!("created index template '{name}'");
        return Ok(());
    }

    let body = resp.text().await.unwrap_or_default();
    if already_exists(status.as_u16(), &body) {
        debug!("lost creation race for index template '{name}'");
        return Ok(());
    }
    bail!("creating index template '{name}' failed (HTTP {status}): {body}");
}

/// Step 3: the alias itself, backed by at least one write index.
async fn ensure_write_alias(store: &ElasticStore) -> Result<()> {
    let alias = store.alias();

    let resp = store
        .client()
        .head(&store.url(&format!("_alias/{alias}")))
        .send()
        .await
        .with_context(|| format!("Failed to check alias '{alias}'"))?;
    let status = resp.status();
    if status.is_success() {
        debug!("alias '{alias}' already exists");
        return Ok(());
    }
    if status.as_u16() != 404 {
        bail!("checking alias '{alias}' failed (HTTP {status})");
    }

    // Name collision from a pre-alias deployment: a plain index with the
    // alias's exact name. Keep it as the write target rather than racking
    // an alias on top of it.
    let resp = store
        .client()
        .head(&store.url(alias))
        .send()
        .await
        .with_context(|| format!("Failed to check index '{alias}'"))?;
    let status = resp.status();
    if status.is_success() {
        warn!(
            "a plain index named '{alias}' already exists; using it as the \
             write target without an alias (degraded mode)"
        );
        return Ok(());
    }
    if status.as_u16() != 404 {
        bail!("checking index '{alias}' failed (HTTP {status})");
    }

    let index = bootstrap_index_name(alias);
    let resp = store
        .client()
        .put(&store.url(&index))
        .json(&bootstrap_index_body(alias))
        .send()
        .await
        .with_context(|| format!("Failed to create index '{index}'"))?;
    let status = resp.status();
    if status.is_success() {
        info!("created index '{index}' with write alias '{alias}'");
        return Ok(());
    }

    let body = resp.text().await.unwrap_or_default();
    if already_exists(status.as_u16(), &body) {
        debug!("lost creation race for index '{index}'");
        return Ok(());
    }
    bail!("creating index '{index}' failed (HTTP {status}): {body}");
}
