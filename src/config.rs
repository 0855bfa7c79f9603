use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Connection and lifecycle settings for the backing search engine.
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Base URL of the search engine (e.g. `http://localhost:9200`).
    pub url: String,
    /// Logical alias that fronts the physical indices.
    #[serde(default = "default_alias")]
    pub alias: String,
    /// Age ceiling after which the write index rolls over (e.g. `7d`).
    #[serde(default = "default_rollover_max_age")]
    pub rollover_max_age: String,
    /// Size ceiling after which the write index rolls over (e.g. `5gb`).
    #[serde(default = "default_rollover_max_size")]
    pub rollover_max_size: String,
    /// Age after which a rolled-over index is deleted (e.g. `30d`).
    #[serde(default = "default_retention")]
    pub retention: String,
    #[serde(default = "default_shards")]
    pub shards: u32,
    #[serde(default = "default_replicas")]
    pub replicas: u32,
    /// Per-request timeout applied to every backend call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_alias() -> String {
    "logs".to_string()
}
fn default_rollover_max_age() -> String {
    "7d".to_string()
}
fn default_rollover_max_size() -> String {
    "5gb".to_string()
}
fn default_retention() -> String {
    "30d".to_string()
}
fn default_shards() -> u32 {
    1
}
fn default_replicas() -> u32 {
    1
}
fn default_timeout_secs() -> u64 {
    30
}

impl StoreConfig {
    /// Name of the lifecycle policy governing rollover and retention.
    pub fn policy_name(&self) -> String {
        format!("{}-ilm-policy", self.alias)
    }

    /// Name of the index template applied to new physical indices.
    pub fn template_name(&self) -> String {
        format!("{}-template", self.alias)
    }

    /// Naming pattern matching every physical index behind the alias.
    pub fn index_pattern(&self) -> String {
        format!("{}-*", self.alias)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

/// API key expected in the `x-api-key` header of write/query requests.
///
/// Read from the environment rather than the config file so the secret
/// stays out of checked-in configuration.
pub fn api_key_from_env() -> Option<String> {
    std::env::var("LOGWELL_API_KEY")
        .ok()
        .filter(|key| !key.is_empty())
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate store connection
    if config.store.url.trim().is_empty() {
        anyhow::bail!("store.url must not be empty");
    }

    if config.store.alias.is_empty() {
        anyhow::bail!("store.alias must not be empty");
    }

    // Index names must be lowercase and free of path/space characters
    if !config
        .store
        .alias
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        anyhow::bail!(
            "store.alias '{}' must contain only lowercase letters, digits, '-' or '_'",
            config.store.alias
        );
    }

    if config.store.shards == 0 {
        anyhow::bail!("store.shards must be >= 1");
    }

    if config.store.timeout_secs == 0 {
        anyhow::bail!("store.timeout_secs must be >= 1");
    }

    Ok(config)
}
