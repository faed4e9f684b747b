//! Ticket Desk
//!
//! Ticket tracking backed by a Neo4j graph:
//! - Neo4j connection management and ticket node mapping
//! - Repository with typed create/update/delete/find-all
//! - In-memory view list kept in step with confirmed store writes
//! - Dashboard statistics recomputed from the view list

pub mod dashboard;
pub mod error;
pub mod events;
pub mod neo4j;
pub mod presentation;
pub mod tickets;
pub mod users;

pub use error::TicketError;

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub neo4j: Neo4jYamlConfig,
    pub store: StoreYamlConfig,
}

/// Neo4j configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Neo4jYamlConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl Default for Neo4jYamlConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://127.0.0.1:7687".into(),
            user: "neo4j".into(),
            password: "00000000".into(),
        }
    }
}

/// Store round-trip settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreYamlConfig {
    pub query_timeout_secs: u64,
}

impl Default for StoreYamlConfig {
    fn default() -> Self {
        Self {
            query_timeout_secs: 10,
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub neo4j: Neo4jYamlConfig,
    pub query_timeout: Duration,
}

impl Config {
    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. If the file doesn't
    /// exist, falls back to pure env var / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        let timeout_secs = match std::env::var("TICKET_QUERY_TIMEOUT_SECS") {
            Ok(s) => s
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid TICKET_QUERY_TIMEOUT_SECS '{}': {}", s, e))?,
            Err(_) => yaml.store.query_timeout_secs,
        };
        if timeout_secs == 0 {
            anyhow::bail!("Query timeout must be at least one second");
        }

        Ok(Self {
            neo4j: Neo4jYamlConfig {
                uri: std::env::var("NEO4J_URI").unwrap_or(yaml.neo4j.uri),
                user: std::env::var("NEO4J_USER").unwrap_or(yaml.neo4j.user),
                password: std::env::var("NEO4J_PASSWORD").unwrap_or(yaml.neo4j.password),
            },
            query_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }

    /// Settings for the process-wide connection manager
    pub fn connection_settings(&self) -> neo4j::ConnectionSettings {
        neo4j::ConnectionSettings::from_config(&self.neo4j, self.query_timeout)
    }
}

// ============================================================================
// Tests
// ============================================================================
