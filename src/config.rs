//! Routing-scope configuration.
//!
//! A scope binds a path prefix to one immutable [`GatewayConfig`]. Scopes
//! come from a YAML file (or from CLI flags in the binary) and are resolved
//! once at startup; requests only ever read them.
//!
//! ```yaml
//! listen: 0.0.0.0:8080
//! scopes:
//!   - prefix: /sqlite
//!     base_dir: /var/lib/sqlgate
//!   - prefix: /report
//!     db_file: stats.db
//!     query: SELECT * FROM daily
//! ```

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Per-scope gateway settings, read-only for the lifetime of every request
/// handled under the scope.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct GatewayConfig {
    /// Whether this scope answers requests at all. A default config is
    /// disabled; the handler declines everything under a disabled scope.
    #[serde(default)]
    pub enabled: bool,
    /// Directory prepended to every database name.
    #[serde(default)]
    pub base_dir: Option<String>,
    /// Fixed database file; overrides the request's `db` parameter.
    #[serde(default)]
    pub db_file: Option<String>,
    /// Fixed query text; overrides the request's `q` parameter.
    #[serde(default)]
    pub query: Option<String>,
}

/// One routing scope: a path prefix plus its gateway settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScopeConfig {
    /// Path prefix this scope claims, e.g. `/sqlite`.
    pub prefix: String,
    /// A scope someone bothered to list is on unless it says otherwise.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub base_dir: Option<String>,
    #[serde(default)]
    pub db_file: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
}

impl ScopeConfig {
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            enabled: self.enabled,
            base_dir: self.base_dir.clone(),
            db_file: self.db_file.clone(),
            query: self.query.clone(),
        }
    }
}

fn enabled_by_default() -> bool {
    true
}

/// Top-level server configuration file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Listen address, e.g. `0.0.0.0:8080`. The CLI flag wins when both
    /// are given.
    #[serde(default)]
    pub listen: Option<String>,
    #[serde(default)]
    pub scopes: Vec<ScopeConfig>,
}

/// Load a [`ServerConfig`] from a YAML file.
pub fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: ServerConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(config)
}
