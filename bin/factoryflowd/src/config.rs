//! Server configuration — an immutable struct loaded from TOML at startup.
//!
//! A config name resolves to `/etc/factoryflow/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Complete server configuration. Built once in `main`, then shared read-only.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpConfig,
    pub storage: StorageConfig,
    pub jwt: JwtConfig,
    pub root: RootConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Listen address; `--listen` on the command line overrides it.
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the SQLite database.
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// HS256 signing secret.
    pub secret: String,

    /// Access token lifetime in seconds.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_secs: i64,

    /// Refresh token lifetime in seconds.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_secs: i64,
}

/// Bootstrap account. The config carries a hash, never a password.
#[derive(Debug, Clone, Deserialize)]
pub struct RootConfig {
    #[serde(default = "default_root_username")]
    pub username: String,

    /// Argon2id PHC hash of the root password.
    pub password_hash: String,
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_access_ttl() -> i64 {
    3600
}

fn default_refresh_ttl() -> i64 {
    86400
}

fn default_root_username() -> String {
    "root".to_string()
}

impl ServerConfig {
    /// Resolve a config argument to a file path.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/factoryflow/{name_or_path}.toml"))
        }
    }

    /// Load and parse the config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
        let config: ServerConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("cannot parse {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Path of the SQLite database inside the data directory.
    pub fn sqlite_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir).join("factoryflow.sqlite")
    }
}
