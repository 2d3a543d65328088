//! Server configuration
//!
//! Loaded from a TOML file; every field has a default so an empty file (or
//! no file at all) yields a runnable localhost configuration. CLI flags and
//! environment variables override individual fields at startup.

use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the REST listener binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Path of the SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Allow cross-origin requests (browser peers need this)
    #[serde(default = "default_true")]
    pub permissive_cors: bool,

    /// Session retention policy
    #[serde(default)]
    pub retention: RetentionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    /// Sessions older than this many seconds are swept; 0 disables sweeping
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: u64,

    /// How often the sweeper runs
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_database_path() -> PathBuf {
    PathBuf::from("sigrelay.db")
}

fn default_true() -> bool {
    true
}

fn default_session_ttl() -> u64 {
    3600
}

fn default_sweep_interval() -> u64 {
    60
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            database_path: default_database_path(),
            permissive_cors: true,
            retention: RetentionConfig::default(),
        }
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: default_session_ttl(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .map_err(|e| anyhow::anyhow!("failed to parse config file {}: {e}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_yields_defaults() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.database_path, PathBuf::from("sigrelay.db"));
        assert!(config.permissive_cors);
        assert_eq!(config.retention.session_ttl_seconds, 3600);
        assert_eq!(config.retention.sweep_interval_seconds, 60);
    }

    #[test]
    fn partial_config_overrides_selectively() {
        let config: ServerConfig = toml::from_str(
            r#"
            bind_address = "0.0.0.0:9090"

            [retention]
            session_ttl_seconds = 120
            "#,
        )
        .unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:9090");
        assert_eq!(config.retention.session_ttl_seconds, 120);
        // Untouched fields keep their defaults
        assert_eq!(config.retention.sweep_interval_seconds, 60);
        assert_eq!(config.database_path, PathBuf::from("sigrelay.db"));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ServerConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("not/here.toml"));
    }
}
