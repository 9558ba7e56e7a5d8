//! File-then-environment configuration.
//!
//! A TOML file (default `partreg.toml`, overridable via `PARTREG_CONFIG`)
//! provides the base; `PARTREG_*` environment variables override individual
//! fields. Everything has a default except the database URL.

use std::env;
use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub readiness: ReadinessConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Which coverage model answers readiness queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessStrategyKind {
    /// Sweep sorted partition windows and report the first uncovered gap.
    #[default]
    GapScan,
    /// Cut the window into elementary segments and take the latest report
    /// per segment.
    IntervalCut,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReadinessConfig {
    pub strategy: ReadinessStrategyKind,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            readiness: ReadinessConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
        }
    }
}

impl Config {
    /// Load from the config file (if present) and apply env overrides.
    pub fn load() -> Result<Self> {
        let path = env::var("PARTREG_CONFIG").unwrap_or_else(|_| "partreg.toml".to_string());
        let mut config = Self::from_file(Path::new(&path))?;
        config.apply_env()?;
        Ok(config)
    }

    /// Parse the file at `path`, or fall back to defaults when it does not
    /// exist. A file that exists but fails to parse is an error, not a
    /// fallback.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(host) = env::var("PARTREG_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("PARTREG_PORT") {
            self.server.port = port
                .parse()
                .context("PARTREG_PORT must be a port number")?;
        }
        if let Ok(url) = env::var("PARTREG_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(max) = env::var("PARTREG_DB_MAX_CONNECTIONS") {
            self.database.max_connections = max
                .parse()
                .context("PARTREG_DB_MAX_CONNECTIONS must be an integer")?;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .with_context(|| {
                format!(
                    "invalid listen address {}:{}",
                    self.server.host, self.server.port
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_when_file_absent() {
        let config = Config::from_file(Path::new("/nonexistent/partreg.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.max_connections, 10);
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nport = 9090\n\n[database]\nurl = \"postgres://localhost/partreg\"\nmax_connections = 4"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.url, "postgres://localhost/partreg");
        assert_eq!(config.database.max_connections, 4);
    }

    #[test]
    fn readiness_strategy_is_selectable() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[readiness]\nstrategy = \"interval_cut\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.readiness.strategy, ReadinessStrategyKind::IntervalCut);
        assert_eq!(
            Config::default().readiness.strategy,
            ReadinessStrategyKind::GapScan
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nprot = 9090").unwrap();
        assert!(Config::from_file(file.path()).is_err());
    }

    #[test]
    fn bind_addr_parses_host_and_port() {
        let config = Config::default();
        assert_eq!(config.bind_addr().unwrap().port(), 8080);
    }
}
