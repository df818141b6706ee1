//! Server configuration from environment variables.

use hazard_map_database::db::{DEFAULT_DATABASE_URL, DEFAULT_STATEMENT_TIMEOUT};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::ServerError;

/// Which [`hazard_map_database::HazardStore`] backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoreBackend {
    /// `PostgreSQL` via `DATABASE_URL`.
    Postgres,
    /// Process-local memory; data is lost on restart.
    Memory,
}

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`, default `127.0.0.1`).
    pub bind_addr: String,
    /// Port to bind (`PORT`, default 8080).
    pub port: u16,
    /// Store backend (`HAZARD_STORE`, default `postgres`).
    pub store: StoreBackend,
    /// `PostgreSQL` connection string (`DATABASE_URL`).
    pub database_url: String,
    /// Per-statement timeout (`DB_STATEMENT_TIMEOUT`, default `30s`).
    pub statement_timeout: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            store: StoreBackend::Postgres,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            statement_timeout: DEFAULT_STATEMENT_TIMEOUT.to_string(),
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] if `PORT` or `HAZARD_STORE` holds an
    /// unusable value.
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] if `PORT` or `HAZARD_STORE` holds an
    /// unusable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerError> {
        let defaults = Self::default();

        let port: u16 = match lookup("PORT") {
            Some(port) => port.trim().parse().map_err(|_| ServerError::Config {
                message: format!("PORT must be a port number, got {port:?}"),
            })?,
            None => defaults.port,
        };

        let store: StoreBackend = match lookup("HAZARD_STORE") {
            Some(store) => store.trim().parse().map_err(|_| ServerError::Config {
                message: format!("HAZARD_STORE must be 'postgres' or 'memory', got {store:?}"),
            })?,
            None => defaults.store,
        };

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port,
            store,
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            statement_timeout: lookup("DB_STATEMENT_TIMEOUT")
                .unwrap_or(defaults.statement_timeout),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, 8080);
        assert_eq!(config.store, StoreBackend::Postgres);
    }

    #[test]
    fn reads_every_variable() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("BIND_ADDR", "0.0.0.0"),
            ("PORT", "3000"),
            ("HAZARD_STORE", "Memory"),
            ("DATABASE_URL", "postgres://u:p@db/hazards"),
            ("DB_STATEMENT_TIMEOUT", "5s"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.database_url, "postgres://u:p@db/hazards");
        assert_eq!(config.statement_timeout, "5s");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            ServerConfig::from_lookup(lookup(&[("PORT", "eighty")])),
            Err(ServerError::Config { .. })
        ));
        assert!(matches!(
            ServerConfig::from_lookup(lookup(&[("HAZARD_STORE", "redis")])),
            Err(ServerError::Config { .. })
        ));
    }
}
