//! Adapter configuration.
//!
//! Supplied once when an adapter is constructed and read-only afterwards.
//! Every key is optional; concrete adapters decide which ones they require.
//!
//! ```toml
//! [[database]]
//! adapter = "mysql"
//! host = "localhost"
//! port = 3306
//! database = "app"
//! username = "app"
//! password = "secret"
//! profiling = true
//! ```

use crate::error::{DbError, DbResult};
use crate::literal::{ISO_DATETIME_FORMAT, LiteralSerializer, validate_datetime_format};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Connection parameters and behaviour flags for one adapter instance.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Adapter key, e.g. `"mysql"` or `"pgsql"`.
    pub adapter: Option<String>,
    pub host: Option<String>,
    /// Some backends name the host "server".
    pub server: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    /// Service name (Informix-style backends).
    pub service: Option<String>,
    /// Wire protocol (Informix-style backends).
    pub protocol: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Objects loaded through this database may be cached.
    pub caching: bool,
    /// Record a profile entry for every executed statement.
    pub profiling: bool,
    /// chrono strftime pattern for date + time literals.
    pub date_format: Option<String>,
}

impl AdapterConfig {
    /// Create a configuration for the given adapter key.
    pub fn new(adapter: impl Into<String>) -> Self {
        Self {
            adapter: Some(adapter.into()),
            ..Self::default()
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_caching(mut self, caching: bool) -> Self {
        self.caching = caching;
        self
    }

    pub fn with_profiling(mut self, profiling: bool) -> Self {
        self.profiling = profiling;
        self
    }

    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    /// Parse a single adapter table from TOML.
    pub fn from_toml_str(s: &str) -> DbResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that can be checked without a backend.
    pub fn validate(&self) -> DbResult<()> {
        if let Some(format) = &self.date_format {
            validate_datetime_format(format)?;
        }
        if self.port == Some(0) {
            return Err(DbError::Config("port cannot be 0".to_string()));
        }
        Ok(())
    }

    /// The configured date + time pattern, or the ISO-8601 default.
    pub fn date_format(&self) -> &str {
        self.date_format.as_deref().unwrap_or(ISO_DATETIME_FORMAT)
    }

    /// Host, falling back to `server` for backends that use that name.
    pub fn host_or_server(&self) -> Option<&str> {
        self.host.as_deref().or(self.server.as_deref())
    }

    /// The literal serializer this configuration implies.
    pub fn literal_serializer(&self) -> DbResult<LiteralSerializer> {
        LiteralSerializer::new().with_datetime_format(self.date_format())
    }
}

impl fmt::Debug for AdapterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterConfig")
            .field("adapter", &self.adapter)
            .field("host", &self.host)
            .field("server", &self.server)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("service", &self.service)
            .field("protocol", &self.protocol)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("caching", &self.caching)
            .field("profiling", &self.profiling)
            .field("date_format", &self.date_format)
            .finish()
    }
}

/// A set of numbered database configurations, read from `[[database]]` tables.
///
/// Indexes are 1-based in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabasesConfig {
    #[serde(default, rename = "database")]
    pub databases: Vec<AdapterConfig>,
}

impl DatabasesConfig {
    pub fn from_toml_str(s: &str) -> DbResult<Self> {
        let config: Self = toml::from_str(s)?;
        for db in &config.databases {
            db.validate()?;
        }
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| DbError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Configuration for the 1-based database `index`.
    pub fn get(&self, index: usize) -> Option<&AdapterConfig> {
        index.checked_sub(1).and_then(|i| self.databases.get(i))
    }

    /// `(index, config)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &AdapterConfig)> {
        self.databases.iter().enumerate().map(|(i, c)| (i + 1, c))
    }

    pub fn len(&self) -> usize {
        self.databases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }
}
