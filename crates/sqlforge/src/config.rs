//! Database connection settings loaded from JSON.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::dialect::{Dialect, DialectRegistry};
use crate::error::{Error, Result};

/// Connection settings.
///
/// ```json
/// {"driver": "postgres", "host": "localhost", "port": 5432,
///  "name": "app", "user": "postgres", "sslmode": "disable"}
/// ```
///
/// Unset fields are left empty (or `0` for the port) and omitted from
/// [`DatabaseConfig::credentials`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub driver: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    #[serde(rename = "sslmode", alias = "ssl_mode")]
    pub ssl_mode: String,
}

impl DatabaseConfig {
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// The driver name and a `key=value` connection string.
    pub fn credentials(&self) -> (&str, String) {
        let mut parts = Vec::new();
        if !self.host.is_empty() {
            parts.push(format!("host={}", self.host));
        }
        if self.port != 0 {
            parts.push(format!("port={}", self.port));
        }
        if !self.name.is_empty() {
            parts.push(format!("dbname={}", self.name));
        }
        if !self.user.is_empty() {
            parts.push(format!("user={}", self.user));
        }
        if !self.password.is_empty() {
            parts.push(format!("password={}", self.password));
        }
        if !self.ssl_mode.is_empty() {
            parts.push(format!("sslmode={}", self.ssl_mode));
        }
        (&self.driver, parts.join(" "))
    }

    /// Look up the dialect registered under the driver name.
    pub fn dialect(&self, registry: &DialectRegistry) -> Result<Arc<dyn Dialect>> {
        if self.driver.is_empty() {
            return Err(Error::config("no driver configured"));
        }
        registry.get(&self.driver)
    }
}
