//! Dialects and the dialect registry.
//!
//! A dialect decides how a bound value is referenced from SQL text (`$1` or
//! `?`) and how identifiers are quoted. Dialects are looked up by name through
//! an explicit [`DialectRegistry`] built once at startup.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Placeholder and quoting strategy for one database flavor.
pub trait Dialect: Debug + Send + Sync {
    /// Placeholder for the parameter at the zero-based `index` of the sink.
    fn param(&self, index: usize) -> String;

    /// Quote an identifier.
    fn quote(&self, ident: &str) -> String {
        format!("\"{ident}\"")
    }
}

/// PostgreSQL: numbered `$n` placeholders.
#[derive(Clone, Copy, Debug, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    fn param(&self, index: usize) -> String {
        format!("${}", index + 1)
    }
}

/// MySQL: `?` placeholders and backtick identifiers.
#[derive(Clone, Copy, Debug, Default)]
pub struct MySql;

impl Dialect for MySql {
    fn param(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn quote(&self, ident: &str) -> String {
        format!("`{ident}`")
    }
}

/// SQLite: `?` placeholders.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn param(&self, _index: usize) -> String {
        "?".to_string()
    }
}

/// Named collection of dialects.
#[derive(Clone, Debug, Default)]
pub struct DialectRegistry {
    dialects: BTreeMap<String, Arc<dyn Dialect>>,
}

impl DialectRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with `postgres`, `mysql` and `sqlite3` registered.
    pub fn with_defaults() -> Self {
        let mut dialects: BTreeMap<String, Arc<dyn Dialect>> = BTreeMap::new();
        dialects.insert("postgres".to_string(), Arc::new(Postgres));
        dialects.insert("mysql".to_string(), Arc::new(MySql));
        dialects.insert("sqlite3".to_string(), Arc::new(Sqlite));
        Self { dialects }
    }

    /// Register a dialect under `name`. Registering a name twice is an error.
    pub fn register(&mut self, name: impl Into<String>, dialect: Arc<dyn Dialect>) -> Result<()> {
        let name = name.into();
        if self.dialects.contains_key(&name) {
            return Err(Error::DuplicateDialect(name));
        }
        tracing::trace!(dialect = %name, "registered dialect");
        self.dialects.insert(name, dialect);
        Ok(())
    }

    /// Look up a dialect by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Dialect>> {
        self.dialects
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownDialect(name.to_string()))
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.dialects.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_placeholders_are_one_based() {
        assert_eq!(Postgres.param(0), "$1");
        assert_eq!(Postgres.param(9), "$10");
        assert_eq!(Postgres.quote("users"), "\"users\"");
    }

    #[test]
    fn test_generic_placeholders() {
        assert_eq!(MySql.param(3), "?");
        assert_eq!(Sqlite.param(0), "?");
        assert_eq!(MySql.quote("users"), "`users`");
    }

    #[test]
    fn test_registry_defaults() {
        let registry = DialectRegistry::with_defaults();
        assert_eq!(registry.names(), vec!["mysql", "postgres", "sqlite3"]);
        assert_eq!(registry.get("postgres").unwrap().param(1), "$2");
    }

    #[test]
    fn test_registry_unknown() {
        let registry = DialectRegistry::new();
        let err = registry.get("oracle").unwrap_err();
        assert!(matches!(err, Error::UnknownDialect(ref n) if n == "oracle"));
    }

    #[test]
    fn test_registry_duplicate() {
        let mut registry = DialectRegistry::new();
        registry.register("pg", Arc::new(Postgres)).unwrap();
        let err = registry.register("pg", Arc::new(Sqlite)).unwrap_err();
        assert!(matches!(err, Error::DuplicateDialect(_)));
        // The original registration is kept.
        assert_eq!(registry.get("pg").unwrap().param(0), "$1");
    }
}
