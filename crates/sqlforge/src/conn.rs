//! Running compiled statements against a database.

use std::future::Future;
use std::sync::Arc;

use crate::clause::{Compiles, compile};
use crate::dialect::Dialect;
use crate::error::Result;
use crate::result::{Destination, QueryResult, Rows};
use crate::value::Value;

/// A database handle that can run SQL with positional parameters.
///
/// The SQL handed to an executor is already rendered for the dialect the
/// [`Conn`] was built with.
pub trait Executor: Send + Sync {
    /// Run a statement that returns rows.
    fn query(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<Box<dyn Rows + Send>>> + Send;

    /// Run a statement and return the number of affected rows.
    fn execute(&self, sql: &str, params: &[Value]) -> impl Future<Output = Result<u64>> + Send;
}

/// An executor paired with the dialect its SQL is compiled for.
#[derive(Clone, Debug)]
pub struct Conn<E> {
    executor: E,
    dialect: Arc<dyn Dialect>,
}

impl<E: Executor> Conn<E> {
    pub fn new(executor: E, dialect: Arc<dyn Dialect>) -> Self {
        Self { executor, dialect }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn into_inner(self) -> E {
        self.executor
    }

    fn prepare(&self, stmt: &(impl Compiles + ?Sized)) -> Result<(String, Vec<Value>)> {
        let (sql, params) = compile(self.dialect.as_ref(), stmt)?;
        tracing::debug!(
            target: "sqlforge.sql",
            dialect = ?self.dialect,
            param_count = params.len(),
            sql = %sql,
        );
        Ok((sql, params.into_vec()))
    }

    /// Compile `stmt` without running it.
    pub fn string(&self, stmt: &(impl Compiles + ?Sized)) -> Result<String> {
        self.prepare(stmt).map(|(sql, _)| sql)
    }

    /// Run `stmt` and read its first row into `dest`.
    pub async fn query_one<D: Destination>(
        &self,
        stmt: &(impl Compiles + ?Sized),
        dest: &mut D,
    ) -> Result<()> {
        let (sql, params) = self.prepare(stmt)?;
        let rows = self.executor.query(&sql, &params).await?;
        QueryResult::new(rows).one(dest)
    }

    /// Run `stmt` and read every row into `dest`.
    pub async fn query_all<D: Destination + Default>(
        &self,
        stmt: &(impl Compiles + ?Sized),
        dest: &mut Vec<D>,
    ) -> Result<()> {
        let (sql, params) = self.prepare(stmt)?;
        let rows = self.executor.query(&sql, &params).await?;
        QueryResult::new(rows).all(dest)
    }

    /// Run `stmt` and return the number of affected rows.
    pub async fn execute(&self, stmt: &(impl Compiles + ?Sized)) -> Result<u64> {
        let (sql, params) = self.prepare(stmt)?;
        self.executor.execute(&sql, &params).await
    }
}
