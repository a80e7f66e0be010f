//! tokio-postgres adapter.

use std::error::Error as StdError;

use bytes::BytesMut;
use tokio_postgres::tls::NoTlsStream;
use tokio_postgres::types::{IsNull, ToSql, Type};
use tokio_postgres::{Client, Connection, NoTls, Row, Socket};

use crate::config::DatabaseConfig;
use crate::conn::Executor;
use crate::error::{Error, Result};
use crate::result::{MemoryRows, Rows};
use crate::value::Value;

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, Box<dyn StdError + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => b.to_sql(ty, out),
            // Integers are narrowed to the width the server declared.
            Value::Int(i) => match *ty {
                Type::INT2 => i16::try_from(*i)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*i)?.to_sql(ty, out),
                Type::FLOAT8 => (*i as f64).to_sql(ty, out),
                _ => i.to_sql(ty, out),
            },
            Value::Float(f) => match *ty {
                Type::FLOAT4 => (*f as f32).to_sql(ty, out),
                _ => f.to_sql(ty, out),
            },
            Value::Text(s) => s.to_sql(ty, out),
            Value::Bytes(b) => b.to_sql(ty, out),
            Value::Date(d) => d.to_sql(ty, out),
            Value::DateTime(dt) => dt.to_sql(ty, out),
            Value::Timestamp(ts) => ts.to_sql(ty, out),
            Value::Uuid(u) => u.to_sql(ty, out),
            Value::Json(j) => j.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

fn decode(row: &Row, index: usize) -> Result<Value> {
    let ty = row.columns()[index].type_();
    let value = match *ty {
        Type::BOOL => row.try_get::<_, Option<bool>>(index)?.map(Value::Bool),
        Type::INT2 => row.try_get::<_, Option<i16>>(index)?.map(|v| Value::Int(v.into())),
        Type::INT4 => row.try_get::<_, Option<i32>>(index)?.map(|v| Value::Int(v.into())),
        Type::INT8 => row.try_get::<_, Option<i64>>(index)?.map(Value::Int),
        Type::FLOAT4 => row.try_get::<_, Option<f32>>(index)?.map(|v| Value::Float(v.into())),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(index)?.map(Value::Float),
        Type::BYTEA => row.try_get::<_, Option<Vec<u8>>>(index)?.map(Value::Bytes),
        Type::DATE => row.try_get::<_, Option<chrono::NaiveDate>>(index)?.map(Value::Date),
        Type::TIMESTAMP => row
            .try_get::<_, Option<chrono::NaiveDateTime>>(index)?
            .map(Value::DateTime),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<chrono::DateTime<chrono::Utc>>>(index)?
            .map(Value::Timestamp),
        Type::UUID => row.try_get::<_, Option<uuid::Uuid>>(index)?.map(Value::Uuid),
        Type::JSON | Type::JSONB => row
            .try_get::<_, Option<serde_json::Value>>(index)?
            .map(Value::Json),
        _ => row.try_get::<_, Option<String>>(index)?.map(Value::Text),
    };
    Ok(value.unwrap_or_default())
}

/// [`Executor`] over a `tokio_postgres::Client`.
///
/// Results are buffered into a [`MemoryRows`] cursor.
pub struct PgExecutor {
    client: Client,
}

impl PgExecutor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect without TLS using a `postgres` driver config.
    ///
    /// The returned connection must be polled (usually spawned) for the
    /// client to make progress.
    pub async fn connect(config: &DatabaseConfig) -> Result<(Self, Connection<Socket, NoTlsStream>)> {
        let (driver, credentials) = config.credentials();
        if driver != "postgres" {
            return Err(Error::config(format!(
                "cannot open a postgres connection for driver '{driver}'"
            )));
        }
        let (client, connection) = tokio_postgres::connect(&credentials, NoTls).await?;
        Ok((Self::new(client), connection))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn into_inner(self) -> Client {
        self.client
    }
}

fn as_params(params: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

impl Executor for PgExecutor {
    async fn query(&self, sql: &str, params: &[Value]) -> Result<Box<dyn Rows + Send>> {
        let statement = self.client.prepare(sql).await?;
        let columns: Vec<String> = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        let rows = self.client.query(&statement, &as_params(params)).await?;
        let decoded = rows
            .iter()
            .map(|row| (0..row.len()).map(|i| decode(row, i)).collect::<Result<Vec<_>>>())
            .collect::<Result<Vec<_>>>()?;
        Ok(Box::new(MemoryRows::new(columns, decoded)))
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        Ok(self.client.execute(sql, &as_params(params)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &Value, ty: &Type) -> (IsNull, Vec<u8>) {
        let mut buf = BytesMut::new();
        let is_null = value.to_sql(ty, &mut buf).unwrap();
        (is_null, buf.to_vec())
    }

    #[test]
    fn test_null() {
        let (is_null, bytes) = encode(&Value::Null, &Type::INT4);
        assert!(matches!(is_null, IsNull::Yes));
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_int_narrowing() {
        assert_eq!(encode(&Value::Int(5), &Type::INT4).1, vec![0, 0, 0, 5]);
        assert_eq!(encode(&Value::Int(5), &Type::INT2).1, vec![0, 5]);
        assert_eq!(encode(&Value::Int(5), &Type::INT8).1, vec![0, 0, 0, 0, 0, 0, 0, 5]);
    }

    #[test]
    fn test_int_overflow() {
        let mut buf = BytesMut::new();
        assert!(Value::Int(70_000).to_sql(&Type::INT2, &mut buf).is_err());
    }

    #[test]
    fn test_text() {
        assert_eq!(encode(&Value::from("hi"), &Type::TEXT).1, b"hi".to_vec());
    }

    #[tokio::test]
    async fn test_connect_rejects_other_drivers() {
        let config = DatabaseConfig {
            driver: "mysql".into(),
            ..DatabaseConfig::default()
        };
        let err = PgExecutor::connect(&config).await.err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }
}
