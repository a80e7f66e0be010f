//! Running statements through `Conn` with an in-memory executor.

use std::sync::{Arc, Mutex};

use sqlforge::{
    Column, Conn, DataType, DialectRegistry, Executor, MemoryRows, Record, Result, Rows, Table,
    Value, Values,
};

/// A canned result for one SQL text and parameter list.
struct Answer {
    sql: String,
    params: Vec<Value>,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

/// Answers queries whose SQL and parameters both match a canned result.
/// Anything else gets an empty result.
#[derive(Default)]
struct Canned {
    answers: Vec<Answer>,
    log: Mutex<Vec<String>>,
}

impl Canned {
    fn answer(mut self, sql: &str, params: Vec<Value>, columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        self.answers.push(Answer {
            sql: sql.to_string(),
            params,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        });
        self
    }
}

impl Executor for Canned {
    async fn query(&self, sql: &str, params: &[Value]) -> Result<Box<dyn Rows + Send>> {
        self.log.lock().unwrap().push(sql.to_string());
        let rows = match self.answers.iter().find(|a| a.sql == sql && a.params == params) {
            Some(answer) => MemoryRows::new(answer.columns.clone(), answer.rows.clone()),
            None => MemoryRows::default(),
        };
        Ok(Box::new(rows))
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        self.log.lock().unwrap().push(sql.to_string());
        Ok(params.len() as u64)
    }
}

#[derive(Debug, Default, PartialEq, Record)]
struct Contact {
    id: i64,
    key: String,
    value: Option<String>,
}

fn contacts() -> Table {
    Table::new(
        "contacts",
        vec![
            Column::new("id", DataType::integer()).into(),
            Column::new("key", DataType::varchar(32)).into(),
            Column::new("value", DataType::varchar(128)).into(),
        ],
    )
    .unwrap()
}

const SELECT_SQL: &str =
    r#"SELECT "contacts"."id", "contacts"."key", "contacts"."value" FROM "contacts" WHERE "contacts"."key" = $1"#;

fn conn() -> Conn<Canned> {
    let registry = DialectRegistry::with_defaults();
    let executor = Canned::default().answer(
        SELECT_SQL,
        vec![Value::from("email")],
        &["id", "key", "value"],
        vec![
            vec![Value::Int(1), Value::from("email"), Value::from("a@example.com")],
            vec![Value::Int(2), Value::from("email"), Value::Null],
        ],
    );
    Conn::new(executor, registry.get("postgres").unwrap())
}

#[tokio::test]
async fn test_query_all_records() {
    let conn = conn();
    let contacts = contacts();
    let stmt = contacts.select().where_([contacts.c("key").equals("email")]);

    let mut found: Vec<Contact> = Vec::new();
    conn.query_all(&stmt, &mut found).await.unwrap();
    assert_eq!(
        found,
        vec![
            Contact { id: 1, key: "email".into(), value: Some("a@example.com".into()) },
            Contact { id: 2, key: "email".into(), value: None },
        ]
    );
}

#[tokio::test]
async fn test_query_one_map() {
    let conn = conn();
    let contacts = contacts();
    let stmt = contacts.select().where_([contacts.c("key").equals("email")]);

    let mut row = Values::new();
    conn.query_one(&stmt, &mut row).await.unwrap();
    assert_eq!(row.get("id"), Some(&Value::Int(1)));
    assert_eq!(row.len(), 3);
}

#[tokio::test]
async fn test_query_one_no_rows() {
    let conn = conn();
    let contacts = contacts();
    let stmt = contacts.select().where_([contacts.c("key").equals("phone")]);

    let mut contact = Contact::default();
    let err = conn.query_one(&stmt, &mut contact).await.unwrap_err();
    assert!(err.is_no_rows());
    assert_eq!(contact, Contact::default());
    // Same SQL text as the email lookup; only the bound value differs.
    assert_eq!(conn.executor().log.lock().unwrap().as_slice(), [SELECT_SQL]);
}

#[tokio::test]
async fn test_execute_and_string() {
    let conn = conn();
    let contacts = contacts();
    let stmt = contacts
        .update()
        .values(Values::new().with("value", "b@example.com"))
        .where_([contacts.c("id").equals(2)]);

    assert_eq!(
        conn.string(&stmt).unwrap(),
        r#"UPDATE "contacts" SET "value" = $1 WHERE "contacts"."id" = $2"#
    );
    assert_eq!(conn.execute(&stmt).await.unwrap(), 2);
    assert_eq!(conn.executor().log.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_shared_conn() {
    let conn = Arc::new(conn());
    let contacts = contacts();
    let stmt = contacts.select().where_([contacts.c("key").equals("email")]);

    let mut rows: Vec<Values> = Vec::new();
    conn.query_all(&stmt, &mut rows).await.unwrap();
    assert_eq!(rows.len(), 2);
}
