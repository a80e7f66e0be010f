//! INSERT statements.

use crate::clause::{Clause, Compiles};
use crate::dialect::Dialect;
use crate::error::{Error, Result, StmtErrors};
use crate::param::Params;
use crate::record::{Record, align_columns, camel_to_snake};
use crate::schema::Column;
use crate::stmt::Selection;
use crate::value::Value;
use crate::values::Values;

/// INSERT statement.
///
/// Without any values the statement inserts one row of NULL parameters,
/// which is useful for preparing a statement once and binding values later.
#[derive(Clone, Debug, Default)]
pub struct InsertStmt {
    errs: StmtErrors,
    table: Option<String>,
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
    returning: Vec<Column>,
}

/// Build an INSERT for the given columns, which must belong to one table.
pub fn insert<I>(selections: I) -> InsertStmt
where
    I: IntoIterator,
    I::Item: Into<Selection>,
{
    let mut stmt = InsertStmt::default();
    for selection in selections {
        match selection.into() {
            Selection::Missing => stmt.errs.add_meta(
                "received a nil selection - do the columns or tables you selected exist?",
            ),
            Selection::Subquery(_) => stmt.errs.add_meta("cannot INSERT into a subquery"),
            Selection::Columns(columns) => {
                for column in columns {
                    stmt.add_column(column);
                }
            }
        }
    }
    if stmt.columns.is_empty() {
        stmt.errs.add_meta("INSERT must be given at least one column");
    }
    stmt
}

impl InsertStmt {
    fn add_column(&mut self, column: Column) {
        let Some(table) = column.table() else {
            self.errs.add_meta(format!(
                "column '{}' does not belong to a table",
                column.name()
            ));
            return;
        };
        if !column.is_valid() {
            self.errs
                .add_field(column.name(), table, "INSERT", "column does not exist");
            return;
        }
        match &self.table {
            None => self.table = Some(table.to_string()),
            Some(existing) if existing != table => {
                self.errs.add_meta(format!(
                    "all INSERT columns must belong to the same table: column '{}' belongs to '{table}', not '{existing}'",
                    column.name()
                ));
                return;
            }
            Some(_) => {}
        }
        self.columns.push(column);
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Names of the columns that will be inserted.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn errors(&self) -> &StmtErrors {
        &self.errs
    }

    fn has(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name() == name)
    }

    /// Resolve a map key to a column name, exactly or via snake case.
    fn resolve_key(&self, key: &str) -> Option<String> {
        if self.has(key) {
            return Some(key.to_string());
        }
        let snake = camel_to_snake(key);
        self.has(&snake).then_some(snake)
    }

    // ==================== Value sources ====================

    /// Insert one row from a value map. Columns without a key are dropped
    /// from the statement; keys without a column are errors.
    pub fn values(self, values: Values) -> Self {
        self.values_list(std::slice::from_ref(&values))
    }

    /// Insert several rows from value maps. The first map decides the
    /// column list; every map must provide those columns.
    pub fn values_list(mut self, list: &[Values]) -> Self {
        let Some(first) = list.first() else {
            self.errs.add_meta("INSERT received an empty list of values");
            return self;
        };

        let mut keep: Vec<(String, String)> = Vec::new();
        for key in first.keys() {
            match self.resolve_key(key) {
                Some(column) => keep.push((column, key.to_string())),
                None => {
                    let table = self.table.clone().unwrap_or_default();
                    self.errs.add_meta(format!(
                        "no column '{key}' exists in the table '{table}'"
                    ));
                }
            }
        }

        // Keep statement column order.
        let ordered: Vec<(Column, String)> = self
            .columns
            .iter()
            .filter_map(|c| {
                keep.iter()
                    .find(|(name, _)| name == c.name())
                    .map(|(_, key)| (c.clone(), key.clone()))
            })
            .collect();

        let mut rows = Vec::with_capacity(list.len());
        for (i, values) in list.iter().enumerate() {
            if values.len() != first.len() {
                self.errs.add_meta(format!(
                    "values at index {i} have {} keys, expected {}",
                    values.len(),
                    first.len()
                ));
            }
            let mut row = Vec::with_capacity(ordered.len());
            for (column, key) in &ordered {
                match values.get(key) {
                    Some(value) => row.push(value.clone()),
                    None => {
                        self.errs.add_meta(format!(
                            "values at index {i} are missing column '{}'",
                            column.name()
                        ));
                        row.push(Value::Null);
                    }
                }
            }
            rows.push(row);
        }

        if ordered.is_empty() {
            self.errs
                .add_meta("could not match any values to INSERT columns");
        }
        self.columns = ordered.into_iter().map(|(c, _)| c).collect();
        self.rows = rows;
        self
    }

    /// Insert one record.
    pub fn record<R: Record>(self, record: &R) -> Self {
        self.records(std::slice::from_ref(record))
    }

    /// Insert several records.
    ///
    /// Fields are aligned to the statement's columns by name. Columns with
    /// no matching field are dropped, as are `omit_empty` fields that are
    /// empty in the first record. When no names match and the counts are
    /// equal, fields are used positionally.
    pub fn records<R: Record>(mut self, records: &[R]) -> Self {
        let Some(first) = records.first() else {
            self.errs.add_meta("INSERT received an empty list of records");
            return self;
        };
        let fields = R::fields();
        let names: Vec<String> = self.columns.iter().map(|c| c.name().to_string()).collect();

        let mut pairs: Vec<(Column, usize)> = Vec::new();
        let positional = !names.is_empty()
            && names.len() == fields.len()
            && names.iter().all(|n| !fields.iter().any(|f| f.matches(n)));
        if positional {
            pairs = self.columns.iter().cloned().zip(0..fields.len()).collect();
        } else {
            for (column, index) in self.columns.iter().zip(align_columns(&names, fields)) {
                let Some(index) = index else { continue };
                if fields[index].options.omit_empty && first.get(index).is_empty() {
                    continue;
                }
                pairs.push((column.clone(), index));
            }
        }

        if pairs.is_empty() {
            self.errs.add_meta(
                "could not match fields for INSERT - are the field names or renames correct?",
            );
        }
        self.rows = records
            .iter()
            .map(|r| pairs.iter().map(|(_, index)| r.get(*index)).collect())
            .collect();
        self.columns = pairs.into_iter().map(|(c, _)| c).collect();
        self
    }

    /// Add `RETURNING`. No columns means every column of the insert.
    pub fn returning(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        let columns: Vec<Column> = columns.into_iter().collect();
        if columns.is_empty() {
            self.returning = self.columns.clone();
            return self;
        }
        for column in columns {
            if column.table() != self.table.as_deref() || !column.is_valid() {
                self.errs.add_meta(format!(
                    "the column '{}' in RETURNING does not belong to the inserted table '{}'",
                    column.name(),
                    self.table.as_deref().unwrap_or_default()
                ));
                continue;
            }
            self.returning.push(column);
        }
        self
    }
}

impl Compiles for InsertStmt {
    fn compile(&self, d: &dyn Dialect, ps: &mut Params) -> Result<String> {
        self.errs.check()?;
        let Some(table) = &self.table else {
            return Err(Error::compile("cannot compile an INSERT without columns"));
        };
        let width = self.columns.len();
        if width == 0 {
            return Err(Error::compile("cannot compile an INSERT without columns"));
        }

        let names: Vec<String> = self.columns.iter().map(|c| d.quote(c.name())).collect();
        let null_row = vec![Value::Null; width];
        let rows: Vec<&Vec<Value>> = if self.rows.is_empty() {
            vec![&null_row]
        } else {
            self.rows.iter().collect()
        };

        let mut groups = Vec::with_capacity(rows.len());
        for row in rows {
            if row.len() != width {
                return Err(Error::compile(format!(
                    "size mismatch between values and columns during INSERT: {} is not {width}",
                    row.len()
                )));
            }
            let params = row.iter().cloned().map(Clause::Param);
            groups.push(Clause::func("", Clause::array(params, ", ")).compile(d, ps)?);
        }

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            d.quote(table),
            names.join(", "),
            groups.join(", ")
        );
        if !self.returning.is_empty() {
            let returning = self
                .returning
                .iter()
                .map(|c| c.compile(d, ps))
                .collect::<Result<Vec<_>>>()?;
            sql.push_str(" RETURNING ");
            sql.push_str(&returning.join(", "));
        }
        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::compile;
    use crate::dialect::{Postgres, Sqlite};
    use crate::error::ConversionError;
    use crate::record::Field;
    use crate::schema::{DataType, Table};
    use crate::value::FromValue;
    use std::sync::OnceLock;

    fn users() -> Table {
        Table::new(
            "users",
            vec![
                Column::new("id", DataType::integer()).into(),
                Column::new("name", DataType::varchar(32)).into(),
                Column::new("password", DataType::varchar(0)).into(),
            ],
        )
        .unwrap()
    }

    #[derive(Default)]
    struct User {
        id: i64,
        name: String,
        password: String,
    }

    impl Record for User {
        fn fields() -> &'static [Field] {
            static FIELDS: OnceLock<Vec<Field>> = OnceLock::new();
            FIELDS.get_or_init(|| {
                vec![
                    Field::new("ID", "id").omit_empty(),
                    Field::new("Name", "name"),
                    Field::new("Password", "password"),
                ]
            })
        }

        fn get(&self, index: usize) -> Value {
            match index {
                0 => Value::from(self.id),
                1 => Value::from(&self.name),
                2 => Value::from(&self.password),
                _ => Value::Null,
            }
        }

        fn set(&mut self, index: usize, value: Value) -> std::result::Result<(), ConversionError> {
            match index {
                0 => self.id = FromValue::from_value(value)?,
                1 => self.name = FromValue::from_value(value)?,
                2 => self.password = FromValue::from_value(value)?,
                _ => {}
            }
            Ok(())
        }
    }

    #[test]
    fn test_insert_without_values_binds_nulls() {
        let users = users();
        let (sql, ps) = compile(&Postgres, &insert([users.c("name"), users.c("password")])).unwrap();
        assert_eq!(sql, r#"INSERT INTO "users" ("name", "password") VALUES ($1, $2)"#);
        assert_eq!(ps.as_slice(), &[Value::Null, Value::Null]);
    }

    #[test]
    fn test_insert_table() {
        let (sql, ps) = compile(&Sqlite, &users().insert()).unwrap();
        assert_eq!(sql, r#"INSERT INTO "users" ("id", "name", "password") VALUES (?, ?, ?)"#);
        assert_eq!(ps.len(), 3);
    }

    #[test]
    fn test_insert_values_map() {
        let values = Values::new().with("name", "admin").with("password", "secret");
        let stmt = users().insert().values(values);
        let (sql, ps) = compile(&Postgres, &stmt).unwrap();
        assert_eq!(sql, r#"INSERT INTO "users" ("name", "password") VALUES ($1, $2)"#);
        assert_eq!(ps.as_slice(), &[Value::from("admin"), Value::from("secret")]);
    }

    #[test]
    fn test_insert_values_camel_keys() {
        let values = Values::new().with("Name", "admin");
        let (sql, _) = compile(&Postgres, &users().insert().values(values)).unwrap();
        assert_eq!(sql, r#"INSERT INTO "users" ("name") VALUES ($1)"#);
    }

    #[test]
    fn test_insert_values_unknown_key() {
        let values = Values::new().with("email", "a@b.c");
        let err = users().insert().values(values).to_sql().unwrap_err();
        assert!(err.to_string().contains("no column 'email' exists in the table 'users'"));
    }

    #[test]
    fn test_insert_values_list() {
        let list = vec![
            Values::new().with("name", "a").with("id", 1),
            Values::new().with("name", "b").with("id", 2),
        ];
        let (sql, ps) = compile(&Postgres, &users().insert().values_list(&list)).unwrap();
        assert_eq!(sql, r#"INSERT INTO "users" ("id", "name") VALUES ($1, $2), ($3, $4)"#);
        assert_eq!(ps.len(), 4);
    }

    #[test]
    fn test_insert_record_omits_empty() {
        let user = User {
            id: 0,
            name: "admin".into(),
            password: "secret".into(),
        };
        let (sql, ps) = compile(&Postgres, &users().insert().record(&user)).unwrap();
        assert_eq!(sql, r#"INSERT INTO "users" ("name", "password") VALUES ($1, $2)"#);
        assert_eq!(ps.len(), 2);

        let user = User { id: 7, ..user };
        let (sql, _) = compile(&Postgres, &users().insert().record(&user)).unwrap();
        assert_eq!(sql, r#"INSERT INTO "users" ("id", "name", "password") VALUES ($1, $2, $3)"#);
    }

    #[test]
    fn test_insert_records() {
        let records = vec![
            User { id: 1, name: "a".into(), password: "x".into() },
            User { id: 2, name: "b".into(), password: "y".into() },
        ];
        let users = users();
        let stmt = insert([users.c("name"), users.c("id")]).records(&records);
        let (sql, ps) = compile(&Postgres, &stmt).unwrap();
        assert_eq!(sql, r#"INSERT INTO "users" ("name", "id") VALUES ($1, $2), ($3, $4)"#);
        assert_eq!(
            ps.as_slice(),
            &[Value::from("a"), Value::Int(1), Value::from("b"), Value::Int(2)]
        );
    }

    #[test]
    fn test_insert_mixed_tables() {
        let users = users();
        let other = Table::new("other", vec![Column::new("x", DataType::integer()).into()]).unwrap();
        let err = insert([users.c("id"), other.c("x")]).to_sql().unwrap_err();
        assert!(err.to_string().contains("same table"));
    }

    #[test]
    fn test_insert_no_columns() {
        let err = insert(Vec::<Column>::new()).to_sql().unwrap_err();
        assert!(err.to_string().contains("at least one column"));
    }

    #[test]
    fn test_insert_returning() {
        let users = users();
        let stmt = insert([users.c("name")])
            .values(Values::new().with("name", "a"))
            .returning([users.c("id")]);
        assert_eq!(
            stmt.to_sql().unwrap(),
            r#"INSERT INTO "users" ("name") VALUES ($1) RETURNING "users"."id""#
        );
    }
}
