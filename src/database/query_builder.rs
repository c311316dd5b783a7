use serde_json::Value;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{self, FromRow, Row, Sqlite};
use std::time::Instant;

use crate::database::manager::{Database, DatabaseError};
use crate::filter::types::SqlResult;
use crate::filter::{Filter, FilterData};
use crate::types::Operation;

pub struct QueryBuilder<T> {
    table_name: String,
    filter: Filter,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    pub fn new(table_name: impl Into<String>) -> Result<Self, DatabaseError> {
        let name = table_name.into();
        let filter = Filter::new(&name)?;
        Ok(Self {
            table_name: name,
            filter,
            _phantom: std::marker::PhantomData,
        })
    }

    pub fn filter(mut self, db: &Database, filter_data: FilterData) -> Result<Self, DatabaseError> {
        let mut filter = Filter::new(&self.table_name)?.max_limit(db.settings().max_limit);
        filter.assign(filter_data)?;
        self.filter = filter;
        Ok(self)
    }

    pub async fn select_all(self, db: &Database) -> Result<Vec<T>, DatabaseError> {
        let sql_result = self.filter.to_sql();
        let started = Instant::now();
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(db.pool()).await?;
        log_query(db, Operation::Select, &sql_result, started);
        Ok(rows)
    }

    pub async fn select_optional(self, db: &Database) -> Result<Option<T>, DatabaseError> {
        let sql_result = self.filter.to_sql();
        let started = Instant::now();
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let row = q.fetch_optional(db.pool()).await?;
        log_query(db, Operation::Select, &sql_result, started);
        Ok(row)
    }

    pub async fn count(self, db: &Database) -> Result<i64, DatabaseError> {
        let sql_result = self.filter.to_count_sql();
        let started = Instant::now();
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(db.pool()).await?;
        log_query(db, Operation::Select, &sql_result, started);
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }
}

/// Debug-logs the statement when query logging is on and warns past the slow threshold.
pub(crate) fn log_query(db: &Database, operation: Operation, sql: &SqlResult, started: Instant) {
    let settings = db.settings();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if elapsed_ms >= settings.slow_query_threshold_ms {
        tracing::warn!(%operation, elapsed_ms, "Slow query: {}", sql.query);
    } else if settings.enable_query_logging {
        tracing::debug!(%operation, elapsed_ms, params = sql.params.len(), "{}", sql.query);
    }
}

pub(crate) fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    v: &Value,
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.clone()),
        // Structured values are stored as JSON text
        Value::Array(_) | Value::Object(_) => q.bind(v.to_string()),
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    v: &Value,
) -> sqlx::query::QueryAs<'q, Sqlite, O, SqliteArguments<'q>>
where
    O: for<'r> FromRow<'r, SqliteRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.clone()),
        Value::Array(_) | Value::Object(_) => q.bind(v.to_string()),
    }
}
