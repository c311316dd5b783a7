use chrono::Utc;
use sqlx::Row;
use std::time::Instant;

use crate::database::manager::{Database, DatabaseError};
use crate::database::models::{Entity, FieldKind};
use crate::database::query_builder::{bind_param_query, log_query, QueryBuilder};
use crate::database::record::Record;
use crate::filter::types::{is_valid_identifier, SqlResult};
use crate::filter::{FilterData, FilterWhere};
use crate::types::Operation;

/// Parameterized single-row access to one entity's table.
pub struct Repository<T> {
    db: Database,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Entity> Repository<T> {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Inserts `record` and returns the new row id. `created_at` is stamped here.
    pub async fn insert(&self, record: &Record) -> Result<i64, DatabaseError> {
        self.check_columns(record)?;
        record
            .validate_required_fields(T::FIELDS)
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        let mut columns: Vec<String> = record.iter().map(|(k, _)| format!("\"{}\"", k)).collect();
        columns.push("\"created_at\"".to_string());
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = SqlResult {
            query: format!(
                "INSERT INTO \"{}\" ({}) VALUES ({})",
                T::TABLE,
                columns.join(", "),
                placeholders
            ),
            params: record.iter().map(|(_, v)| v.clone()).collect(),
        };

        let started = Instant::now();
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query(q, p);
        }
        let result = q
            .bind(Utc::now())
            .execute(self.db.pool())
            .await
            .map_err(DatabaseError::from_write)?;
        log_query(&self.db, Operation::Create, &sql, started);

        let id = result.last_insert_rowid();
        tracing::info!(table = T::TABLE, id, "Inserted {}", T::SINGULAR);
        Ok(id)
    }

    pub async fn update(&self, id: i64, record: &Record) -> Result<(), DatabaseError> {
        self.check_columns(record)?;
        if record.is_empty() {
            return Err(DatabaseError::QueryError("No fields to update".to_string()));
        }

        let assignments: Vec<String> = record.iter().map(|(k, _)| format!("\"{}\" = ?", k)).collect();
        let mut params: Vec<_> = record.iter().map(|(_, v)| v.clone()).collect();
        params.push(id.into());
        let sql = SqlResult {
            query: format!("UPDATE \"{}\" SET {} WHERE \"id\" = ?", T::TABLE, assignments.join(", ")),
            params,
        };

        let started = Instant::now();
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query(q, p);
        }
        let result = q.execute(self.db.pool()).await.map_err(DatabaseError::from_write)?;
        log_query(&self.db, Operation::Update, &sql, started);

        if result.rows_affected() == 0 {
            return Err(self.not_found(id));
        }
        tracing::info!(table = T::TABLE, id, "Updated {}", T::SINGULAR);
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let sql = SqlResult {
            query: format!("DELETE FROM \"{}\" WHERE \"id\" = ?", T::TABLE),
            params: vec![id.into()],
        };

        let started = Instant::now();
        let result = sqlx::query(&sql.query)
            .bind(id)
            .execute(self.db.pool())
            .await
            .map_err(DatabaseError::from_write)?;
        log_query(&self.db, Operation::Delete, &sql, started);

        if result.rows_affected() == 0 {
            return Err(self.not_found(id));
        }
        tracing::info!(table = T::TABLE, id, "Deleted {}", T::SINGULAR);
        Ok(())
    }

    pub async fn get(&self, id: i64) -> Result<Option<T>, DatabaseError> {
        let filter = FilterData::new(FilterWhere::new().eq("id", id)?).limit(1);
        QueryBuilder::<T>::new(T::TABLE)?
            .filter(&self.db, filter)?
            .select_optional(&self.db)
            .await
    }

    pub async fn select_404(&self, id: i64) -> Result<T, DatabaseError> {
        self.get(id).await?.ok_or_else(|| self.not_found(id))
    }

    pub async fn list(&self, filter_data: FilterData) -> Result<Vec<T>, DatabaseError> {
        QueryBuilder::<T>::new(T::TABLE)?
            .filter(&self.db, filter_data)?
            .select_all(&self.db)
            .await
    }

    pub async fn count(&self, filter_data: FilterData) -> Result<i64, DatabaseError> {
        QueryBuilder::<T>::new(T::TABLE)?
            .filter(&self.db, filter_data)?
            .count(&self.db)
            .await
    }

    /// `(id, label)` choices for every reference field of `T`, keyed by field name.
    pub async fn reference_options(&self) -> Result<Vec<(&'static str, Vec<(i64, String)>)>, DatabaseError> {
        let mut out = Vec::new();
        for spec in T::FIELDS {
            if let FieldKind::Reference { table, display } = spec.kind {
                out.push((spec.name, reference_options(&self.db, table, display).await?));
            }
        }
        Ok(out)
    }

    fn check_columns(&self, record: &Record) -> Result<(), DatabaseError> {
        record
            .validate_columns(T::FIELDS, T::SYSTEM_FIELDS)
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        // Keys end up quoted in SQL text
        match record.iter().find(|(k, _)| !is_valid_identifier(k)) {
            Some((k, _)) => Err(DatabaseError::QueryError(format!("Invalid column name: {}", k))),
            None => Ok(()),
        }
    }

    fn not_found(&self, id: i64) -> DatabaseError {
        DatabaseError::NotFound(format!("{} #{} not found", T::SINGULAR, id))
    }
}

/// Rows of `table` as `(id, label)`, labelled by `display` or `#id` when blank.
pub async fn reference_options(
    db: &Database,
    table: &str,
    display: Option<&str>,
) -> Result<Vec<(i64, String)>, DatabaseError> {
    if !is_valid_identifier(table) || !display.map_or(true, is_valid_identifier) {
        return Err(DatabaseError::QueryError(format!("Invalid reference target: {}", table)));
    }
    let label = match display {
        Some(column) => format!("COALESCE(CAST(\"{}\" AS TEXT), '')", column),
        None => "''".to_string(),
    };
    let query = format!("SELECT \"id\" AS id, {} AS label FROM \"{}\" ORDER BY \"id\" DESC", label, table);

    let rows = sqlx::query(&query).fetch_all(db.pool()).await?;
    let mut options = Vec::with_capacity(rows.len());
    for row in rows {
        let id: i64 = row.try_get("id")?;
        let label: String = row.try_get("label")?;
        let label = if label.is_empty() { format!("#{}", id) } else { label };
        options.push((id, label));
    }
    Ok(options)
}
