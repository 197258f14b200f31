//! Audit log repository

use sqlx::{Executor, Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        log::{LogEntryView, MaintenanceLog, NewLogEntry},
        user::display_name_sql,
    },
};

#[derive(Clone)]
pub struct LogsRepository {
    pool: Pool<Postgres>,
}

impl LogsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Append an entry. Takes any executor so it can join the caller's transaction.
    pub async fn append<'e, E>(executor: E, request_id: i32, entry: &NewLogEntry) -> AppResult<MaintenanceLog>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, MaintenanceLog>(
            r#"
            INSERT INTO maintenance_logs (request_id, user_id, action, notes, timestamp)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(entry.user_id)
        .bind(&entry.action)
        .bind(&entry.notes)
        .bind(entry.timestamp)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    /// Most recent entries of a request, newest first
    pub async fn recent_for_request(&self, request_id: i32, limit: i64) -> AppResult<Vec<LogEntryView>> {
        let query = format!(
            r#"
            SELECT l.id, l.request_id, l.user_id, {} AS user_name,
                   l.action, l.notes, l.timestamp
            FROM maintenance_logs l
            LEFT JOIN users u ON u.id = l.user_id
            WHERE l.request_id = $1
            ORDER BY l.timestamp DESC, l.id DESC
            LIMIT $2
            "#,
            display_name_sql("u")
        );
        let rows = sqlx::query_as::<_, LogEntryView>(&query)
            .bind(request_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
