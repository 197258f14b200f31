//! Aggregation queries behind the dashboard and reporting views

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        report::{Breakdowns, CriticalEquipment, TeamReport},
        EquipmentCategory, Priority,
    },
};

#[derive(Clone)]
pub struct ReportsRepository {
    pool: Pool<Postgres>,
}

impl ReportsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Non-scrapped equipment with at least `min_requests` requests since `since`
    pub async fn critical_equipment(
        &self,
        since: DateTime<Utc>,
        min_requests: i64,
        limit: i64,
    ) -> AppResult<Vec<CriticalEquipment>> {
        let rows = sqlx::query_as::<_, CriticalEquipment>(
            r#"
            SELECT e.id, e.name, e.serial_number, e.category, e.location,
                   COUNT(r.id) AS request_count
            FROM equipment e
            JOIN maintenance_requests r ON r.equipment_id = e.id AND r.created_at >= $1
            WHERE e.is_scrapped = FALSE
            GROUP BY e.id
            HAVING COUNT(r.id) >= $2
            ORDER BY request_count DESC, e.name
            LIMIT $3
            "#,
        )
        .bind(since)
        .bind(min_requests)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count_pending(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM maintenance_requests WHERE stage = 'new'")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Open requests scheduled strictly before `today`
    pub async fn count_overdue(&self, today: NaiveDate) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM maintenance_requests
            WHERE stage NOT IN ('repaired', 'scrap') AND scheduled_date < $1
            "#,
        )
        .bind(today)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// (open assigned, all assigned) for a user
    pub async fn assignment_counts(&self, user_id: i32) -> AppResult<(i64, i64)> {
        let counts: (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FILTER (WHERE stage IN ('new', 'in_progress')),
                   COUNT(*)
            FROM maintenance_requests
            WHERE assigned_to_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }

    /// Request counters per team, busiest first
    pub async fn by_team(&self) -> AppResult<Vec<TeamReport>> {
        let rows = sqlx::query_as::<_, TeamReport>(
            r#"
            SELECT t.id, t.name,
                   COUNT(r.id) AS total_requests,
                   COUNT(r.id) FILTER (WHERE r.stage IN ('new', 'in_progress')) AS open_requests,
                   COUNT(r.id) FILTER (WHERE r.stage = 'repaired') AS completed_requests
            FROM maintenance_teams t
            LEFT JOIN maintenance_requests r ON r.maintenance_team_id = t.id
            GROUP BY t.id
            ORDER BY total_requests DESC, t.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Request counts per equipment category and per priority
    pub async fn breakdowns(&self) -> AppResult<Breakdowns> {
        let by_category = sqlx::query_as::<_, (EquipmentCategory, i64)>(
            r#"
            SELECT e.category, COUNT(*)
            FROM maintenance_requests r
            JOIN equipment e ON e.id = r.equipment_id
            GROUP BY e.category
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let by_priority = sqlx::query_as::<_, (Priority, i64)>(
            "SELECT priority, COUNT(*) FROM maintenance_requests GROUP BY priority",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(Breakdowns { by_category, by_priority })
    }

    /// Requests created within `[from, to)`
    pub async fn count_created_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM maintenance_requests WHERE created_at >= $1 AND created_at < $2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn count_active_equipment(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM equipment WHERE is_scrapped = FALSE")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_requests(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM maintenance_requests")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Requests neither repaired nor scrapped
    pub async fn count_open(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM maintenance_requests WHERE stage NOT IN ('repaired', 'scrap')",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
