//! Maintenance requests repository

use chrono::NaiveDate;
use sqlx::{Pool, Postgres, Transaction};

use super::{logs::LogsRepository, priority_rank_sql};
use crate::{
    error::{AppError, AppResult},
    lifecycle::{EquipmentScrap, Outcome},
    models::{
        request::{MaintenanceRequest, RequestQuery, RequestSummary},
        user::display_name_sql,
        RequestType, Stage,
    },
};

/// Columns and joins shared by every summary query
fn summary_select() -> String {
    format!(
        r#"
        SELECT r.id, r.subject, r.request_type, r.priority, r.stage, r.equipment_id,
               e.name AS equipment_name, r.maintenance_team_id, t.name AS team_name,
               r.assigned_to_id, {} AS assigned_to_name,
               r.scheduled_date, r.completed_date, r.created_at, r.updated_at
        FROM maintenance_requests r
        JOIN equipment e ON e.id = r.equipment_id
        LEFT JOIN maintenance_teams t ON t.id = r.maintenance_team_id
        LEFT JOIN users u ON u.id = r.assigned_to_id
        "#,
        display_name_sql("u")
    )
}

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get request by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<MaintenanceRequest> {
        sqlx::query_as::<_, MaintenanceRequest>("SELECT * FROM maintenance_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Maintenance request {} not found", id)))
    }

    /// List requests with optional filters, newest first
    pub async fn list(&self, query: &RequestQuery) -> AppResult<Vec<RequestSummary>> {
        let mut conditions = Vec::new();
        let mut idx = 1;

        if query.stage.is_some() {
            conditions.push(format!("r.stage = ${}", idx));
            idx += 1;
        }
        if query.team.is_some() {
            conditions.push(format!("r.maintenance_team_id = ${}", idx));
            idx += 1;
        }
        if query.equipment.is_some() {
            conditions.push(format!("r.equipment_id = ${}", idx));
            idx += 1;
        }
        if query.start_date.is_some() {
            conditions.push(format!("r.scheduled_date >= ${}", idx));
            idx += 1;
        }
        if query.end_date.is_some() {
            conditions.push(format!("r.scheduled_date <= ${}", idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let select_q = format!("{} {} ORDER BY r.created_at DESC", summary_select(), where_clause);
        let mut builder = sqlx::query_as::<_, RequestSummary>(&select_q);
        if let Some(stage) = query.stage { builder = builder.bind(stage); }
        if let Some(team) = query.team { builder = builder.bind(team); }
        if let Some(equipment) = query.equipment { builder = builder.bind(equipment); }
        if let Some(start) = query.start_date { builder = builder.bind(start); }
        if let Some(end) = query.end_date { builder = builder.bind(end); }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Most recently created requests
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<RequestSummary>> {
        let select_q = format!("{} ORDER BY r.created_at DESC LIMIT $1", summary_select());
        let rows = sqlx::query_as::<_, RequestSummary>(&select_q)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Request history of one equipment, newest first
    pub async fn for_equipment(&self, equipment_id: i32) -> AppResult<Vec<RequestSummary>> {
        let select_q = format!("{} WHERE r.equipment_id = $1 ORDER BY r.created_at DESC", summary_select());
        let rows = sqlx::query_as::<_, RequestSummary>(&select_q)
            .bind(equipment_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// One kanban column. Open stages are ordered by priority then age;
    /// repaired keeps the 20 latest completions, scrap the 10 latest updates.
    pub async fn kanban_column(&self, stage: Stage, team: Option<i32>) -> AppResult<Vec<RequestSummary>> {
        let order = match stage {
            Stage::New | Stage::InProgress => format!(
                "ORDER BY {} DESC, r.created_at DESC",
                priority_rank_sql("r.priority")
            ),
            Stage::Repaired => "ORDER BY r.completed_date DESC NULLS LAST LIMIT 20".to_string(),
            Stage::Scrap => "ORDER BY r.updated_at DESC LIMIT 10".to_string(),
        };
        let team_filter = if team.is_some() { "AND r.maintenance_team_id = $2" } else { "" };
        let select_q = format!("{} WHERE r.stage = $1 {} {}", summary_select(), team_filter, order);

        let mut builder = sqlx::query_as::<_, RequestSummary>(&select_q).bind(stage);
        if let Some(team) = team {
            builder = builder.bind(team);
        }
        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Preventive requests with a scheduled date, optionally within an inclusive range
    pub async fn scheduled_preventive(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> AppResult<Vec<RequestSummary>> {
        let range = if start.is_some() && end.is_some() {
            "AND r.scheduled_date BETWEEN $2 AND $3"
        } else {
            ""
        };
        let select_q = format!(
            "{} WHERE r.request_type = $1 AND r.scheduled_date IS NOT NULL {} ORDER BY r.scheduled_date",
            summary_select(),
            range
        );
        let mut builder = sqlx::query_as::<_, RequestSummary>(&select_q).bind(RequestType::Preventive);
        if let (Some(start), Some(end)) = (start, end) {
            builder = builder.bind(start).bind(end);
        }
        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Insert a newly created request together with its dependent writes
    pub async fn insert(&self, outcome: &Outcome) -> AppResult<MaintenanceRequest> {
        let mut tx = self.pool.begin().await?;
        let r = &outcome.request;

        let saved = sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            INSERT INTO maintenance_requests (
                subject, description, request_type, priority, stage, equipment_id,
                maintenance_team_id, assigned_to_id, created_by_id, scheduled_date,
                completed_date, duration_hours, notes, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(&r.subject)
        .bind(&r.description)
        .bind(r.request_type)
        .bind(r.priority)
        .bind(r.stage)
        .bind(r.equipment_id)
        .bind(r.maintenance_team_id)
        .bind(r.assigned_to_id)
        .bind(r.created_by_id)
        .bind(r.scheduled_date)
        .bind(r.completed_date)
        .bind(r.duration_hours)
        .bind(&r.notes)
        .bind(r.created_at)
        .bind(r.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_constraint(e, "Maintenance request already exists"))?;

        write_dependents(&mut tx, saved.id, outcome).await?;
        tx.commit().await?;
        Ok(saved)
    }

    /// Write an updated request, the equipment scrap and the log entry atomically
    pub async fn commit(&self, outcome: &Outcome) -> AppResult<MaintenanceRequest> {
        let mut tx = self.pool.begin().await?;
        let r = &outcome.request;

        let saved = sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            UPDATE maintenance_requests SET
                subject = $2, description = $3, request_type = $4, priority = $5,
                stage = $6, equipment_id = $7, maintenance_team_id = $8,
                assigned_to_id = $9, scheduled_date = $10, completed_date = $11,
                duration_hours = $12, notes = $13, updated_at = $14
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(r.id)
        .bind(&r.subject)
        .bind(&r.description)
        .bind(r.request_type)
        .bind(r.priority)
        .bind(r.stage)
        .bind(r.equipment_id)
        .bind(r.maintenance_team_id)
        .bind(r.assigned_to_id)
        .bind(r.scheduled_date)
        .bind(r.completed_date)
        .bind(r.duration_hours)
        .bind(&r.notes)
        .bind(r.updated_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::from_constraint(e, "Maintenance request already exists"))?
        .ok_or_else(|| AppError::NotFound(format!("Maintenance request {} not found", r.id)))?;

        write_dependents(&mut tx, saved.id, outcome).await?;
        tx.commit().await?;
        Ok(saved)
    }
}

async fn write_dependents(
    tx: &mut Transaction<'_, Postgres>,
    request_id: i32,
    outcome: &Outcome,
) -> AppResult<()> {
    if let Some(scrap) = outcome.equipment_scrap {
        scrap_equipment(tx, scrap).await?;
    }
    if let Some(ref entry) = outcome.log {
        LogsRepository::append(&mut **tx, request_id, entry).await?;
    }
    Ok(())
}

/// Never overwrites an existing scrap date
async fn scrap_equipment(tx: &mut Transaction<'_, Postgres>, scrap: EquipmentScrap) -> AppResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE equipment
        SET is_scrapped = TRUE, scrapped_date = $2, updated_at = $2
        WHERE id = $1 AND is_scrapped = FALSE
        "#,
    )
    .bind(scrap.equipment_id)
    .bind(scrap.scrapped_date)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() > 0 {
        tracing::warn!(equipment_id = scrap.equipment_id, "Equipment marked as scrapped");
    }
    Ok(())
}
