//! Maintenance teams repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        team::{CreateTeam, MaintenanceTeam, TeamMember, TeamMemberView, TeamSummary},
        user::display_name_sql,
    },
};

#[derive(Clone)]
pub struct TeamsRepository {
    pool: Pool<Postgres>,
}

impl TeamsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Teams with member and request counters, ordered by name
    pub async fn list_summaries(&self) -> AppResult<Vec<TeamSummary>> {
        let rows = sqlx::query_as::<_, TeamSummary>(
            r#"
            SELECT t.id, t.name, t.description,
                   (SELECT COUNT(*) FROM team_members m WHERE m.team_id = t.id) AS member_count,
                   (SELECT COUNT(*) FROM maintenance_requests r WHERE r.maintenance_team_id = t.id) AS request_count,
                   (SELECT COUNT(*) FROM maintenance_requests r
                     WHERE r.maintenance_team_id = t.id AND r.stage IN ('new', 'in_progress')) AS open_request_count
            FROM maintenance_teams t
            ORDER BY t.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get team by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<MaintenanceTeam> {
        sqlx::query_as::<_, MaintenanceTeam>("SELECT * FROM maintenance_teams WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Team {} not found", id)))
    }

    /// Create a team
    pub async fn create(&self, data: &CreateTeam) -> AppResult<MaintenanceTeam> {
        sqlx::query_as::<_, MaintenanceTeam>(
            r#"
            INSERT INTO maintenance_teams (name, description)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_constraint(e, format!("Team '{}' already exists", data.name)))
    }

    /// Add a user to a team
    pub async fn add_member(&self, team_id: i32, user_id: i32, is_lead: bool) -> AppResult<TeamMember> {
        sqlx::query_as::<_, TeamMember>(
            r#"
            INSERT INTO team_members (team_id, user_id, is_lead)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .bind(is_lead)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_constraint(e, format!("User {} is already a member of team {}", user_id, team_id)))
    }

    /// Members of the given teams, lead first then by first name
    pub async fn members(&self, team_ids: &[i32]) -> AppResult<Vec<TeamMemberView>> {
        let query = format!(
            r#"
            SELECT m.id, m.user_id, m.team_id, m.is_lead, m.joined_date,
                   u.username, {} AS display_name
            FROM team_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.team_id = ANY($1)
            ORDER BY m.is_lead DESC, u.first_name
            "#,
            display_name_sql("u")
        );
        let rows = sqlx::query_as::<_, TeamMemberView>(&query)
            .bind(team_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// First team membership of a user, if any
    pub async fn first_membership(&self, user_id: i32) -> AppResult<Option<TeamMember>> {
        let row = sqlx::query_as::<_, TeamMember>(
            "SELECT * FROM team_members WHERE user_id = $1 ORDER BY id LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM maintenance_teams")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
