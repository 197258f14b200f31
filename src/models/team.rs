//! Maintenance teams and their rosters

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// A team responsible for maintenance work
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MaintenanceTeam {
    pub id: i32,
    /// Unique team name
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Team membership of a user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TeamMember {
    pub id: i32,
    pub user_id: i32,
    pub team_id: i32,
    pub is_lead: bool,
    pub joined_date: NaiveDate,
}

/// Membership joined with the member's name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TeamMemberView {
    pub id: i32,
    pub user_id: i32,
    pub team_id: i32,
    pub is_lead: bool,
    pub joined_date: NaiveDate,
    pub username: String,
    pub display_name: String,
}

/// Team with roster and request counters (teams list)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TeamSummary {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub member_count: i64,
    pub request_count: i64,
    /// Requests in new or in_progress
    pub open_request_count: i64,
    #[sqlx(skip)]
    pub members: Vec<TeamMemberView>,
}

/// Create team request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTeam {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Add member request
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddTeamMember {
    pub user_id: i32,
    #[serde(default)]
    pub is_lead: bool,
}

/// Team with its roster
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamDetail {
    pub team: MaintenanceTeam,
    pub members: Vec<TeamMemberView>,
}
