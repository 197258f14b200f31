//! Maintenance teams and technicians endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        team::{AddTeamMember, CreateTeam, MaintenanceTeam, TeamDetail, TeamMember, TeamSummary},
        UserShort,
    },
};

use super::AuthenticatedUser;

/// Teams list response
#[derive(Serialize, ToSchema)]
pub struct TeamsResponse {
    pub teams: Vec<TeamSummary>,
}

/// List teams with counters and rosters
#[utoipa::path(
    get,
    path = "/teams",
    tag = "teams",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Teams", body = TeamsResponse)
    )
)]
pub async fn list_teams(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<TeamsResponse>> {
    let teams = state.services.teams.list().await?;
    Ok(Json(TeamsResponse { teams }))
}

/// Get a team with its members
#[utoipa::path(
    get,
    path = "/teams/{id}",
    tag = "teams",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Team details", body = TeamDetail),
        (status = 404, description = "Team not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_team(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<TeamDetail>> {
    let team = state.services.teams.get(id).await?;
    Ok(Json(team))
}

/// Create a team
#[utoipa::path(
    post,
    path = "/teams",
    tag = "teams",
    security(("bearer_auth" = [])),
    request_body = CreateTeam,
    responses(
        (status = 201, description = "Team created", body = MaintenanceTeam),
        (status = 409, description = "Name already used", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_team(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Json(data): Json<CreateTeam>,
) -> AppResult<(StatusCode, Json<MaintenanceTeam>)> {
    let team = state.services.teams.create(&data).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

/// Add a member to a team
#[utoipa::path(
    post,
    path = "/teams/{id}/members",
    tag = "teams",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Team ID")),
    request_body = AddTeamMember,
    responses(
        (status = 201, description = "Member added", body = TeamMember),
        (status = 404, description = "Team or user not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Already a member", body = crate::error::ErrorResponse)
    )
)]
pub async fn add_member(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<AddTeamMember>,
) -> AppResult<(StatusCode, Json<TeamMember>)> {
    let member = state.services.teams.add_member(id, &data).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// Users that can be assigned to requests
#[utoipa::path(
    get,
    path = "/technicians",
    tag = "teams",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Technicians", body = Vec<UserShort>)
    )
)]
pub async fn list_technicians(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<UserShort>>> {
    let technicians = state.services.teams.technicians().await?;
    Ok(Json(technicians))
}
