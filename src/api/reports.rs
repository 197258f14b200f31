//! Dashboard, reporting, calendar and kanban endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::report::{CalendarEvent, CalendarQuery, Dashboard, KanbanBoard, KanbanQuery, Reporting},
};

use super::AuthenticatedUser;

/// Dashboard of the current user
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard", body = Dashboard)
    )
)]
pub async fn dashboard(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Dashboard>> {
    let dashboard = state.services.reports.dashboard(&claims.actor()).await?;
    Ok(Json(dashboard))
}

/// Request statistics per team, category, priority and month
#[utoipa::path(
    get,
    path = "/reporting",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Reporting aggregates", body = Reporting)
    )
)]
pub async fn reporting(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Reporting>> {
    let reporting = state.services.reports.reporting().await?;
    Ok(Json(reporting))
}

/// Preventive maintenance calendar
#[utoipa::path(
    get,
    path = "/calendar",
    tag = "reports",
    security(("bearer_auth" = [])),
    params(CalendarQuery),
    responses(
        (status = 200, description = "Calendar events", body = Vec<CalendarEvent>)
    )
)]
pub async fn calendar(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Json<Vec<CalendarEvent>>> {
    let events = state.services.reports.calendar(&query).await?;
    Ok(Json(events))
}

/// Kanban board, one column per stage
#[utoipa::path(
    get,
    path = "/kanban",
    tag = "reports",
    security(("bearer_auth" = [])),
    params(KanbanQuery),
    responses(
        (status = 200, description = "Kanban board", body = KanbanBoard)
    )
)]
pub async fn kanban(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<KanbanQuery>,
) -> AppResult<Json<KanbanBoard>> {
    let board = state.services.reports.kanban(&query, &claims.actor()).await?;
    Ok(Json(board))
}
