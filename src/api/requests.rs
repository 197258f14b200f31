//! Maintenance request endpoints

use axum::{
    async_trait,
    extract::{FromRequest, Path, Query, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    Form, Json,
};

use crate::{
    error::{AppError, AppResult},
    models::request::{
        ChangeStageRequest, CreateRequest, MaintenanceRequest, RequestDetail, RequestPrefill,
        RequestPrefillQuery, RequestQuery, RequestSummary, StageChangeResponse, UpdateRequest,
    },
};

use super::AuthenticatedUser;

/// List requests
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(RequestQuery),
    responses(
        (status = 200, description = "Requests, newest first", body = Vec<RequestSummary>)
    )
)]
pub async fn list_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<RequestQuery>,
) -> AppResult<Json<Vec<RequestSummary>>> {
    let requests = state.services.requests.list(&query).await?;
    Ok(Json(requests))
}

/// Initial values for a new request form
#[utoipa::path(
    get,
    path = "/requests/new",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(RequestPrefillQuery),
    responses(
        (status = 200, description = "Pre-filled draft", body = RequestPrefill)
    )
)]
pub async fn prefill_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<RequestPrefillQuery>,
) -> AppResult<Json<RequestPrefill>> {
    let prefill = state.services.requests.prefill(&query).await?;
    Ok(Json(prefill))
}

/// Get a request with its latest log entries
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request details", body = RequestDetail),
        (status = 404, description = "Request not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<RequestDetail>> {
    let detail = state.services.requests.get_detail(id).await?;
    Ok(Json(detail))
}

/// Create a request
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    request_body = CreateRequest,
    responses(
        (status = 201, description = "Request created", body = MaintenanceRequest),
        (status = 400, description = "Invalid data", body = crate::error::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateRequest>,
) -> AppResult<(StatusCode, Json<MaintenanceRequest>)> {
    let request = state.services.requests.create(&data, &claims.actor()).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Update a request
#[utoipa::path(
    put,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    request_body = UpdateRequest,
    responses(
        (status = 200, description = "Request updated", body = MaintenanceRequest),
        (status = 404, description = "Request not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Transition not allowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateRequest>,
) -> AppResult<Json<MaintenanceRequest>> {
    let request = state.services.requests.update(id, &data, &claims.actor()).await?;
    Ok(Json(request))
}

/// Stage change body, accepted as JSON or as a urlencoded form.
/// A missing or unreadable body carries no stage.
pub struct StageBody(pub Option<ChangeStageRequest>);

#[async_trait]
impl<S: Send + Sync> FromRequest<S> for StageBody {
    type Rejection = std::convert::Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"));

        let data = if is_form {
            Form::<ChangeStageRequest>::from_request(req, state).await.ok().map(|Form(d)| d)
        } else {
            Json::<ChangeStageRequest>::from_request(req, state).await.ok().map(|Json(d)| d)
        };
        Ok(Self(data))
    }
}

/// Move a request to another stage (kanban drag and drop)
#[utoipa::path(
    post,
    path = "/requests/{id}/stage",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    request_body = ChangeStageRequest,
    responses(
        (status = 200, description = "Stage updated", body = StageChangeResponse),
        (status = 400, description = "Invalid stage", body = StageChangeResponse),
        (status = 404, description = "Request not found", body = crate::error::ErrorResponse),
        (status = 405, description = "Invalid method", body = StageChangeResponse)
    )
)]
pub async fn change_stage(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    StageBody(body): StageBody,
) -> AppResult<(StatusCode, Json<StageChangeResponse>)> {
    let stage = body.and_then(|data| data.stage);
    match state.services.requests.change_stage(id, stage.as_deref(), &claims.actor()).await {
        Ok(stage) => Ok((StatusCode::OK, Json(StageChangeResponse::success(stage)))),
        Err(AppError::InvalidStage(message)) => {
            tracing::debug!(request_id = id, ?stage, "Rejected stage change");
            Ok((StatusCode::BAD_REQUEST, Json(StageChangeResponse::error(message))))
        }
        Err(e) => Err(e),
    }
}

/// Any method other than POST on the stage endpoint
pub async fn stage_method_not_allowed() -> (StatusCode, Json<StageChangeResponse>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(StageChangeResponse::error("Invalid method")),
    )
}
