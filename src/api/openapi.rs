//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{equipment, health, reports, requests, teams};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "GearGuard API",
        version = "0.1.0",
        description = "Maintenance management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Reports
        reports::dashboard,
        reports::reporting,
        reports::calendar,
        reports::kanban,
        // Teams
        teams::list_teams,
        teams::get_team,
        teams::create_team,
        teams::add_member,
        teams::list_technicians,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::get_equipment_autofill,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        // Requests
        requests::list_requests,
        requests::prefill_request,
        requests::get_request,
        requests::create_request,
        requests::update_request,
        requests::change_stage,
    ),
    components(
        schemas(
            // Enums
            crate::models::Stage,
            crate::models::RequestType,
            crate::models::Priority,
            crate::models::EquipmentCategory,
            crate::models::Department,
            crate::models::HealthStatus,
            // Teams
            crate::models::team::MaintenanceTeam,
            crate::models::team::TeamMember,
            crate::models::team::TeamMemberView,
            crate::models::team::TeamSummary,
            crate::models::team::TeamDetail,
            crate::models::team::CreateTeam,
            crate::models::team::AddTeamMember,
            crate::models::user::UserShort,
            teams::TeamsResponse,
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            crate::models::equipment::EquipmentDetail,
            crate::models::equipment::EquipmentAutofill,
            equipment::EquipmentAutofillResponse,
            // Requests
            crate::models::request::MaintenanceRequest,
            crate::models::request::RequestSummary,
            crate::models::request::RequestDetail,
            crate::models::request::CreateRequest,
            crate::models::request::UpdateRequest,
            crate::models::request::ChangeStageRequest,
            crate::models::request::StageChangeResponse,
            crate::models::request::RequestPrefill,
            crate::models::log::LogEntryView,
            // Reports
            crate::models::report::Dashboard,
            crate::models::report::CriticalEquipment,
            crate::models::report::TechnicianStats,
            crate::models::report::Reporting,
            crate::models::report::TeamReport,
            crate::models::report::CategoryCount,
            crate::models::report::PriorityCount,
            crate::models::report::MonthCount,
            crate::models::report::CalendarEvent,
            crate::models::report::CalendarEventProps,
            crate::models::report::KanbanBoard,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "reports", description = "Dashboard, reporting, calendar and kanban"),
        (name = "teams", description = "Maintenance teams and technicians"),
        (name = "equipment", description = "Equipment management"),
        (name = "requests", description = "Maintenance request lifecycle")
    )
)]
pub struct ApiDoc;

/// Registers the bearer JWT scheme referenced by secured paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
