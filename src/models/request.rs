//! Maintenance request model and related types

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{Priority, RequestType, Stage};
use super::log::LogEntryView;

/// Maintenance work request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MaintenanceRequest {
    pub id: i32,
    pub subject: String,
    pub description: String,
    pub request_type: RequestType,
    pub priority: Priority,
    pub stage: Stage,
    pub equipment_id: i32,
    /// Defaults to the equipment's team when unset at save time
    pub maintenance_team_id: Option<i32>,
    pub assigned_to_id: Option<i32>,
    pub created_by_id: Option<i32>,
    pub scheduled_date: Option<NaiveDate>,
    /// Set the first time the request reaches `repaired`
    pub completed_date: Option<DateTime<Utc>>,
    /// Hours spent on repair
    #[schema(value_type = Option<String>)]
    pub duration_hours: Option<Decimal>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MaintenanceRequest {
    /// Overdue when still open and scheduled strictly before `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        is_overdue(self.stage, self.scheduled_date, today)
    }
}

/// Shared overdue rule: terminal stages are never overdue
pub fn is_overdue(stage: Stage, scheduled_date: Option<NaiveDate>, today: NaiveDate) -> bool {
    if stage.is_terminal() {
        return false;
    }
    matches!(scheduled_date, Some(date) if date < today)
}

/// Request joined with equipment, team and assignee names for lists and boards
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RequestSummary {
    pub id: i32,
    pub subject: String,
    pub request_type: RequestType,
    pub priority: Priority,
    pub stage: Stage,
    pub equipment_id: i32,
    pub equipment_name: String,
    pub maintenance_team_id: Option<i32>,
    pub team_name: Option<String>,
    pub assigned_to_id: Option<i32>,
    pub assigned_to_name: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub completed_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub is_overdue: bool,
}

impl RequestSummary {
    pub fn with_overdue(mut self, today: NaiveDate) -> Self {
        self.is_overdue = is_overdue(self.stage, self.scheduled_date, today);
        self
    }
}

/// Request with its most recent log entries
#[derive(Debug, Serialize, ToSchema)]
pub struct RequestDetail {
    pub request: MaintenanceRequest,
    pub is_overdue: bool,
    pub logs: Vec<LogEntryView>,
}

/// Create request draft
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateRequest {
    pub equipment_id: i32,
    #[serde(default)]
    pub request_type: RequestType,
    #[validate(length(min = 1, max = 300, message = "Subject must be 1-300 characters"))]
    pub subject: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    pub maintenance_team_id: Option<i32>,
    pub assigned_to_id: Option<i32>,
    pub scheduled_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub duration_hours: Option<Decimal>,
    #[serde(default)]
    pub notes: String,
}

/// Update request. Absent fields are kept, `null` clears a nullable field.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateRequest {
    pub equipment_id: Option<i32>,
    pub request_type: Option<RequestType>,
    #[validate(length(min = 1, max = 300, message = "Subject must be 1-300 characters"))]
    pub subject: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub stage: Option<Stage>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub maintenance_team_id: Option<Option<i32>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub assigned_to_id: Option<Option<i32>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub scheduled_date: Option<Option<NaiveDate>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub duration_hours: Option<Option<Decimal>>,
    pub notes: Option<String>,
}

/// Drag-and-drop stage change body. The stage is kept as a raw string so an
/// unknown value reaches the lifecycle check instead of failing deserialization.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeStageRequest {
    #[serde(default)]
    pub stage: Option<String>,
}

/// Result object of the stage-change endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StageChangeResponse {
    /// "success" or "error"
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_stage: Option<Stage>,
}

impl StageChangeResponse {
    pub fn success(stage: Stage) -> Self {
        Self {
            status: "success".to_string(),
            message: "Stage updated".to_string(),
            new_stage: Some(stage),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            new_stage: None,
        }
    }
}

/// Request list filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct RequestQuery {
    pub stage: Option<Stage>,
    /// Maintenance team ID
    pub team: Option<i32>,
    pub equipment: Option<i32>,
    /// Scheduled on or after (YYYY-MM-DD)
    pub start_date: Option<NaiveDate>,
    /// Scheduled on or before (YYYY-MM-DD)
    pub end_date: Option<NaiveDate>,
}

/// Query values used to pre-fill a new request form
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct RequestPrefillQuery {
    pub equipment: Option<i32>,
    pub scheduled_date: Option<NaiveDate>,
}

/// Initial values of a new request form
#[derive(Debug, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct RequestPrefill {
    pub stage: Stage,
    pub equipment_id: Option<i32>,
    pub maintenance_team_id: Option<i32>,
    pub scheduled_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_overdue_open_stages() {
        let today = date(2026, 3, 10);
        assert!(is_overdue(Stage::New, Some(date(2026, 3, 9)), today));
        assert!(is_overdue(Stage::InProgress, Some(date(2025, 1, 1)), today));
        assert!(!is_overdue(Stage::New, Some(today), today));
        assert!(!is_overdue(Stage::New, Some(date(2026, 3, 11)), today));
        assert!(!is_overdue(Stage::New, None, today));
    }

    #[test]
    fn test_terminal_stages_never_overdue() {
        let today = date(2026, 3, 10);
        assert!(!is_overdue(Stage::Repaired, Some(date(2020, 1, 1)), today));
        assert!(!is_overdue(Stage::Scrap, Some(date(2020, 1, 1)), today));
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let update: UpdateRequest = serde_json::from_str(r#"{"assigned_to_id": null}"#).unwrap();
        assert_eq!(update.assigned_to_id, Some(None));
        assert_eq!(update.maintenance_team_id, None);

        let update: UpdateRequest = serde_json::from_str(r#"{"assigned_to_id": 4, "stage": "repaired"}"#).unwrap();
        assert_eq!(update.assigned_to_id, Some(Some(4)));
        assert_eq!(update.stage, Some(Stage::Repaired));
    }

    #[test]
    fn test_create_defaults() {
        let draft: CreateRequest = serde_json::from_str(r#"{"equipment_id": 1, "subject": "Leak"}"#).unwrap();
        assert_eq!(draft.request_type, RequestType::Corrective);
        assert_eq!(draft.priority, Priority::Medium);
        assert!(draft.maintenance_team_id.is_none());
    }

    #[test]
    fn test_stage_change_response_shape() {
        let ok = serde_json::to_value(StageChangeResponse::success(Stage::InProgress)).unwrap();
        assert_eq!(ok["status"], "success");
        assert_eq!(ok["new_stage"], "in_progress");

        let err = serde_json::to_value(StageChangeResponse::error("Invalid stage")).unwrap();
        assert_eq!(err["status"], "error");
        assert!(err.get("new_stage").is_none());
    }
}
