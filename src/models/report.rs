//! Read-only report, board and calendar views

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::enums::{EquipmentCategory, Priority, Stage};
use super::request::RequestSummary;

/// Equipment with many recent requests
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CriticalEquipment {
    pub id: i32,
    pub name: String,
    pub serial_number: String,
    pub category: EquipmentCategory,
    pub location: String,
    /// Requests created in the last 30 days
    pub request_count: i64,
}

/// Workload of the current technician
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TechnicianStats {
    /// Assigned requests still new or in progress
    pub assigned: i64,
    /// All requests ever assigned
    pub total: i64,
    /// Percentage of `assigned` over `total`, halves rounded to even
    pub utilization: i64,
}

impl TechnicianStats {
    /// None when nothing was ever assigned
    pub fn compute(assigned: i64, total: i64) -> Option<Self> {
        if total <= 0 {
            return None;
        }
        let utilization = ((assigned as f64 / total as f64) * 100.0).round_ties_even() as i64;
        Some(Self { assigned, total, utilization })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Dashboard {
    pub critical_equipment: Vec<CriticalEquipment>,
    /// Requests in stage new
    pub pending_requests: i64,
    pub overdue_requests: i64,
    pub technician_stats: Option<TechnicianStats>,
    pub recent_requests: Vec<RequestSummary>,
    pub equipment_count: i64,
    pub team_count: i64,
    pub today: NaiveDate,
}

/// Per-team request counters
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TeamReport {
    pub id: i32,
    pub name: String,
    pub total_requests: i64,
    pub open_requests: i64,
    pub completed_requests: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategoryCount {
    /// Category display name
    pub category: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PriorityCount {
    /// Priority display name
    pub priority: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MonthCount {
    /// e.g. "March 2026"
    pub month: String,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Reporting {
    pub requests_by_team: Vec<TeamReport>,
    pub requests_by_category: Vec<CategoryCount>,
    pub requests_by_priority: Vec<PriorityCount>,
    /// Oldest month first
    pub monthly_trend: Vec<MonthCount>,
    /// Non-scrapped equipment
    pub total_equipment: i64,
    pub total_requests: i64,
    pub open_requests: i64,
}

/// Raw per-category and per-priority counts as read from the database
#[derive(Debug, Clone, Default)]
pub struct Breakdowns {
    pub by_category: Vec<(EquipmentCategory, i64)>,
    pub by_priority: Vec<(Priority, i64)>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct CalendarQuery {
    /// First day of the range (YYYY-MM-DD)
    pub start: Option<NaiveDate>,
    /// Last day of the range, inclusive (YYYY-MM-DD)
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CalendarEventProps {
    pub stage: Stage,
    pub priority: Priority,
    /// Assignee display name or "Unassigned"
    pub assigned_to: String,
}

/// Calendar entry for a scheduled preventive request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CalendarEvent {
    pub id: i32,
    pub title: String,
    pub start: NaiveDate,
    pub background_color: String,
    pub border_color: String,
    pub url: String,
    pub extended_props: CalendarEventProps,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct KanbanQuery {
    /// Maintenance team ID; defaults to the caller's first team
    pub team: Option<i32>,
}

/// Requests grouped by stage, columns in stage order
#[derive(Debug, Serialize, ToSchema)]
pub struct KanbanBoard {
    #[schema(value_type = Object)]
    pub columns: IndexMap<Stage, Vec<RequestSummary>>,
    /// Team the board is filtered on, if any
    pub selected_team: Option<i32>,
}
