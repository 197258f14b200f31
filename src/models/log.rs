//! Audit log entries of maintenance requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Immutable, append-only audit record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MaintenanceLog {
    pub id: i32,
    pub request_id: i32,
    pub user_id: Option<i32>,
    pub action: String,
    pub notes: String,
    pub timestamp: DateTime<Utc>,
}

/// Log entry joined with the author's display name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LogEntryView {
    pub id: i32,
    pub request_id: i32,
    pub user_id: Option<i32>,
    pub user_name: Option<String>,
    pub action: String,
    pub notes: String,
    pub timestamp: DateTime<Utc>,
}

/// Log entry to append; the request id is bound when the entry is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLogEntry {
    pub user_id: Option<i32>,
    pub action: String,
    pub notes: String,
    pub timestamp: DateTime<Utc>,
}
