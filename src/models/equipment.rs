//! Equipment model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{Department, EquipmentCategory, HealthStatus};
use super::request::RequestSummary;

/// Asset or machine that needs maintenance
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: i32,
    pub name: String,
    /// Unique serial number
    pub serial_number: String,
    pub category: EquipmentCategory,
    pub department: Department,
    /// Employee the equipment is assigned to
    pub assigned_employee_id: Option<i32>,
    /// Team responsible for maintenance
    pub maintenance_team_id: Option<i32>,
    pub default_technician_id: Option<i32>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiry: Option<NaiveDate>,
    pub location: String,
    /// Set once by a scrap transition, never reset
    pub is_scrapped: bool,
    pub scrapped_date: Option<DateTime<Utc>>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "Serial number must be 1-100 characters"))]
    pub serial_number: String,
    pub category: EquipmentCategory,
    pub department: Department,
    #[validate(length(min = 1, max = 200, message = "Location must be 1-200 characters"))]
    pub location: String,
    pub maintenance_team_id: Option<i32>,
    pub assigned_employee_id: Option<i32>,
    pub default_technician_id: Option<i32>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiry: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

/// Update equipment request. Absent fields are kept, `null` clears a nullable field.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipment {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Serial number must be 1-100 characters"))]
    pub serial_number: Option<String>,
    pub category: Option<EquipmentCategory>,
    pub department: Option<Department>,
    #[validate(length(min = 1, max = 200, message = "Location must be 1-200 characters"))]
    pub location: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub maintenance_team_id: Option<Option<i32>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub assigned_employee_id: Option<Option<i32>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub default_technician_id: Option<Option<i32>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub purchase_date: Option<Option<NaiveDate>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub warranty_expiry: Option<Option<NaiveDate>>,
    pub notes: Option<String>,
}

/// Equipment list filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct EquipmentQuery {
    pub category: Option<EquipmentCategory>,
    pub department: Option<Department>,
    /// Maintenance team ID
    pub team: Option<i32>,
    /// Case-insensitive match on name, serial number or location
    pub search: Option<String>,
}

/// Equipment with its maintenance history
#[derive(Debug, Serialize, ToSchema)]
pub struct EquipmentDetail {
    pub equipment: Equipment,
    pub maintenance_requests: Vec<RequestSummary>,
    /// Requests not yet repaired or scrapped
    pub open_requests_count: i64,
    pub health_status: HealthStatus,
}

/// Values used to pre-fill a request form for a piece of equipment
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EquipmentAutofill {
    pub maintenance_team: Option<i32>,
    pub maintenance_team_name: String,
    pub default_technician: Option<i32>,
    pub category: EquipmentCategory,
    pub department: Department,
}
