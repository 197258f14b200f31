//! Data models for GearGuard

pub mod enums;
pub mod equipment;
pub mod log;
pub mod report;
pub mod request;
pub mod team;
pub mod user;

// Re-export commonly used types
pub use enums::{Department, EquipmentCategory, HealthStatus, Priority, RequestType, Stage};
pub use equipment::Equipment;
pub use log::{MaintenanceLog, NewLogEntry};
pub use request::{MaintenanceRequest, RequestSummary};
pub use team::{MaintenanceTeam, TeamMember};
pub use user::{Actor, UserShort};
