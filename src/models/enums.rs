//! Shared domain enums, stored as their snake_case slug in TEXT columns

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

/// Implements slug conversions and the SQLx TEXT mapping for a fieldless enum.
macro_rules! text_enum {
    ($ty:ident, $what:literal, { $($variant:ident => ($slug:literal, $label:literal)),+ $(,)? }) => {
        impl $ty {
            /// Every variant, in declaration order
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// Slug stored in the database and used on the wire
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $slug),+
                }
            }

            /// Human-readable label
            pub fn label(&self) -> &'static str {
                match self {
                    $($ty::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($slug => Ok($ty::$variant),)+
                    _ => Err(format!("Invalid {}: {}", $what, s)),
                }
            }
        }

        impl sqlx::Type<Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $ty {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s: String = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $ty {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Lifecycle stage of a maintenance request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    New,
    InProgress,
    Repaired,
    Scrap,
}

text_enum!(Stage, "stage", {
    New => ("new", "New"),
    InProgress => ("in_progress", "In Progress"),
    Repaired => ("repaired", "Repaired"),
    Scrap => ("scrap", "Scrap"),
});

impl Stage {
    /// Repaired and scrapped requests are closed
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Repaired | Stage::Scrap)
    }

    /// New or in progress
    pub fn is_open(&self) -> bool {
        !self.is_terminal()
    }
}

impl Default for Stage {
    fn default() -> Self {
        Stage::New
    }
}

// ---------------------------------------------------------------------------
// RequestType
// ---------------------------------------------------------------------------

/// Corrective (breakdown) or preventive (routine) maintenance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    Corrective,
    Preventive,
}

text_enum!(RequestType, "request type", {
    Corrective => ("corrective", "Corrective (Breakdown)"),
    Preventive => ("preventive", "Preventive (Routine)"),
});

impl Default for RequestType {
    fn default() -> Self {
        RequestType::Corrective
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Request priority, declared from lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

text_enum!(Priority, "priority", {
    Low => ("low", "Low"),
    Medium => ("medium", "Medium"),
    High => ("high", "High"),
    Critical => ("critical", "Critical"),
});

impl Priority {
    /// Numeric rank used for SQL ordering (critical = 4)
    pub fn rank(&self) -> i16 {
        *self as i16 + 1
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

// ---------------------------------------------------------------------------
// EquipmentCategory
// ---------------------------------------------------------------------------

/// Equipment category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentCategory {
    Computer,
    Printer,
    Vehicle,
    Machinery,
    Hvac,
    Electrical,
    Other,
}

text_enum!(EquipmentCategory, "equipment category", {
    Computer => ("computer", "Computer"),
    Printer => ("printer", "Printer"),
    Vehicle => ("vehicle", "Vehicle"),
    Machinery => ("machinery", "Machinery"),
    Hvac => ("hvac", "HVAC"),
    Electrical => ("electrical", "Electrical"),
    Other => ("other", "Other"),
});

// ---------------------------------------------------------------------------
// Department
// ---------------------------------------------------------------------------

/// Owning department of a piece of equipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    Production,
    It,
    Logistics,
    Administration,
    Maintenance,
    Hr,
}

text_enum!(Department, "department", {
    Production => ("production", "Production"),
    It => ("it", "IT"),
    Logistics => ("logistics", "Logistics"),
    Administration => ("administration", "Administration"),
    Maintenance => ("maintenance", "Maintenance"),
    Hr => ("hr", "Human Resources"),
});

// ---------------------------------------------------------------------------
// HealthStatus
// ---------------------------------------------------------------------------

/// Equipment risk derived from recent request volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Good,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Classify from the number of requests opened in the trailing 30 days
    pub fn from_recent_requests(count: i64) -> Self {
        if count >= 5 {
            HealthStatus::Critical
        } else if count >= 3 {
            HealthStatus::Warning
        } else {
            HealthStatus::Good
        }
    }
}
