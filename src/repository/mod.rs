//! Repository layer for database operations

pub mod equipment;
pub mod logs;
pub mod reports;
pub mod requests;
pub mod teams;
pub mod users;

use sqlx::{Pool, Postgres};

/// Per-entity repositories sharing one connection pool
#[derive(Clone)]
pub struct Repository {
    pub teams: teams::TeamsRepository,
    pub users: users::UsersRepository,
    pub equipment: equipment::EquipmentRepository,
    pub requests: requests::RequestsRepository,
    pub logs: logs::LogsRepository,
    pub reports: reports::ReportsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            teams: teams::TeamsRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            equipment: equipment::EquipmentRepository::new(pool.clone()),
            requests: requests::RequestsRepository::new(pool.clone()),
            logs: logs::LogsRepository::new(pool.clone()),
            reports: reports::ReportsRepository::new(pool),
        }
    }
}

/// `CASE` expression ranking `priority` so that `DESC` puts critical first
pub(crate) fn priority_rank_sql(column: &str) -> String {
    use crate::models::Priority;

    let arms: Vec<String> = Priority::ALL
        .iter()
        .map(|p| format!("WHEN '{}' THEN {}", p.as_str(), p.rank()))
        .collect();
    format!("CASE {} {} ELSE 0 END", column, arms.join(" "))
}
