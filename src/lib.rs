//! GearGuard maintenance management server
//!
//! REST JSON API tracking equipment, maintenance teams and the lifecycle of
//! maintenance requests, with dashboards, a kanban board and a calendar feed.

use std::sync::Arc;

use sqlx::{Pool, Postgres};

pub mod api;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub pool: Pool<Postgres>,
}

impl AppState {
    /// Wire repositories and services over a pool
    pub fn new(config: AppConfig, pool: Pool<Postgres>, clock: Arc<dyn lifecycle::Clock>) -> Self {
        let repository = repository::Repository::new(pool.clone());
        Self {
            config: Arc::new(config),
            services: Arc::new(services::Services::new(repository, clock)),
            pool,
        }
    }
}
