//! Business logic services

pub mod equipment;
pub mod reports;
pub mod requests;
pub mod teams;

use std::sync::Arc;

use crate::{
    lifecycle::{Clock, Lifecycle, TransitionTable},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub teams: teams::TeamsService,
    pub equipment: equipment::EquipmentService,
    pub requests: requests::RequestsService,
    pub reports: reports::ReportsService,
}

impl Services {
    /// Create all services sharing one repository and one clock
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        let lifecycle = Lifecycle::new(clock.clone(), TransitionTable::default());
        Self {
            teams: teams::TeamsService::new(repository.clone()),
            equipment: equipment::EquipmentService::new(repository.clone(), clock.clone()),
            requests: requests::RequestsService::new(Arc::new(repository.clone()), lifecycle),
            reports: reports::ReportsService::new(repository, clock),
        }
    }
}
