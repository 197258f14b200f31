//! Equipment service

use std::sync::Arc;

use chrono::Duration;
use validator::Validate;

use crate::{
    error::AppResult,
    lifecycle::Clock,
    models::{
        equipment::{CreateEquipment, Equipment, EquipmentAutofill, EquipmentDetail, EquipmentQuery, UpdateEquipment},
        HealthStatus,
    },
    repository::Repository,
};

/// Trailing window used to classify equipment health
pub const HEALTH_WINDOW_DAYS: i64 = 30;

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl EquipmentService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn list(&self, query: &EquipmentQuery) -> AppResult<Vec<Equipment>> {
        self.repository.equipment.list(query).await
    }

    /// Equipment with its request history, open request count and health
    pub async fn get_detail(&self, id: i32) -> AppResult<EquipmentDetail> {
        let equipment = self.repository.equipment.get_by_id(id).await?;
        let today = self.clock.today();
        let maintenance_requests = self
            .repository
            .requests
            .for_equipment(id)
            .await?
            .into_iter()
            .map(|r| r.with_overdue(today))
            .collect();
        let open_requests_count = self.repository.equipment.count_open_requests(id).await?;
        let health_status = self.health(id).await?;

        Ok(EquipmentDetail {
            equipment,
            maintenance_requests,
            open_requests_count,
            health_status,
        })
    }

    pub async fn health(&self, id: i32) -> AppResult<HealthStatus> {
        let since = self.clock.now() - Duration::days(HEALTH_WINDOW_DAYS);
        let recent = self.repository.equipment.count_requests_since(id, since).await?;
        Ok(HealthStatus::from_recent_requests(recent))
    }

    /// Values a request form copies from the equipment
    pub async fn autofill(&self, id: i32) -> AppResult<EquipmentAutofill> {
        self.repository.equipment.autofill(id).await
    }

    /// An explicit team must exist
    async fn ensure_team(&self, team: Option<i32>) -> AppResult<()> {
        if let Some(team_id) = team {
            self.repository.teams.get_by_id(team_id).await?;
        }
        Ok(())
    }

    pub async fn create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        data.validate()?;
        self.ensure_team(data.maintenance_team_id).await?;
        let equipment = self.repository.equipment.create(data).await?;
        tracing::info!(equipment_id = equipment.id, serial = %equipment.serial_number, "Equipment created");
        Ok(equipment)
    }

    pub async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        data.validate()?;
        self.ensure_team(data.maintenance_team_id.flatten()).await?;
        self.repository.equipment.update(id, data, self.clock.now()).await
    }

    /// Delete equipment with its requests and their logs
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.equipment.delete(id).await?;
        tracing::info!(equipment_id = id, "Equipment deleted");
        Ok(())
    }
}
