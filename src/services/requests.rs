//! Maintenance requests service
//!
//! Loads the state the lifecycle engine needs, lets it decide, then hands the
//! resulting [`Outcome`] to the store to be written in one transaction.

use std::sync::Arc;

use async_trait::async_trait;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    lifecycle::{AssigneeNames, Lifecycle, Outcome},
    models::{
        log::LogEntryView,
        request::{
            CreateRequest, RequestDetail, RequestPrefill, RequestPrefillQuery, RequestQuery,
            UpdateRequest,
        },
        Actor, Equipment, MaintenanceRequest, MaintenanceTeam, RequestSummary, Stage,
    },
    repository::Repository,
};

/// Log entries shown with a request
const DETAIL_LOG_LIMIT: i64 = 10;

/// Persistence needed by request operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn request(&self, id: i32) -> AppResult<MaintenanceRequest>;
    async fn equipment(&self, id: i32) -> AppResult<Equipment>;
    async fn find_equipment(&self, id: i32) -> AppResult<Option<Equipment>>;
    async fn team(&self, id: i32) -> AppResult<MaintenanceTeam>;
    /// Display name of a user, None when the user does not exist
    async fn user_name(&self, id: i32) -> AppResult<Option<String>>;
    async fn is_technician(&self, user_id: i32) -> AppResult<bool>;
    async fn list(&self, query: &RequestQuery) -> AppResult<Vec<RequestSummary>>;
    async fn recent_logs(&self, request_id: i32, limit: i64) -> AppResult<Vec<LogEntryView>>;
    /// Insert a created request with its dependent writes
    async fn insert(&self, outcome: &Outcome) -> AppResult<MaintenanceRequest>;
    /// Write an updated request with its dependent writes
    async fn commit(&self, outcome: &Outcome) -> AppResult<MaintenanceRequest>;
}

#[async_trait]
impl RequestStore for Repository {
    async fn request(&self, id: i32) -> AppResult<MaintenanceRequest> {
        self.requests.get_by_id(id).await
    }

    async fn equipment(&self, id: i32) -> AppResult<Equipment> {
        self.equipment.get_by_id(id).await
    }

    async fn find_equipment(&self, id: i32) -> AppResult<Option<Equipment>> {
        self.equipment.find(id).await
    }

    async fn team(&self, id: i32) -> AppResult<MaintenanceTeam> {
        self.teams.get_by_id(id).await
    }

    async fn user_name(&self, id: i32) -> AppResult<Option<String>> {
        Ok(self.users.find(id).await?.map(|u| u.display_name()))
    }

    async fn is_technician(&self, user_id: i32) -> AppResult<bool> {
        self.users.is_technician(user_id).await
    }

    async fn list(&self, query: &RequestQuery) -> AppResult<Vec<RequestSummary>> {
        self.requests.list(query).await
    }

    async fn recent_logs(&self, request_id: i32, limit: i64) -> AppResult<Vec<LogEntryView>> {
        self.logs.recent_for_request(request_id, limit).await
    }

    async fn insert(&self, outcome: &Outcome) -> AppResult<MaintenanceRequest> {
        self.requests.insert(outcome).await
    }

    async fn commit(&self, outcome: &Outcome) -> AppResult<MaintenanceRequest> {
        self.requests.commit(outcome).await
    }
}

#[derive(Clone)]
pub struct RequestsService {
    store: Arc<dyn RequestStore>,
    lifecycle: Lifecycle,
}

impl RequestsService {
    pub fn new(store: Arc<dyn RequestStore>, lifecycle: Lifecycle) -> Self {
        Self { store, lifecycle }
    }

    /// Only team members may be assigned explicitly
    async fn ensure_technician(&self, assignee: Option<i32>) -> AppResult<()> {
        if let Some(user_id) = assignee {
            if !self.store.is_technician(user_id).await? {
                return Err(AppError::Validation(format!(
                    "assigned_to_id: user {} is not a technician",
                    user_id
                )));
            }
        }
        Ok(())
    }

    /// An explicit team must exist
    async fn ensure_team(&self, team: Option<i32>) -> AppResult<()> {
        if let Some(team_id) = team {
            self.store.team(team_id).await?;
        }
        Ok(())
    }

    /// Create a request in stage `new`
    pub async fn create(&self, draft: &CreateRequest, actor: &Actor) -> AppResult<MaintenanceRequest> {
        draft.validate()?;
        let equipment = self.store.equipment(draft.equipment_id).await?;
        self.ensure_team(draft.maintenance_team_id).await?;
        self.ensure_technician(draft.assigned_to_id).await?;

        let outcome = self.lifecycle.create(draft, &equipment, actor);
        let saved = self.store.insert(&outcome).await?;

        tracing::info!(request_id = saved.id, equipment_id = saved.equipment_id, actor = actor.id, "Maintenance request created");
        Ok(saved)
    }

    /// Apply field changes; stage and assignee changes are logged
    pub async fn update(&self, id: i32, changes: &UpdateRequest, actor: &Actor) -> AppResult<MaintenanceRequest> {
        changes.validate()?;
        let before = self.store.request(id).await?;
        let after = self.lifecycle.apply_changes(&before, changes);

        let equipment = self.store.equipment(after.equipment_id).await?;
        if before.maintenance_team_id != after.maintenance_team_id {
            self.ensure_team(after.maintenance_team_id).await?;
        }

        let mut names = AssigneeNames::default();
        if before.assigned_to_id != after.assigned_to_id {
            self.ensure_technician(after.assigned_to_id).await?;
            if let Some(user_id) = before.assigned_to_id {
                names.before = self.store.user_name(user_id).await?;
            }
            if let Some(user_id) = after.assigned_to_id {
                names.after = self.store.user_name(user_id).await?;
            }
        }

        let outcome = self.lifecycle.finish_update(&before, after, &equipment, &names, actor)?;
        let saved = self.store.commit(&outcome).await?;

        tracing::info!(request_id = saved.id, stage = %saved.stage, actor = actor.id, "Maintenance request updated");
        Ok(saved)
    }

    /// Move a request to another stage, returning the new stage
    pub async fn change_stage(&self, id: i32, new_stage: Option<&str>, actor: &Actor) -> AppResult<Stage> {
        let before = self.store.request(id).await?;
        let equipment = self.store.equipment(before.equipment_id).await?;

        let outcome = self.lifecycle.change_stage(&before, new_stage, &equipment, actor)?;
        let saved = self.store.commit(&outcome).await?;

        tracing::info!(
            request_id = saved.id,
            from = %before.stage,
            to = %saved.stage,
            actor = actor.id,
            "Maintenance request stage changed"
        );
        Ok(saved.stage)
    }

    /// Request with its overdue flag and latest log entries
    pub async fn get_detail(&self, id: i32) -> AppResult<RequestDetail> {
        let request = self.store.request(id).await?;
        let logs = self.store.recent_logs(id, DETAIL_LOG_LIMIT).await?;
        let is_overdue = request.is_overdue(self.lifecycle.clock().today());
        Ok(RequestDetail { request, is_overdue, logs })
    }

    pub async fn list(&self, query: &RequestQuery) -> AppResult<Vec<RequestSummary>> {
        let today = self.lifecycle.clock().today();
        let rows = self.store.list(query).await?;
        Ok(rows.into_iter().map(|r| r.with_overdue(today)).collect())
    }

    /// Initial values of a new request form. An unknown equipment is ignored.
    pub async fn prefill(&self, query: &RequestPrefillQuery) -> AppResult<RequestPrefill> {
        let mut prefill = RequestPrefill {
            stage: Stage::New,
            equipment_id: None,
            maintenance_team_id: None,
            scheduled_date: query.scheduled_date,
        };
        if let Some(equipment_id) = query.equipment {
            match self.store.find_equipment(equipment_id).await? {
                Some(equipment) => {
                    prefill.equipment_id = Some(equipment.id);
                    prefill.maintenance_team_id = equipment.maintenance_team_id;
                }
                None => tracing::debug!(equipment_id, "Pre-fill equipment not found, ignoring"),
            }
        }
        Ok(prefill)
    }
}
