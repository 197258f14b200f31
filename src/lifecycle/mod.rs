//! Maintenance request lifecycle
//!
//! Pure decision logic: given the current state of a request and its
//! equipment, compute the new request row, the dependent equipment write and
//! the audit entry to append. Persistence happens elsewhere, in one
//! transaction per [`Outcome`].

pub mod clock;
pub mod transitions;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        request::{CreateRequest, UpdateRequest},
        Actor, Equipment, MaintenanceRequest, NewLogEntry, Stage,
    },
};

pub use clock::{Clock, FixedClock, SystemClock};
pub use transitions::TransitionTable;

pub const ACTION_CREATED: &str = "Request created";
pub const ACTION_UPDATED: &str = "Request updated";
pub const ACTION_STAGE_CHANGED: &str = "Stage changed";

const UNASSIGNED: &str = "Unassigned";

/// Dependent write: mark the request's equipment as scrapped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquipmentScrap {
    pub equipment_id: i32,
    pub scrapped_date: DateTime<Utc>,
}

/// Everything one lifecycle operation needs persisted
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Request row to write. For creations the id is assigned on insert.
    pub request: MaintenanceRequest,
    pub equipment_scrap: Option<EquipmentScrap>,
    pub log: Option<NewLogEntry>,
}

/// Display names of the assignee before and after an update
#[derive(Debug, Clone, Default)]
pub struct AssigneeNames {
    pub before: Option<String>,
    pub after: Option<String>,
}

/// Lifecycle engine bound to a clock and a transition table
#[derive(Clone)]
pub struct Lifecycle {
    clock: Arc<dyn Clock>,
    transitions: TransitionTable,
}

impl Lifecycle {
    pub fn new(clock: Arc<dyn Clock>, transitions: TransitionTable) -> Self {
        Self { clock, transitions }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Build a new request in stage `new`, created by `creator`
    pub fn create(&self, draft: &CreateRequest, equipment: &Equipment, creator: &Actor) -> Outcome {
        let now = self.clock.now();
        let mut request = MaintenanceRequest {
            id: 0,
            subject: draft.subject.clone(),
            description: draft.description.clone(),
            request_type: draft.request_type,
            priority: draft.priority,
            stage: Stage::New,
            equipment_id: equipment.id,
            maintenance_team_id: draft.maintenance_team_id,
            assigned_to_id: draft.assigned_to_id,
            created_by_id: Some(creator.id),
            scheduled_date: draft.scheduled_date,
            completed_date: None,
            duration_hours: draft.duration_hours,
            notes: draft.notes.clone(),
            created_at: now,
            updated_at: now,
        };
        let equipment_scrap = enforce_save_invariants(&mut request, equipment, now);

        let log = NewLogEntry {
            user_id: Some(creator.id),
            action: ACTION_CREATED.to_string(),
            notes: format!("Initial request: {}", request.subject),
            timestamp: now,
        };

        Outcome {
            request,
            equipment_scrap,
            log: Some(log),
        }
    }

    /// Apply field changes without running any invariant. Used to learn the
    /// target equipment and assignee before [`Lifecycle::finish_update`].
    pub fn apply_changes(&self, before: &MaintenanceRequest, changes: &UpdateRequest) -> MaintenanceRequest {
        let mut after = before.clone();
        if let Some(id) = changes.equipment_id {
            after.equipment_id = id;
        }
        if let Some(request_type) = changes.request_type {
            after.request_type = request_type;
        }
        if let Some(ref subject) = changes.subject {
            after.subject = subject.clone();
        }
        if let Some(ref description) = changes.description {
            after.description = description.clone();
        }
        if let Some(priority) = changes.priority {
            after.priority = priority;
        }
        if let Some(stage) = changes.stage {
            after.stage = stage;
        }
        if let Some(team) = changes.maintenance_team_id {
            after.maintenance_team_id = team;
        }
        if let Some(assignee) = changes.assigned_to_id {
            after.assigned_to_id = assignee;
        }
        if let Some(date) = changes.scheduled_date {
            after.scheduled_date = date;
        }
        if let Some(hours) = changes.duration_hours {
            after.duration_hours = hours;
        }
        if let Some(ref notes) = changes.notes {
            after.notes = notes.clone();
        }
        after
    }

    /// Run the save-time invariants on an updated request and describe the
    /// stage/assignee deltas. No log entry when neither changed.
    pub fn finish_update(
        &self,
        before: &MaintenanceRequest,
        mut after: MaintenanceRequest,
        equipment: &Equipment,
        names: &AssigneeNames,
        actor: &Actor,
    ) -> AppResult<Outcome> {
        if before.stage != after.stage {
            self.transitions.check(before.stage, after.stage)?;
        }

        let now = self.clock.now();
        after.updated_at = now;
        let equipment_scrap = enforce_save_invariants(&mut after, equipment, now);

        let mut changes = Vec::new();
        if before.stage != after.stage {
            changes.push(format!("Stage: {} → {}", before.stage, after.stage));
        }
        if before.assigned_to_id != after.assigned_to_id {
            changes.push(format!(
                "Assigned: {} → {}",
                names.before.as_deref().unwrap_or(UNASSIGNED),
                names.after.as_deref().unwrap_or(UNASSIGNED),
            ));
        }

        let log = (!changes.is_empty()).then(|| NewLogEntry {
            user_id: Some(actor.id),
            action: ACTION_UPDATED.to_string(),
            notes: changes.join(", "),
            timestamp: now,
        });

        Ok(Outcome {
            request: after,
            equipment_scrap,
            log,
        })
    }

    /// Drag-and-drop stage change. An unknown stage is rejected before any mutation.
    pub fn change_stage(
        &self,
        before: &MaintenanceRequest,
        new_stage: Option<&str>,
        equipment: &Equipment,
        actor: &Actor,
    ) -> AppResult<Outcome> {
        let new_stage: Stage = new_stage
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| AppError::InvalidStage("Invalid stage".to_string()))?;
        self.transitions.check(before.stage, new_stage)?;

        let now = self.clock.now();
        let mut after = before.clone();
        after.stage = new_stage;
        after.updated_at = now;

        if new_stage == Stage::InProgress && after.assigned_to_id.is_none() {
            after.assigned_to_id = Some(actor.id);
        }
        if new_stage == Stage::Repaired && after.completed_date.is_none() {
            after.completed_date = Some(now);
        }

        let equipment_scrap = enforce_save_invariants(&mut after, equipment, now);

        let log = NewLogEntry {
            user_id: Some(actor.id),
            action: ACTION_STAGE_CHANGED.to_string(),
            notes: format!("From {} to {}", before.stage, new_stage),
            timestamp: now,
        };

        Ok(Outcome {
            request: after,
            equipment_scrap,
            log: Some(log),
        })
    }
}

/// Invariants applied on every persist of a request:
/// team defaults from the equipment, `completed_date` is stamped on the first
/// `repaired`, and `scrap` marks a not-yet-scrapped equipment as scrapped.
pub fn enforce_save_invariants(
    request: &mut MaintenanceRequest,
    equipment: &Equipment,
    now: DateTime<Utc>,
) -> Option<EquipmentScrap> {
    if request.maintenance_team_id.is_none() {
        request.maintenance_team_id = equipment.maintenance_team_id;
    }

    if request.stage == Stage::Repaired && request.completed_date.is_none() {
        request.completed_date = Some(now);
    }

    (request.stage == Stage::Scrap && !equipment.is_scrapped).then(|| EquipmentScrap {
        equipment_id: equipment.id,
        scrapped_date: now,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{Department, EquipmentCategory, Priority, RequestType};
    use chrono::{Duration, TimeZone};

    pub(crate) fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 9, 30, 0).unwrap()
    }

    pub(crate) fn engine_at(now: DateTime<Utc>) -> Lifecycle {
        Lifecycle::new(Arc::new(FixedClock(now)), TransitionTable::default())
    }

    pub(crate) fn actor() -> Actor {
        Actor { id: 42, name: "Jane Smith".to_string() }
    }

    pub(crate) fn equipment(team: Option<i32>) -> Equipment {
        Equipment {
            id: 7,
            name: "Press #2".to_string(),
            serial_number: "PR-0002".to_string(),
            category: EquipmentCategory::Machinery,
            department: Department::Production,
            assigned_employee_id: None,
            maintenance_team_id: team,
            default_technician_id: None,
            purchase_date: None,
            warranty_expiry: None,
            location: "Hall B".to_string(),
            is_scrapped: false,
            scrapped_date: None,
            notes: String::new(),
            created_at: instant() - Duration::days(400),
            updated_at: instant() - Duration::days(400),
        }
    }

    pub(crate) fn request(stage: Stage) -> MaintenanceRequest {
        MaintenanceRequest {
            id: 100,
            subject: "Hydraulic leak".to_string(),
            description: String::new(),
            request_type: RequestType::Corrective,
            priority: Priority::High,
            stage,
            equipment_id: 7,
            maintenance_team_id: Some(3),
            assigned_to_id: None,
            created_by_id: Some(1),
            scheduled_date: None,
            completed_date: None,
            duration_hours: None,
            notes: String::new(),
            created_at: instant() - Duration::days(2),
            updated_at: instant() - Duration::days(2),
        }
    }

    fn draft(team: Option<i32>) -> CreateRequest {
        CreateRequest {
            equipment_id: 7,
            request_type: RequestType::Preventive,
            subject: "Quarterly inspection".to_string(),
            description: String::new(),
            priority: Priority::Low,
            maintenance_team_id: team,
            assigned_to_id: None,
            scheduled_date: None,
            duration_hours: None,
            notes: String::new(),
        }
    }

    #[test]
    fn test_create_starts_new_and_logs() {
        let outcome = engine_at(instant()).create(&draft(None), &equipment(Some(3)), &actor());
        assert_eq!(outcome.request.stage, Stage::New);
        assert_eq!(outcome.request.created_by_id, Some(42));
        assert_eq!(outcome.request.maintenance_team_id, Some(3));
        assert_eq!(outcome.request.completed_date, None);
        assert_eq!(outcome.equipment_scrap, None);

        let log = outcome.log.unwrap();
        assert_eq!(log.action, "Request created");
        assert_eq!(log.notes, "Initial request: Quarterly inspection");
        assert_eq!(log.user_id, Some(42));
        assert_eq!(log.timestamp, instant());
    }

    #[test]
    fn test_create_keeps_explicit_team() {
        let outcome = engine_at(instant()).create(&draft(Some(9)), &equipment(Some(3)), &actor());
        assert_eq!(outcome.request.maintenance_team_id, Some(9));
    }

    #[test]
    fn test_create_without_any_team() {
        let outcome = engine_at(instant()).create(&draft(None), &equipment(None), &actor());
        assert_eq!(outcome.request.maintenance_team_id, None);
    }

    #[test]
    fn test_invariants_fill_team_from_equipment() {
        let mut req = request(Stage::New);
        req.maintenance_team_id = None;
        enforce_save_invariants(&mut req, &equipment(Some(5)), instant());
        assert_eq!(req.maintenance_team_id, Some(5));
    }

    #[test]
    fn test_completed_date_set_once() {
        let engine = engine_at(instant());
        let eq = equipment(Some(3));
        let first = engine
            .change_stage(&request(Stage::InProgress), Some("repaired"), &eq, &actor())
            .unwrap();
        assert_eq!(first.request.completed_date, Some(instant()));

        // leave and re-enter repaired later; the first completion stays
        let later = engine_at(instant() + Duration::days(3));
        let reopened = later
            .change_stage(&first.request, Some("in_progress"), &eq, &actor())
            .unwrap();
        assert_eq!(reopened.request.completed_date, Some(instant()));
        let again = later
            .change_stage(&reopened.request, Some("repaired"), &eq, &actor())
            .unwrap();
        assert_eq!(again.request.completed_date, Some(instant()));
    }

    #[test]
    fn test_completed_date_null_before_repaired() {
        let engine = engine_at(instant());
        let eq = equipment(Some(3));
        let outcome = engine
            .change_stage(&request(Stage::New), Some("in_progress"), &eq, &actor())
            .unwrap();
        assert_eq!(outcome.request.completed_date, None);
    }

    #[test]
    fn test_scrap_marks_equipment() {
        let engine = engine_at(instant());
        let outcome = engine
            .change_stage(&request(Stage::InProgress), Some("scrap"), &equipment(Some(3)), &actor())
            .unwrap();
        assert_eq!(
            outcome.equipment_scrap,
            Some(EquipmentScrap { equipment_id: 7, scrapped_date: instant() })
        );
    }

    #[test]
    fn test_rescrap_does_not_touch_equipment() {
        let mut eq = equipment(Some(3));
        eq.is_scrapped = true;
        eq.scrapped_date = Some(instant() - Duration::days(30));
        let outcome = engine_at(instant())
            .change_stage(&request(Stage::New), Some("scrap"), &eq, &actor())
            .unwrap();
        assert_eq!(outcome.equipment_scrap, None);
    }

    #[test]
    fn test_invalid_stage_rejected() {
        let before = request(Stage::New);
        let result = engine_at(instant()).change_stage(&before, Some("bogus_stage"), &equipment(Some(3)), &actor());
        assert!(matches!(result, Err(AppError::InvalidStage(_))));

        let result = engine_at(instant()).change_stage(&before, None, &equipment(Some(3)), &actor());
        assert!(matches!(result, Err(AppError::InvalidStage(_))));
    }

    #[test]
    fn test_in_progress_auto_assigns_actor() {
        let outcome = engine_at(instant())
            .change_stage(&request(Stage::New), Some("in_progress"), &equipment(Some(3)), &actor())
            .unwrap();
        assert_eq!(outcome.request.assigned_to_id, Some(42));
        let log = outcome.log.unwrap();
        assert_eq!(log.action, "Stage changed");
        assert_eq!(log.notes, "From new to in_progress");
    }

    #[test]
    fn test_in_progress_keeps_existing_assignee() {
        let mut before = request(Stage::New);
        before.assigned_to_id = Some(11);
        let outcome = engine_at(instant())
            .change_stage(&before, Some("in_progress"), &equipment(Some(3)), &actor())
            .unwrap();
        assert_eq!(outcome.request.assigned_to_id, Some(11));
    }

    #[test]
    fn test_restricted_transition_is_rejected() {
        let engine = Lifecycle::new(
            Arc::new(FixedClock(instant())),
            TransitionTable::new(&[(Stage::New, &[Stage::InProgress])]),
        );
        let result = engine.change_stage(&request(Stage::Repaired), Some("new"), &equipment(None), &actor());
        assert!(matches!(result, Err(AppError::BusinessRule(_))));
    }

    #[test]
    fn test_update_logs_stage_and_assignee() {
        let engine = engine_at(instant());
        let before = request(Stage::New);
        let changes = UpdateRequest {
            stage: Some(Stage::InProgress),
            assigned_to_id: Some(Some(12)),
            ..Default::default()
        };
        let after = engine.apply_changes(&before, &changes);
        let names = AssigneeNames { before: None, after: Some("Jane Smith".to_string()) };
        let outcome = engine
            .finish_update(&before, after, &equipment(Some(3)), &names, &actor())
            .unwrap();

        let log = outcome.log.unwrap();
        assert_eq!(log.action, "Request updated");
        assert_eq!(log.notes, "Stage: new → in_progress, Assigned: Unassigned → Jane Smith");
        assert_eq!(outcome.request.updated_at, instant());
    }

    #[test]
    fn test_update_unassign_phrasing() {
        let engine = engine_at(instant());
        let mut before = request(Stage::InProgress);
        before.assigned_to_id = Some(12);
        let changes = UpdateRequest { assigned_to_id: Some(None), ..Default::default() };
        let after = engine.apply_changes(&before, &changes);
        let names = AssigneeNames { before: Some("Mike Johnson".to_string()), after: None };
        let outcome = engine
            .finish_update(&before, after, &equipment(Some(3)), &names, &actor())
            .unwrap();
        assert_eq!(outcome.log.unwrap().notes, "Assigned: Mike Johnson → Unassigned");
    }

    #[test]
    fn test_update_without_tracked_change_is_silent() {
        let engine = engine_at(instant());
        let before = request(Stage::New);
        let changes = UpdateRequest {
            subject: Some("Hydraulic leak, left cylinder".to_string()),
            stage: Some(Stage::New),
            ..Default::default()
        };
        let after = engine.apply_changes(&before, &changes);
        let outcome = engine
            .finish_update(&before, after, &equipment(Some(3)), &AssigneeNames::default(), &actor())
            .unwrap();
        assert_eq!(outcome.log, None);
        assert_eq!(outcome.request.subject, "Hydraulic leak, left cylinder");
    }

    #[test]
    fn test_update_to_repaired_stamps_completion() {
        let engine = engine_at(instant());
        let before = request(Stage::InProgress);
        let changes = UpdateRequest { stage: Some(Stage::Repaired), ..Default::default() };
        let after = engine.apply_changes(&before, &changes);
        let outcome = engine
            .finish_update(&before, after, &equipment(Some(3)), &AssigneeNames::default(), &actor())
            .unwrap();
        assert_eq!(outcome.request.completed_date, Some(instant()));
        assert_eq!(outcome.log.unwrap().notes, "Stage: in_progress → repaired");
    }

    #[test]
    fn test_update_to_scrap_marks_equipment() {
        let engine = engine_at(instant());
        let before = request(Stage::New);
        let changes = UpdateRequest { stage: Some(Stage::Scrap), ..Default::default() };
        let after = engine.apply_changes(&before, &changes);
        let outcome = engine
            .finish_update(&before, after, &equipment(Some(3)), &AssigneeNames::default(), &actor())
            .unwrap();
        assert!(outcome.equipment_scrap.is_some());
    }

    #[test]
    fn test_update_clearing_team_refills_from_equipment() {
        let engine = engine_at(instant());
        let before = request(Stage::New);
        let changes = UpdateRequest { maintenance_team_id: Some(None), ..Default::default() };
        let after = engine.apply_changes(&before, &changes);
        assert_eq!(after.maintenance_team_id, None);
        let outcome = engine
            .finish_update(&before, after, &equipment(Some(8)), &AssigneeNames::default(), &actor())
            .unwrap();
        assert_eq!(outcome.request.maintenance_team_id, Some(8));
    }
}
