//! Dashboard, reporting, kanban and calendar views

use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use indexmap::IndexMap;

use crate::{
    error::{AppError, AppResult},
    lifecycle::Clock,
    models::{
        report::{
            Breakdowns, CalendarEvent, CalendarEventProps, CalendarQuery, CategoryCount, Dashboard,
            KanbanBoard, KanbanQuery, MonthCount, PriorityCount, Reporting, TechnicianStats,
        },
        Actor, EquipmentCategory, Priority, RequestSummary, Stage,
    },
    repository::Repository,
};

const CRITICAL_WINDOW_DAYS: i64 = 30;
const CRITICAL_MIN_REQUESTS: i64 = 3;
const CRITICAL_LIMIT: i64 = 5;
const RECENT_LIMIT: i64 = 10;
const TREND_MONTHS: u32 = 6;

const COLOR_REPAIRED: &str = "#28a745";
const COLOR_OVERDUE: &str = "#dc3545";
const COLOR_IN_PROGRESS: &str = "#17a2b8";
const COLOR_DEFAULT: &str = "#3788d8";

#[derive(Clone)]
pub struct ReportsService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl ReportsService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn dashboard(&self, actor: &Actor) -> AppResult<Dashboard> {
        let now = self.clock.now();
        let today = self.clock.today();
        let reports = &self.repository.reports;

        let critical_equipment = reports
            .critical_equipment(now - Duration::days(CRITICAL_WINDOW_DAYS), CRITICAL_MIN_REQUESTS, CRITICAL_LIMIT)
            .await?;
        let pending_requests = reports.count_pending().await?;
        let overdue_requests = reports.count_overdue(today).await?;

        let technician_stats = match self.repository.teams.first_membership(actor.id).await? {
            Some(_) => {
                let (assigned, total) = reports.assignment_counts(actor.id).await?;
                TechnicianStats::compute(assigned, total)
            }
            None => None,
        };

        let recent_requests = self
            .repository
            .requests
            .recent(RECENT_LIMIT)
            .await?
            .into_iter()
            .map(|r| r.with_overdue(today))
            .collect();

        Ok(Dashboard {
            critical_equipment,
            pending_requests,
            overdue_requests,
            technician_stats,
            recent_requests,
            equipment_count: self.repository.equipment.count_all().await?,
            team_count: self.repository.teams.count().await?,
            today,
        })
    }

    pub async fn reporting(&self) -> AppResult<Reporting> {
        let reports = &self.repository.reports;
        let requests_by_team = reports.by_team().await?;
        let Breakdowns { by_category, by_priority } = reports.breakdowns().await?;

        let mut monthly_trend = Vec::with_capacity(TREND_MONTHS as usize);
        for month in trend_months(self.clock.today()) {
            let (from, to) = month_bounds(month)?;
            monthly_trend.push(MonthCount {
                month: month.format("%B %Y").to_string(),
                count: reports.count_created_between(from, to).await?,
            });
        }

        Ok(Reporting {
            requests_by_team,
            requests_by_category: category_counts(&by_category),
            requests_by_priority: priority_counts(&by_priority),
            monthly_trend,
            total_equipment: reports.count_active_equipment().await?,
            total_requests: reports.count_requests().await?,
            open_requests: reports.count_open().await?,
        })
    }

    /// Scheduled preventive requests as calendar events
    pub async fn calendar(&self, query: &CalendarQuery) -> AppResult<Vec<CalendarEvent>> {
        let today = self.clock.today();
        let rows = self
            .repository
            .requests
            .scheduled_preventive(query.start, query.end)
            .await?;
        Ok(rows.iter().filter_map(|r| calendar_event(r, today)).collect())
    }

    /// Requests grouped by stage. Without a team in the query the board
    /// follows the caller's first team, or shows every team.
    pub async fn kanban(&self, query: &KanbanQuery, actor: &Actor) -> AppResult<KanbanBoard> {
        let selected_team = match query.team {
            Some(team) => Some(team),
            None => self
                .repository
                .teams
                .first_membership(actor.id)
                .await?
                .map(|m| m.team_id),
        };

        let today = self.clock.today();
        let mut columns = IndexMap::with_capacity(Stage::ALL.len());
        for stage in Stage::ALL {
            let cards = self
                .repository
                .requests
                .kanban_column(*stage, selected_team)
                .await?
                .into_iter()
                .map(|r| r.with_overdue(today))
                .collect();
            columns.insert(*stage, cards);
        }

        Ok(KanbanBoard { columns, selected_team })
    }
}

/// First day of the current month and the five before it, oldest first
pub fn trend_months(today: NaiveDate) -> Vec<NaiveDate> {
    let current = today.year() * 12 + today.month0() as i32;
    (0..TREND_MONTHS as i32)
        .rev()
        .filter_map(|back| {
            let index = current - back;
            NaiveDate::from_ymd_opt(index.div_euclid(12), index.rem_euclid(12) as u32 + 1, 1)
        })
        .collect()
}

/// `[first day of month, first day of next month)` as UTC instants
fn month_bounds(first: NaiveDate) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    let next = first
        .checked_add_months(chrono::Months::new(1))
        .ok_or_else(|| AppError::Internal(format!("Month after {} out of range", first)))?;
    let start = first
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| AppError::Internal("Invalid month start".to_string()))?
        .and_utc();
    let end = next
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| AppError::Internal("Invalid month end".to_string()))?
        .and_utc();
    Ok((start, end))
}

/// Non-empty categories, labelled, largest first
fn category_counts(raw: &[(EquipmentCategory, i64)]) -> Vec<CategoryCount> {
    let mut counts: Vec<(EquipmentCategory, i64)> = EquipmentCategory::ALL
        .iter()
        .filter_map(|c| {
            raw.iter()
                .find(|(cat, _)| cat == c)
                .map(|(_, n)| (*c, *n))
                .filter(|(_, n)| *n > 0)
        })
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .map(|(c, count)| CategoryCount { category: c.label().to_string(), count })
        .collect()
}

/// Every priority in ascending order, zero when absent
fn priority_counts(raw: &[(Priority, i64)]) -> Vec<PriorityCount> {
    Priority::ALL
        .iter()
        .map(|p| PriorityCount {
            priority: p.label().to_string(),
            count: raw.iter().find(|(q, _)| q == p).map_or(0, |(_, n)| *n),
        })
        .collect()
}

/// Repaired, then overdue, then in progress decide the colour
pub fn calendar_color(stage: Stage, overdue: bool) -> &'static str {
    if stage == Stage::Repaired {
        COLOR_REPAIRED
    } else if overdue {
        COLOR_OVERDUE
    } else if stage == Stage::InProgress {
        COLOR_IN_PROGRESS
    } else {
        COLOR_DEFAULT
    }
}

fn calendar_event(request: &RequestSummary, today: NaiveDate) -> Option<CalendarEvent> {
    let start = request.scheduled_date?;
    let overdue = crate::models::request::is_overdue(request.stage, Some(start), today);
    let color = calendar_color(request.stage, overdue).to_string();
    Some(CalendarEvent {
        id: request.id,
        title: format!("{}: {}", request.equipment_name, request.subject),
        start,
        background_color: color.clone(),
        border_color: color,
        url: format!("/requests/{}/update/", request.id),
        extended_props: CalendarEventProps {
            stage: request.stage,
            priority: request.priority,
            assigned_to: request
                .assigned_to_name
                .clone()
                .unwrap_or_else(|| "Unassigned".to_string()),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::tests::instant;
    use crate::models::RequestType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn summary(stage: Stage, scheduled: Option<NaiveDate>) -> RequestSummary {
        RequestSummary {
            id: 12,
            subject: "Filter change".to_string(),
            request_type: RequestType::Preventive,
            priority: Priority::Medium,
            stage,
            equipment_id: 7,
            equipment_name: "HVAC Unit 3".to_string(),
            maintenance_team_id: Some(2),
            team_name: Some("Facilities".to_string()),
            assigned_to_id: None,
            assigned_to_name: None,
            scheduled_date: scheduled,
            completed_date: None,
            created_at: instant(),
            updated_at: instant(),
            is_overdue: false,
        }
    }

    #[test]
    fn test_trend_months_crosses_year() {
        let months = trend_months(date(2026, 3, 31));
        assert_eq!(
            months,
            vec![
                date(2025, 10, 1),
                date(2025, 11, 1),
                date(2025, 12, 1),
                date(2026, 1, 1),
                date(2026, 2, 1),
                date(2026, 3, 1),
            ]
        );
    }

    #[test]
    fn test_trend_months_never_skips_february() {
        let months = trend_months(date(2026, 7, 31));
        let labels: Vec<String> = months.iter().map(|m| m.format("%B %Y").to_string()).collect();
        assert_eq!(
            labels,
            ["February 2026", "March 2026", "April 2026", "May 2026", "June 2026", "July 2026"]
        );
    }

    #[test]
    fn test_month_bounds() {
        let (from, to) = month_bounds(date(2025, 12, 1)).unwrap();
        assert_eq!(from.to_rfc3339(), "2025-12-01T00:00:00+00:00");
        assert_eq!(to.to_rfc3339(), "2026-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_calendar_color_precedence() {
        assert_eq!(calendar_color(Stage::Repaired, true), COLOR_REPAIRED);
        assert_eq!(calendar_color(Stage::InProgress, true), COLOR_OVERDUE);
        assert_eq!(calendar_color(Stage::InProgress, false), COLOR_IN_PROGRESS);
        assert_eq!(calendar_color(Stage::New, false), COLOR_DEFAULT);
        assert_eq!(calendar_color(Stage::Scrap, false), COLOR_DEFAULT);
    }

    #[test]
    fn test_calendar_event_shape() {
        let today = date(2026, 3, 10);
        let event = calendar_event(&summary(Stage::New, Some(date(2026, 3, 1))), today).unwrap();
        assert_eq!(event.title, "HVAC Unit 3: Filter change");
        assert_eq!(event.url, "/requests/12/update/");
        assert_eq!(event.background_color, COLOR_OVERDUE);
        assert_eq!(event.border_color, event.background_color);
        assert_eq!(event.extended_props.assigned_to, "Unassigned");

        assert!(calendar_event(&summary(Stage::New, None), today).is_none());
    }

    #[test]
    fn test_category_counts_skip_empty_and_sort() {
        let raw = vec![
            (EquipmentCategory::Printer, 2),
            (EquipmentCategory::Hvac, 5),
            (EquipmentCategory::Vehicle, 0),
        ];
        assert_eq!(
            category_counts(&raw),
            vec![
                CategoryCount { category: "HVAC".to_string(), count: 5 },
                CategoryCount { category: "Printer".to_string(), count: 2 },
            ]
        );
    }

    #[test]
    fn test_priority_counts_cover_all_levels() {
        let counts = priority_counts(&[(Priority::High, 4)]);
        let levels: Vec<(&str, i64)> = counts.iter().map(|c| (c.priority.as_str(), c.count)).collect();
        assert_eq!(levels, vec![("Low", 0), ("Medium", 0), ("High", 4), ("Critical", 0)]);
    }
}
