//! Maintenance teams service

use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        team::{AddTeamMember, CreateTeam, MaintenanceTeam, TeamDetail, TeamMember, TeamSummary},
        UserShort,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct TeamsService {
    repository: Repository,
}

impl TeamsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Every team with its counters and roster
    pub async fn list(&self) -> AppResult<Vec<TeamSummary>> {
        let mut teams = self.repository.teams.list_summaries().await?;
        let ids: Vec<i32> = teams.iter().map(|t| t.id).collect();
        let mut members = self.repository.teams.members(&ids).await?;

        for team in teams.iter_mut() {
            let (mine, rest): (Vec<_>, Vec<_>) = members.into_iter().partition(|m| m.team_id == team.id);
            team.members = mine;
            members = rest;
        }
        Ok(teams)
    }

    pub async fn get(&self, id: i32) -> AppResult<TeamDetail> {
        let team = self.repository.teams.get_by_id(id).await?;
        let members = self.repository.teams.members(&[id]).await?;
        Ok(TeamDetail { team, members })
    }

    pub async fn create(&self, data: &CreateTeam) -> AppResult<MaintenanceTeam> {
        data.validate()?;
        let team = self.repository.teams.create(data).await?;
        tracing::info!(team_id = team.id, name = %team.name, "Maintenance team created");
        Ok(team)
    }

    /// Add a user to a team; both must exist
    pub async fn add_member(&self, team_id: i32, data: &AddTeamMember) -> AppResult<TeamMember> {
        self.repository.teams.get_by_id(team_id).await?;
        self.repository.users.get_by_id(data.user_id).await?;
        let member = self.repository.teams.add_member(team_id, data.user_id, data.is_lead).await?;
        tracing::info!(team_id, user_id = data.user_id, "Team member added");
        Ok(member)
    }

    /// Users with at least one team membership
    pub async fn technicians(&self) -> AppResult<Vec<UserShort>> {
        self.repository.users.technicians().await
    }
}
