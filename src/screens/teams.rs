use crate::client::EntityClient;
use crate::models::{NewTeam, Team, TeamPatch};

use super::{require, user_message, Phase, ScreenError};

#[derive(Debug, Default)]
pub struct TeamsScreen {
    pub teams: Vec<Team>,
    pub phase: Phase,
    pub error: Option<String>,
}

impl TeamsScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, client: &EntityClient) {
        self.phase = Phase::Loading;

        match client.list_teams().await {
            Ok(teams) => {
                self.teams = teams;
                self.phase = Phase::Ready;
                self.error = None;
            }
            Err(err) => {
                tracing::error!("Failed to load teams screen: {}", err);
                self.phase = Phase::Error;
                self.error = Some(user_message("loading teams", &err));
            }
        }
    }

    pub async fn create_team(
        &mut self,
        client: &EntityClient,
        team: NewTeam,
    ) -> Result<(), ScreenError> {
        if let Err(err) = require("Name", &team.name) {
            self.error = Some(err.to_string());
            return Err(err.into());
        }

        match client.create_team(&team).await {
            Ok(created) => {
                tracing::info!("Team created: id={}", created.id);
                self.teams.push(created);
                self.error = None;
                Ok(())
            }
            Err(err) => {
                self.error = Some(user_message("creating the team", &err));
                Err(err.into())
            }
        }
    }

    pub async fn update_team(
        &mut self,
        client: &EntityClient,
        id: i64,
        patch: TeamPatch,
    ) -> Result<(), ScreenError> {
        match client.update_team(id, &patch).await {
            Ok(echoed) => {
                if let Some(slot) = self.teams.iter_mut().find(|team| team.id == id) {
                    *slot = echoed;
                }
                self.error = None;
                Ok(())
            }
            Err(err) => {
                self.error = Some(user_message("updating the team", &err));
                Err(err.into())
            }
        }
    }

    pub async fn delete_team(&mut self, client: &EntityClient, id: i64) -> Result<(), ScreenError> {
        match client.delete_team(id).await {
            Ok(()) => {
                self.teams.retain(|team| team.id != id);
                self.error = None;
                Ok(())
            }
            Err(err) => {
                self.error = Some(user_message("deleting the team", &err));
                Err(err.into())
            }
        }
    }

    pub fn team(&self, id: i64) -> Option<&Team> {
        self.teams.iter().find(|team| team.id == id)
    }
}
