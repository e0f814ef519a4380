use crate::client::EntityClient;
use crate::models::{NewRole, Permission, Role, RolePatch, Team};
use crate::services::labels;

use super::{require, user_message, Phase, ScreenError, ValidationError};

/// Roles screen: the role list with an optional client-side team filter,
/// plus the team and permission collections the form and labels draw from.
#[derive(Debug, Default)]
pub struct RolesScreen {
    pub roles: Vec<Role>,
    pub teams: Vec<Team>,
    pub permissions: Vec<Permission>,
    pub selected_team_id: Option<i64>,
    pub phase: Phase,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RoleRow {
    pub id: i64,
    pub name: String,
    pub team: String,
    pub permissions: String,
}

impl RolesScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, client: &EntityClient) {
        self.phase = Phase::Loading;

        match tokio::try_join!(
            client.list_roles(),
            client.list_teams(),
            client.list_permissions(),
        ) {
            Ok((roles, teams, permissions)) => {
                self.roles = roles;
                self.teams = teams;
                self.permissions = permissions;
                self.phase = Phase::Ready;
                self.error = None;
            }
            Err(err) => {
                tracing::error!("Failed to load roles screen: {}", err);
                self.phase = Phase::Error;
                self.error = Some(user_message("loading roles", &err));
            }
        }
    }

    /// Unlike the user/team filter on the backend, role filtering is a
    /// client-side scan over the already-loaded list.
    pub fn filtered_roles(&self) -> Vec<&Role> {
        match self.selected_team_id {
            Some(team_id) => self
                .roles
                .iter()
                .filter(|role| role.team_id == Some(team_id))
                .collect(),
            None => self.roles.iter().collect(),
        }
    }

    pub async fn create_role(
        &mut self,
        client: &EntityClient,
        role: NewRole,
    ) -> Result<(), ScreenError> {
        if let Err(err) = self.validate(&role.name, role.team_id, &role.permissions) {
            return Err(err.into());
        }

        match client.create_role(&role).await {
            Ok(created) => {
                tracing::info!("Role created: id={}", created.id);
                self.roles.push(created);
                self.error = None;
                Ok(())
            }
            Err(err) => {
                self.error = Some(user_message("creating the role", &err));
                Err(err.into())
            }
        }
    }

    /// A rejected update must leave the role list exactly as it was; only a
    /// successful echo replaces the local record.
    pub async fn update_role(
        &mut self,
        client: &EntityClient,
        id: i64,
        patch: RolePatch,
    ) -> Result<(), ScreenError> {
        match client.update_role(id, &patch).await {
            Ok(echoed) => {
                if let Some(slot) = self.roles.iter_mut().find(|role| role.id == id) {
                    *slot = echoed;
                }
                self.error = None;
                Ok(())
            }
            Err(err) => {
                self.error = Some(user_message("updating the role", &err));
                Err(err.into())
            }
        }
    }

    pub async fn delete_role(&mut self, client: &EntityClient, id: i64) -> Result<(), ScreenError> {
        match client.delete_role(id).await {
            Ok(()) => {
                self.roles.retain(|role| role.id != id);
                self.error = None;
                Ok(())
            }
            Err(err) => {
                self.error = Some(user_message("deleting the role", &err));
                Err(err.into())
            }
        }
    }

    pub fn rows(&self) -> Vec<RoleRow> {
        self.filtered_roles()
            .into_iter()
            .map(|role| RoleRow {
                id: role.id,
                name: role.name.clone(),
                team: role
                    .team_id
                    .and_then(|id| self.teams.iter().find(|team| team.id == id))
                    .map(|team| team.name.clone())
                    .unwrap_or_else(|| "N/A".to_string()),
                permissions: labels::permission_summary(role, &self.permissions),
            })
            .collect()
    }

    pub fn role(&self, id: i64) -> Option<&Role> {
        self.roles.iter().find(|role| role.id == id)
    }

    fn validate(
        &mut self,
        name: &str,
        team_id: Option<i64>,
        permissions: &[String],
    ) -> Result<(), ValidationError> {
        if let Err(err) = require("Name", name) {
            self.error = Some(err.to_string());
            return Err(err);
        }
        if team_id.is_none() {
            let err = ValidationError { field: "Team" };
            self.error = Some(err.to_string());
            return Err(err);
        }
        if permissions.is_empty() {
            let err = ValidationError {
                field: "At least one permission",
            };
            self.error = Some(err.to_string());
            return Err(err);
        }
        Ok(())
    }
}
