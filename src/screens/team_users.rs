use crate::client::EntityClient;
use crate::models::{Permission, Role, Team, User, UserPatch};
use crate::services::labels;

use super::{user_message, Phase, ScreenError};

/// Team detail screen: the team record plus its members, with role and
/// permission labels resolved. Member filtering happens server-side via
/// the teamId query.
#[derive(Debug, Default)]
pub struct TeamUsersScreen {
    pub team: Option<Team>,
    pub users: Vec<User>,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
    pub phase: Phase,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MemberRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub permissions: String,
}

impl TeamUsersScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// All four fetches settle together; a single failure keeps the screen
    /// out of the ready phase entirely.
    pub async fn load(&mut self, client: &EntityClient, team_id: i64) {
        self.phase = Phase::Loading;

        match tokio::try_join!(
            client.fetch_team(team_id),
            client.list_users_by_team(team_id),
            client.list_roles(),
            client.list_permissions(),
        ) {
            Ok((team, users, roles, permissions)) => {
                self.team = Some(team);
                self.users = users;
                self.roles = roles;
                self.permissions = permissions;
                self.phase = Phase::Ready;
                self.error = None;
            }
            Err(err) => {
                tracing::error!("Failed to load team {} screen: {}", team_id, err);
                self.phase = Phase::Error;
                self.error = Some(user_message("loading the team", &err));
            }
        }
    }

    pub async fn update_user(
        &mut self,
        client: &EntityClient,
        id: i64,
        patch: UserPatch,
    ) -> Result<(), ScreenError> {
        match client.update_user(id, &patch).await {
            Ok(echoed) => {
                // Server echo replaces the record wholesale
                if let Some(slot) = self.users.iter_mut().find(|user| user.id == id) {
                    *slot = echoed;
                }
                self.error = None;
                Ok(())
            }
            Err(err) => {
                self.error = Some(user_message("updating the user", &err));
                Err(err.into())
            }
        }
    }

    pub async fn delete_user(&mut self, client: &EntityClient, id: i64) -> Result<(), ScreenError> {
        match client.delete_user(id).await {
            Ok(()) => {
                self.users.retain(|user| user.id != id);
                self.error = None;
                Ok(())
            }
            Err(err) => {
                self.error = Some(user_message("deleting the user", &err));
                Err(err.into())
            }
        }
    }

    pub fn team_name(&self) -> String {
        self.team
            .as_ref()
            .map(|team| team.name.clone())
            .unwrap_or_default()
    }

    pub fn rows(&self) -> Vec<MemberRow> {
        self.users
            .iter()
            .map(|user| {
                let role = self.roles.iter().find(|role| role.id == user.role_id);
                let permissions = role
                    .map(|role| labels::permission_summary(role, &self.permissions))
                    .unwrap_or_else(|| "No Permissions".to_string());

                MemberRow {
                    id: user.id,
                    name: user.name.clone(),
                    email: user.email.clone(),
                    role: labels::role_name(user, &self.roles),
                    permissions,
                }
            })
            .collect()
    }
}
