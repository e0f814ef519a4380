use crate::client::EntityClient;
use crate::models::{NewUser, Permission, Role, Team, User, UserPatch};
use crate::services::labels;

use super::{require, user_message, Phase, ScreenError};

/// The "All Users" screen: every user with role, permission, status and
/// team labels resolved against the fully loaded reference collections.
#[derive(Debug, Default)]
pub struct AllUsersScreen {
    pub users: Vec<User>,
    pub teams: Vec<Team>,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
    pub phase: Phase,
    pub error: Option<String>,
}

/// One rendered table row; all foreign keys already resolved to labels.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub permissions: String,
    pub status: String,
    pub team: String,
}

impl AllUsersScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches users, teams, roles and permissions concurrently. The screen
    /// renders all-or-nothing: one failed fetch puts the whole screen in the
    /// error phase instead of a partial table.
    pub async fn load(&mut self, client: &EntityClient) {
        self.phase = Phase::Loading;

        match tokio::try_join!(
            client.list_users(),
            client.list_teams(),
            client.list_roles(),
            client.list_permissions(),
        ) {
            Ok((users, teams, roles, permissions)) => {
                self.users = users;
                self.teams = teams;
                self.roles = roles;
                self.permissions = permissions;
                self.phase = Phase::Ready;
                self.error = None;
            }
            Err(err) => {
                tracing::error!("Failed to load users screen: {}", err);
                self.phase = Phase::Error;
                self.error = Some(user_message("loading users", &err));
            }
        }
    }

    pub async fn create_user(
        &mut self,
        client: &EntityClient,
        user: NewUser,
    ) -> Result<(), ScreenError> {
        if let Err(err) = require("Name", &user.name) {
            self.error = Some(err.to_string());
            return Err(err.into());
        }

        match client.create_user(&user).await {
            Ok(created) => {
                tracing::info!("User created: id={}", created.id);
                self.users.push(created);
                self.error = None;
                Ok(())
            }
            Err(err) => {
                self.error = Some(user_message("creating the user", &err));
                Err(err.into())
            }
        }
    }

    /// Stores exactly what the backend echoes back. A local merge of the
    /// patch would drift from server truth whenever the backend rewrites a
    /// field.
    pub async fn update_user(
        &mut self,
        client: &EntityClient,
        id: i64,
        patch: UserPatch,
    ) -> Result<(), ScreenError> {
        match client.update_user(id, &patch).await {
            Ok(echoed) => {
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

    pub fn rows(&self) -> Vec<UserRow> {
        self.users
            .iter()
            .map(|user| {
                let role = self.roles.iter().find(|role| role.id == user.role_id);
                let permissions = role
                    .map(|role| labels::permission_summary(role, &self.permissions))
                    .unwrap_or_else(|| "No Permissions".to_string());

                UserRow {
                    id: user.id,
                    name: user.name.clone(),
                    email: user.email.clone(),
                    role: labels::role_name(user, &self.roles),
                    permissions,
                    status: user.status.to_string(),
                    team: labels::team_name(user, &self.teams),
                }
            })
            .collect()
    }

    pub fn user(&self, id: i64) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }
}
