//! Role↔Permission and User↔Team mapping endpoints.

use serde::Serialize;

use crate::models::{RolePermission, UserTeam};

use super::{ClientResult, EntityClient};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignPermissionsBody<'a> {
    permission_ids: &'a [String],
}

impl EntityClient {
    /// GET /rolePermissions
    pub async fn list_role_permissions(&self) -> ClientResult<Vec<RolePermission>> {
        self.get_json("/rolePermissions").await
    }

    /// POST /roles/{id}/permissions
    pub async fn assign_role_permissions(
        &self,
        role_id: i64,
        permission_ids: &[String],
    ) -> ClientResult<()> {
        self.post_no_content(
            &format!("/roles/{}/permissions", role_id),
            &AssignPermissionsBody { permission_ids },
        )
        .await
    }

    /// DELETE /roles/{id}/permissions/{permissionId}
    pub async fn remove_role_permission(
        &self,
        role_id: i64,
        permission_id: &str,
    ) -> ClientResult<()> {
        self.delete(&format!("/roles/{}/permissions/{}", role_id, permission_id))
            .await
    }

    /// GET /userTeams
    pub async fn list_user_teams(&self) -> ClientResult<Vec<UserTeam>> {
        self.get_json("/userTeams").await
    }

    /// POST /userTeams — the backend assigns the mapping id
    pub async fn add_user_team(&self, mapping: &UserTeam) -> ClientResult<UserTeam> {
        self.post_json("/userTeams", mapping).await
    }

    /// DELETE /userTeams/{id}
    pub async fn delete_user_team(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("/userTeams/{}", id)).await
    }
}
