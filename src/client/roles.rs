use crate::models::{NewRole, Role, RolePatch};

use super::{ClientResult, EntityClient};

impl EntityClient {
    /// GET /roles
    pub async fn list_roles(&self) -> ClientResult<Vec<Role>> {
        self.get_json("/roles").await
    }

    /// POST /roles
    pub async fn create_role(&self, role: &NewRole) -> ClientResult<Role> {
        self.post_json("/roles", role).await
    }

    /// PUT /roles/{id}
    pub async fn update_role(&self, id: i64, patch: &RolePatch) -> ClientResult<Role> {
        self.put_json(&format!("/roles/{}", id), patch).await
    }

    /// DELETE /roles/{id}
    pub async fn delete_role(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("/roles/{}", id)).await
    }
}
