use crate::models::{NewPermission, Permission, PermissionPatch};

use super::{ClientResult, EntityClient};

impl EntityClient {
    /// GET /permissions
    pub async fn list_permissions(&self) -> ClientResult<Vec<Permission>> {
        self.get_json("/permissions").await
    }

    /// POST /permissions
    pub async fn create_permission(&self, permission: &NewPermission) -> ClientResult<Permission> {
        self.post_json("/permissions", permission).await
    }

    /// PUT /permissions/{id}
    pub async fn update_permission(
        &self,
        id: &str,
        patch: &PermissionPatch,
    ) -> ClientResult<Permission> {
        self.put_json(&format!("/permissions/{}", id), patch).await
    }

    /// DELETE /permissions/{id}
    pub async fn delete_permission(&self, id: &str) -> ClientResult<()> {
        self.delete(&format!("/permissions/{}", id)).await
    }
}
