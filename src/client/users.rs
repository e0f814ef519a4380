use crate::models::{NewUser, User, UserPatch};

use super::{ClientResult, EntityClient};

impl EntityClient {
    /// GET /users
    pub async fn list_users(&self) -> ClientResult<Vec<User>> {
        self.get_json("/users").await
    }

    /// GET /users?teamId={id} — filtering happens server-side
    pub async fn list_users_by_team(&self, team_id: i64) -> ClientResult<Vec<User>> {
        self.get_json(&format!("/users?teamId={}", team_id)).await
    }

    /// POST /users — the backend assigns the id and echoes the record
    pub async fn create_user(&self, user: &NewUser) -> ClientResult<User> {
        self.post_json("/users", user).await
    }

    /// PUT /users/{id} — partial body; the echo is the merged truth
    pub async fn update_user(&self, id: i64, patch: &UserPatch) -> ClientResult<User> {
        self.put_json(&format!("/users/{}", id), patch).await
    }

    /// DELETE /users/{id}
    pub async fn delete_user(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("/users/{}", id)).await
    }
}
