use crate::models::{NewTeam, Team, TeamPatch};

use super::{ClientResult, EntityClient};

impl EntityClient {
    /// GET /teams
    pub async fn list_teams(&self) -> ClientResult<Vec<Team>> {
        self.get_json("/teams").await
    }

    /// GET /teams/{id}
    pub async fn fetch_team(&self, id: i64) -> ClientResult<Team> {
        self.get_json(&format!("/teams/{}", id)).await
    }

    /// POST /teams
    pub async fn create_team(&self, team: &NewTeam) -> ClientResult<Team> {
        self.post_json("/teams", team).await
    }

    /// PUT /teams/{id}
    pub async fn update_team(&self, id: i64, patch: &TeamPatch) -> ClientResult<Team> {
        self.put_json(&format!("/teams/{}", id), patch).await
    }

    /// DELETE /teams/{id}
    pub async fn delete_team(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("/teams/{}", id)).await
    }
}
