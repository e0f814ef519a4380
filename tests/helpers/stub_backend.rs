//! In-process stand-in for the external REST backend: the real entity
//! endpoints over an in-memory store, bound to an ephemeral port. Tests can
//! inject failures or delays per method+path to exercise the error paths.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crewdeck::client::EntityClient;
use crewdeck::models::{Permission, Role, RolePermission, Team, User, UserTeam};

#[derive(Default)]
pub struct Store {
    pub users: Vec<User>,
    pub teams: Vec<Team>,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
    pub role_permissions: Vec<RolePermission>,
    pub user_teams: Vec<UserTeam>,
    pub perm_seq: usize,
    /// "METHOD /path" prefixes that answer with the given status instead
    pub fail: Vec<(String, u16)>,
    /// "METHOD /path" prefixes that stall for the given milliseconds first
    pub delay: Vec<(String, u64)>,
}

pub type SharedStore = Arc<Mutex<Store>>;

impl Store {
    fn next_user_id(&self) -> i64 {
        self.users.iter().map(|user| user.id).max().unwrap_or(0) + 1
    }

    fn next_team_id(&self) -> i64 {
        self.teams.iter().map(|team| team.id).max().unwrap_or(0) + 1
    }

    fn next_role_id(&self) -> i64 {
        self.roles.iter().map(|role| role.id).max().unwrap_or(0) + 1
    }

    fn next_mapping_id(&self) -> i64 {
        let rp = self.role_permissions.iter().filter_map(|m| m.id).max();
        let ut = self.user_teams.iter().filter_map(|m| m.id).max();
        rp.max(ut).unwrap_or(0) + 1
    }
}

/// Spawns the stub on an ephemeral port. The returned handle lets tests
/// mutate the store (seed, inject failures) while the client talks to it.
pub async fn spawn_backend(store: Store) -> (String, SharedStore) {
    let shared: SharedStore = Arc::new(Mutex::new(store));
    let app = backend_router(shared.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), shared)
}

pub fn client_for(base_url: &str) -> EntityClient {
    EntityClient::new(base_url, Duration::from_secs(5))
}

pub fn inject_failure(store: &SharedStore, pattern: &str, status: u16) {
    store
        .lock()
        .unwrap()
        .fail
        .push((pattern.to_string(), status));
}

pub fn inject_delay(store: &SharedStore, pattern: &str, millis: u64) {
    store
        .lock()
        .unwrap()
        .delay
        .push((pattern.to_string(), millis));
}

fn backend_router(store: SharedStore) -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", put(update_user).delete(delete_user))
        .route("/teams", get(list_teams).post(create_team))
        .route(
            "/teams/:id",
            get(get_team).put(update_team).delete(delete_team),
        )
        .route("/roles", get(list_roles).post(create_role))
        .route("/roles/:id", put(update_role).delete(delete_role))
        .route("/permissions", get(list_permissions).post(create_permission))
        .route(
            "/permissions/:id",
            put(update_permission).delete(delete_permission),
        )
        .route("/rolePermissions", get(list_role_permissions))
        .route("/roles/:id/permissions", axum::routing::post(assign_role_permissions))
        .route(
            "/roles/:id/permissions/:pid",
            delete(remove_role_permission),
        )
        .route("/userTeams", get(list_user_teams).post(add_user_team))
        .route("/userTeams/:id", delete(delete_user_team))
        .layer(middleware::from_fn_with_state(store.clone(), chaos_gate))
        .with_state(store)
}

/// Applies injected delays and failures before the request reaches a
/// handler.
async fn chaos_gate(State(store): State<SharedStore>, req: Request, next: Next) -> Response {
    let key = format!("{} {}", req.method(), req.uri().path());

    let (stall, forced) = {
        let store = store.lock().unwrap();
        let stall = store
            .delay
            .iter()
            .find(|(pattern, _)| key.starts_with(pattern.as_str()))
            .map(|(_, millis)| *millis);
        let forced = store
            .fail
            .iter()
            .find(|(pattern, _)| key.starts_with(pattern.as_str()))
            .map(|(_, status)| *status);
        (stall, forced)
    };

    if let Some(millis) = stall {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
    if let Some(status) = forced {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(json!({"error": "injected failure"}))).into_response();
    }

    next.run(req).await
}

#[derive(Deserialize)]
struct TeamFilter {
    #[serde(rename = "teamId")]
    team_id: Option<i64>,
}

// Users

async fn list_users(
    State(store): State<SharedStore>,
    Query(filter): Query<TeamFilter>,
) -> Json<Vec<User>> {
    let store = store.lock().unwrap();
    let users = match filter.team_id {
        Some(team_id) => store
            .users
            .iter()
            .filter(|user| user.team_id == Some(team_id))
            .cloned()
            .collect(),
        None => store.users.clone(),
    };
    Json(users)
}

async fn create_user(State(store): State<SharedStore>, Json(body): Json<Value>) -> Response {
    let mut store = store.lock().unwrap();
    let mut body = body;
    body["id"] = json!(store.next_user_id());
    match serde_json::from_value::<User>(body) {
        Ok(user) => {
            store.users.push(user.clone());
            (StatusCode::CREATED, Json(user)).into_response()
        }
        Err(err) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": err.to_string()})),
        )
            .into_response(),
    }
}

async fn update_user(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
    Json(patch): Json<Value>,
) -> Response {
    let mut store = store.lock().unwrap();
    let Some(user) = store.users.iter_mut().find(|user| user.id == id) else {
        return not_found("user");
    };
    *user = merge(&*user, &patch);
    Json(user.clone()).into_response()
}

async fn delete_user(State(store): State<SharedStore>, Path(id): Path<i64>) -> StatusCode {
    let mut store = store.lock().unwrap();
    store.users.retain(|user| user.id != id);
    StatusCode::NO_CONTENT
}

// Teams

async fn list_teams(State(store): State<SharedStore>) -> Json<Vec<Team>> {
    Json(store.lock().unwrap().teams.clone())
}

async fn get_team(State(store): State<SharedStore>, Path(id): Path<i64>) -> Response {
    let store = store.lock().unwrap();
    match store.teams.iter().find(|team| team.id == id) {
        Some(team) => Json(team.clone()).into_response(),
        None => not_found("team"),
    }
}

async fn create_team(State(store): State<SharedStore>, Json(body): Json<Value>) -> Response {
    let mut store = store.lock().unwrap();
    let mut body = body;
    body["id"] = json!(store.next_team_id());
    match serde_json::from_value::<Team>(body) {
        Ok(team) => {
            store.teams.push(team.clone());
            (StatusCode::CREATED, Json(team)).into_response()
        }
        Err(err) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": err.to_string()})),
        )
            .into_response(),
    }
}

async fn update_team(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
    Json(patch): Json<Value>,
) -> Response {
    let mut store = store.lock().unwrap();
    let Some(team) = store.teams.iter_mut().find(|team| team.id == id) else {
        return not_found("team");
    };
    *team = merge(&*team, &patch);
    Json(team.clone()).into_response()
}

async fn delete_team(State(store): State<SharedStore>, Path(id): Path<i64>) -> StatusCode {
    let mut store = store.lock().unwrap();
    store.teams.retain(|team| team.id != id);
    StatusCode::NO_CONTENT
}

// Roles

async fn list_roles(State(store): State<SharedStore>) -> Json<Vec<Role>> {
    Json(store.lock().unwrap().roles.clone())
}

async fn create_role(State(store): State<SharedStore>, Json(body): Json<Value>) -> Response {
    let mut store = store.lock().unwrap();
    let mut body = body;
    body["id"] = json!(store.next_role_id());
    match serde_json::from_value::<Role>(body) {
        Ok(role) => {
            store.roles.push(role.clone());
            (StatusCode::CREATED, Json(role)).into_response()
        }
        Err(err) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": err.to_string()})),
        )
            .into_response(),
    }
}

async fn update_role(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
    Json(patch): Json<Value>,
) -> Response {
    let mut store = store.lock().unwrap();
    let Some(role) = store.roles.iter_mut().find(|role| role.id == id) else {
        return not_found("role");
    };
    *role = merge(&*role, &patch);
    Json(role.clone()).into_response()
}

async fn delete_role(State(store): State<SharedStore>, Path(id): Path<i64>) -> StatusCode {
    let mut store = store.lock().unwrap();
    store.roles.retain(|role| role.id != id);
    StatusCode::NO_CONTENT
}

// Permissions

async fn list_permissions(State(store): State<SharedStore>) -> Json<Vec<Permission>> {
    Json(store.lock().unwrap().permissions.clone())
}

async fn create_permission(State(store): State<SharedStore>, Json(body): Json<Value>) -> Response {
    let mut store = store.lock().unwrap();
    store.perm_seq += 1;
    let mut body = body;
    body["id"] = json!(format!("p{}", store.perm_seq));
    match serde_json::from_value::<Permission>(body) {
        Ok(permission) => {
            store.permissions.push(permission.clone());
            (StatusCode::CREATED, Json(permission)).into_response()
        }
        Err(err) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": err.to_string()})),
        )
            .into_response(),
    }
}

async fn update_permission(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> Response {
    let mut store = store.lock().unwrap();
    let Some(permission) = store.permissions.iter_mut().find(|perm| perm.id == id) else {
        return not_found("permission");
    };
    *permission = merge(&*permission, &patch);
    Json(permission.clone()).into_response()
}

async fn delete_permission(State(store): State<SharedStore>, Path(id): Path<String>) -> StatusCode {
    let mut store = store.lock().unwrap();
    store.permissions.retain(|perm| perm.id != id);
    StatusCode::NO_CONTENT
}

// Mappings

async fn list_role_permissions(State(store): State<SharedStore>) -> Json<Vec<RolePermission>> {
    Json(store.lock().unwrap().role_permissions.clone())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignBody {
    permission_ids: Vec<String>,
}

async fn assign_role_permissions(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
    Json(body): Json<AssignBody>,
) -> Response {
    let mut store = store.lock().unwrap();
    if !store.roles.iter().any(|role| role.id == id) {
        return not_found("role");
    }
    for permission_id in body.permission_ids {
        let mapping_id = store.next_mapping_id();
        store.role_permissions.push(RolePermission {
            id: Some(mapping_id),
            role_id: id,
            permission_id: permission_id.clone(),
        });
        if let Some(role) = store.roles.iter_mut().find(|role| role.id == id) {
            if !role.permissions.contains(&permission_id) {
                role.permissions.push(permission_id);
            }
        }
    }
    StatusCode::CREATED.into_response()
}

async fn remove_role_permission(
    State(store): State<SharedStore>,
    Path((id, pid)): Path<(i64, String)>,
) -> StatusCode {
    let mut store = store.lock().unwrap();
    store
        .role_permissions
        .retain(|mapping| !(mapping.role_id == id && mapping.permission_id == pid));
    if let Some(role) = store.roles.iter_mut().find(|role| role.id == id) {
        role.permissions.retain(|permission_id| permission_id != &pid);
    }
    StatusCode::NO_CONTENT
}

async fn list_user_teams(State(store): State<SharedStore>) -> Json<Vec<UserTeam>> {
    Json(store.lock().unwrap().user_teams.clone())
}

async fn add_user_team(State(store): State<SharedStore>, Json(body): Json<Value>) -> Response {
    let mut store = store.lock().unwrap();
    let mut body = body;
    body["id"] = json!(store.next_mapping_id());
    match serde_json::from_value::<UserTeam>(body) {
        Ok(mapping) => {
            store.user_teams.push(mapping.clone());
            (StatusCode::CREATED, Json(mapping)).into_response()
        }
        Err(err) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": err.to_string()})),
        )
            .into_response(),
    }
}

async fn delete_user_team(State(store): State<SharedStore>, Path(id): Path<i64>) -> StatusCode {
    let mut store = store.lock().unwrap();
    store.user_teams.retain(|mapping| mapping.id != Some(id));
    StatusCode::NO_CONTENT
}

// Shared plumbing

fn not_found(entity: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": format!("{} not found", entity)})),
    )
        .into_response()
}

/// PUT semantics of the backend: patch keys overwrite the stored record,
/// everything else is preserved, and the merged record is echoed back.
fn merge<T: serde::Serialize + serde::de::DeserializeOwned>(current: &T, patch: &Value) -> T {
    let mut merged = serde_json::to_value(current).unwrap();
    if let (Some(target), Some(source)) = (merged.as_object_mut(), patch.as_object()) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }
    serde_json::from_value(merged).unwrap()
}

// Seed data

pub fn seeded_store() -> Store {
    let permissions = vec![
        perm("p1", "read", None),
        perm("p2", "write", Some("p1")),
        perm("p3", "delete", Some("p1")),
    ];
    Store {
        users: vec![
            user(1, "Alice", "alice@example.com", 1, Some(1)),
            user(2, "Bob", "bob@example.com", 2, None),
        ],
        teams: vec![
            team(1, "Sales", "Sells things"),
            team(2, "Development", "Builds things"),
        ],
        roles: vec![
            role(1, "admin", Some(1), &["p1", "p2", "p3"]),
            role(2, "team_member", Some(2), &["p1"]),
        ],
        perm_seq: permissions.len(),
        permissions,
        ..Store::default()
    }
}

pub fn user(id: i64, name: &str, email: &str, role_id: i64, team_id: Option<i64>) -> User {
    User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        role_id,
        team_id,
        status: crewdeck::models::UserStatus::Active,
    }
}

pub fn team(id: i64, name: &str, description: &str) -> Team {
    Team {
        id,
        name: name.to_string(),
        description: description.to_string(),
    }
}

pub fn role(id: i64, name: &str, team_id: Option<i64>, permissions: &[&str]) -> Role {
    Role {
        id,
        name: name.to_string(),
        team_id,
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
    }
}

pub fn perm(id: &str, name: &str, parent_id: Option<&str>) -> Permission {
    Permission {
        id: id.to_string(),
        name: name.to_string(),
        parent_id: parent_id.map(str::to_string),
    }
}
