//! Browser-facing layer: axum routes and askama templates, one screen per
//! page. Handlers build a fresh screen state, drive it through the screen
//! controller, and render; successful mutations redirect back to the
//! screen's GET route.

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::Form as MultiForm;
use http::StatusCode;
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::client::EntityClient;
use crate::models::{
    NewPermission, NewRole, NewTeam, NewUser, PermissionPatch, RolePatch, Team, TeamPatch,
    UserPatch,
};
use crate::screens::{
    all_users::UserRow, permissions::TreeRow, roles::RoleRow, team_users::MemberRow,
    AllUsersScreen, PermissionsScreen, RolesScreen, TeamUsersScreen, TeamsScreen,
};

#[derive(Clone)]
pub struct AppState {
    pub client: EntityClient,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/users") }))
        .route("/users", get(show_users))
        .route("/users/create", post(create_user))
        .route("/users/:id/update", post(update_user))
        .route("/users/:id/delete", post(delete_user))
        .route("/teams", get(show_teams))
        .route("/teams/create", post(create_team))
        .route("/teams/:team_id/update", post(update_team))
        .route("/teams/:team_id/delete", post(delete_team))
        .route("/teams/:team_id/users", get(show_team_users))
        .route("/teams/:team_id/users/:id/update", post(update_team_user))
        .route("/teams/:team_id/users/:id/delete", post(delete_team_user))
        .route("/roles", get(show_roles))
        .route("/roles/create", post(create_role))
        .route("/roles/:id/update", post(update_role))
        .route("/roles/:id/delete", post(delete_role))
        .route("/permissions", get(show_permissions))
        .route("/permissions/create", post(create_permission))
        .route("/permissions/:id/update", post(update_permission))
        .route("/permissions/:id/delete", post(delete_permission))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

// Template structs

struct IdName {
    id: String,
    name: String,
}

struct UserEdit {
    id: i64,
    name: String,
    email: String,
}

struct RoleEdit {
    id: i64,
    name: String,
}

struct PermissionEdit {
    id: String,
    name: String,
}

struct PermChoice {
    id: String,
    name: String,
    checked: bool,
}

#[derive(Template)]
#[template(path = "users.html")]
struct UsersTemplate {
    error: Option<String>,
    rows: Vec<UserRow>,
    role_options: Vec<IdName>,
    team_options: Vec<IdName>,
    edit: Option<UserEdit>,
}

#[derive(Template)]
#[template(path = "team_users.html")]
struct TeamUsersTemplate {
    error: Option<String>,
    team_id: i64,
    team_name: String,
    rows: Vec<MemberRow>,
    role_options: Vec<IdName>,
    edit: Option<UserEdit>,
}

#[derive(Template)]
#[template(path = "teams.html")]
struct TeamsTemplate {
    error: Option<String>,
    teams: Vec<Team>,
    edit: Option<Team>,
}

#[derive(Template)]
#[template(path = "roles.html")]
struct RolesTemplate {
    error: Option<String>,
    rows: Vec<RoleRow>,
    team_options: Vec<IdName>,
    permission_choices: Vec<PermChoice>,
    filter_team_name: Option<String>,
    edit: Option<RoleEdit>,
}

#[derive(Template)]
#[template(path = "permissions.html")]
struct PermissionsTemplate {
    error: Option<String>,
    rows: Vec<TreeRow>,
    parent_options: Vec<IdName>,
    edit: Option<PermissionEdit>,
}

// Users

#[derive(Deserialize)]
struct UserPageQuery {
    edit: Option<i64>,
}

#[derive(Deserialize)]
struct CreateUserForm {
    name: String,
    email: String,
    role_id: String,
    team_id: String,
    status: String,
}

impl CreateUserForm {
    fn into_new_user(self) -> Result<NewUser, String> {
        let role_id = parse_id(&self.role_id).ok_or("A role selection is required.")?;
        let status = self
            .status
            .parse()
            .map_err(|_| "Unknown status value.".to_string())?;
        Ok(NewUser {
            name: self.name,
            email: self.email,
            role_id,
            team_id: parse_id(&self.team_id),
            status,
        })
    }
}

#[derive(Deserialize)]
struct UpdateUserForm {
    name: String,
    email: String,
    role_id: String,
    team_id: String,
    status: String,
}

impl UpdateUserForm {
    fn into_patch(self) -> UserPatch {
        UserPatch {
            name: non_empty(self.name),
            email: non_empty(self.email),
            role_id: parse_id(&self.role_id),
            team_id: parse_nullable_id(&self.team_id),
            status: self.status.parse().ok(),
        }
    }
}

async fn show_users(
    State(state): State<AppState>,
    Query(query): Query<UserPageQuery>,
) -> Response {
    let mut screen = AllUsersScreen::new();
    screen.load(&state.client).await;
    render_users(screen, query.edit)
}

async fn create_user(State(state): State<AppState>, Form(form): Form<CreateUserForm>) -> Response {
    let mut screen = AllUsersScreen::new();
    screen.load(&state.client).await;
    if !screen.phase.is_ready() {
        return render_users(screen, None);
    }

    match form.into_new_user() {
        Ok(user) => match screen.create_user(&state.client, user).await {
            Ok(()) => Redirect::to("/users").into_response(),
            Err(_) => render_users(screen, None),
        },
        Err(message) => {
            screen.error = Some(message);
            render_users(screen, None)
        }
    }
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<UpdateUserForm>,
) -> Response {
    let mut screen = AllUsersScreen::new();
    screen.load(&state.client).await;
    if !screen.phase.is_ready() {
        return render_users(screen, None);
    }

    match screen.update_user(&state.client, id, form.into_patch()).await {
        Ok(()) => Redirect::to("/users").into_response(),
        Err(_) => render_users(screen, Some(id)),
    }
}

async fn delete_user(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let mut screen = AllUsersScreen::new();
    screen.load(&state.client).await;
    if !screen.phase.is_ready() {
        return render_users(screen, None);
    }

    match screen.delete_user(&state.client, id).await {
        Ok(()) => Redirect::to("/users").into_response(),
        Err(_) => render_users(screen, None),
    }
}

fn render_users(screen: AllUsersScreen, edit: Option<i64>) -> Response {
    let edit = edit.and_then(|id| screen.user(id)).map(|user| UserEdit {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
    });

    let template = UsersTemplate {
        error: screen.error.clone(),
        rows: screen.rows(),
        role_options: screen
            .roles
            .iter()
            .map(|role| IdName {
                id: role.id.to_string(),
                name: role.name.clone(),
            })
            .collect(),
        team_options: screen
            .teams
            .iter()
            .map(|team| IdName {
                id: team.id.to_string(),
                name: team.name.clone(),
            })
            .collect(),
        edit,
    };
    HtmlTemplate(template).into_response()
}

// Team users

async fn show_team_users(
    State(state): State<AppState>,
    Path(team_id): Path<i64>,
    Query(query): Query<UserPageQuery>,
) -> Response {
    let mut screen = TeamUsersScreen::new();
    screen.load(&state.client, team_id).await;
    render_team_users(screen, team_id, query.edit)
}

async fn update_team_user(
    State(state): State<AppState>,
    Path((team_id, id)): Path<(i64, i64)>,
    Form(form): Form<UpdateUserForm>,
) -> Response {
    let mut screen = TeamUsersScreen::new();
    screen.load(&state.client, team_id).await;
    if !screen.phase.is_ready() {
        return render_team_users(screen, team_id, None);
    }

    match screen.update_user(&state.client, id, form.into_patch()).await {
        Ok(()) => Redirect::to(&format!("/teams/{}/users", team_id)).into_response(),
        Err(_) => render_team_users(screen, team_id, Some(id)),
    }
}

async fn delete_team_user(
    State(state): State<AppState>,
    Path((team_id, id)): Path<(i64, i64)>,
) -> Response {
    let mut screen = TeamUsersScreen::new();
    screen.load(&state.client, team_id).await;
    if !screen.phase.is_ready() {
        return render_team_users(screen, team_id, None);
    }

    match screen.delete_user(&state.client, id).await {
        Ok(()) => Redirect::to(&format!("/teams/{}/users", team_id)).into_response(),
        Err(_) => render_team_users(screen, team_id, None),
    }
}

fn render_team_users(screen: TeamUsersScreen, team_id: i64, edit: Option<i64>) -> Response {
    let edit = edit
        .and_then(|id| screen.users.iter().find(|user| user.id == id))
        .map(|user| UserEdit {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        });

    let template = TeamUsersTemplate {
        error: screen.error.clone(),
        team_id,
        team_name: screen.team_name(),
        rows: screen.rows(),
        role_options: screen
            .roles
            .iter()
            .map(|role| IdName {
                id: role.id.to_string(),
                name: role.name.clone(),
            })
            .collect(),
        edit,
    };
    HtmlTemplate(template).into_response()
}

// Teams

#[derive(Deserialize)]
struct TeamPageQuery {
    edit: Option<i64>,
}

#[derive(Deserialize)]
struct TeamForm {
    name: String,
    description: String,
}

async fn show_teams(
    State(state): State<AppState>,
    Query(query): Query<TeamPageQuery>,
) -> Response {
    let mut screen = TeamsScreen::new();
    screen.load(&state.client).await;
    render_teams(screen, query.edit)
}

async fn create_team(State(state): State<AppState>, Form(form): Form<TeamForm>) -> Response {
    let mut screen = TeamsScreen::new();
    screen.load(&state.client).await;
    if !screen.phase.is_ready() {
        return render_teams(screen, None);
    }

    let team = NewTeam {
        name: form.name,
        description: form.description,
    };
    match screen.create_team(&state.client, team).await {
        Ok(()) => Redirect::to("/teams").into_response(),
        Err(_) => render_teams(screen, None),
    }
}

async fn update_team(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<TeamForm>,
) -> Response {
    let mut screen = TeamsScreen::new();
    screen.load(&state.client).await;
    if !screen.phase.is_ready() {
        return render_teams(screen, None);
    }

    let patch = TeamPatch {
        name: non_empty(form.name),
        description: Some(form.description),
    };
    match screen.update_team(&state.client, id, patch).await {
        Ok(()) => Redirect::to("/teams").into_response(),
        Err(_) => render_teams(screen, Some(id)),
    }
}

async fn delete_team(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let mut screen = TeamsScreen::new();
    screen.load(&state.client).await;
    if !screen.phase.is_ready() {
        return render_teams(screen, None);
    }

    match screen.delete_team(&state.client, id).await {
        Ok(()) => Redirect::to("/teams").into_response(),
        Err(_) => render_teams(screen, None),
    }
}

fn render_teams(screen: TeamsScreen, edit: Option<i64>) -> Response {
    let edit = edit.and_then(|id| screen.team(id)).cloned();
    let template = TeamsTemplate {
        error: screen.error.clone(),
        teams: screen.teams.clone(),
        edit,
    };
    HtmlTemplate(template).into_response()
}

// Roles

// The filter select submits an empty teamId for "All Teams", so the value
// arrives as a string and is parsed leniently
#[derive(Deserialize)]
struct RolesPageQuery {
    #[serde(rename = "teamId", default)]
    team_id: String,
    edit: Option<i64>,
}

#[derive(Deserialize)]
struct RoleForm {
    name: String,
    team_id: String,
    #[serde(default)]
    permissions: Vec<String>,
}

async fn show_roles(
    State(state): State<AppState>,
    Query(query): Query<RolesPageQuery>,
) -> Response {
    let mut screen = RolesScreen::new();
    screen.load(&state.client).await;
    screen.selected_team_id = parse_id(&query.team_id);
    render_roles(screen, query.edit)
}

async fn create_role(
    State(state): State<AppState>,
    MultiForm(form): MultiForm<RoleForm>,
) -> Response {
    let mut screen = RolesScreen::new();
    screen.load(&state.client).await;
    if !screen.phase.is_ready() {
        return render_roles(screen, None);
    }

    let role = NewRole {
        name: form.name,
        team_id: parse_id(&form.team_id),
        permissions: form.permissions,
    };
    match screen.create_role(&state.client, role).await {
        Ok(()) => Redirect::to("/roles").into_response(),
        Err(_) => render_roles(screen, None),
    }
}

async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    MultiForm(form): MultiForm<RoleForm>,
) -> Response {
    let mut screen = RolesScreen::new();
    screen.load(&state.client).await;
    if !screen.phase.is_ready() {
        return render_roles(screen, None);
    }

    let patch = RolePatch {
        name: non_empty(form.name),
        team_id: parse_nullable_id(&form.team_id),
        permissions: if form.permissions.is_empty() {
            None
        } else {
            Some(form.permissions)
        },
    };
    match screen.update_role(&state.client, id, patch).await {
        Ok(()) => Redirect::to("/roles").into_response(),
        Err(_) => render_roles(screen, Some(id)),
    }
}

async fn delete_role(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let mut screen = RolesScreen::new();
    screen.load(&state.client).await;
    if !screen.phase.is_ready() {
        return render_roles(screen, None);
    }

    match screen.delete_role(&state.client, id).await {
        Ok(()) => Redirect::to("/roles").into_response(),
        Err(_) => render_roles(screen, None),
    }
}

fn render_roles(screen: RolesScreen, edit: Option<i64>) -> Response {
    let edit_role = edit.and_then(|id| screen.role(id));
    let permission_choices = screen
        .permissions
        .iter()
        .map(|perm| PermChoice {
            id: perm.id.clone(),
            name: perm.name.clone(),
            checked: edit_role
                .map(|role| role.permissions.contains(&perm.id))
                .unwrap_or(false),
        })
        .collect();
    let edit = edit_role.map(|role| RoleEdit {
        id: role.id,
        name: role.name.clone(),
    });

    let template = RolesTemplate {
        error: screen.error.clone(),
        rows: screen.rows(),
        team_options: screen
            .teams
            .iter()
            .map(|team| IdName {
                id: team.id.to_string(),
                name: team.name.clone(),
            })
            .collect(),
        permission_choices,
        filter_team_name: screen.selected_team_id.and_then(|id| {
            screen
                .teams
                .iter()
                .find(|team| team.id == id)
                .map(|team| team.name.clone())
        }),
        edit,
    };
    HtmlTemplate(template).into_response()
}

// Permissions

#[derive(Deserialize)]
struct PermissionPageQuery {
    edit: Option<String>,
}

#[derive(Deserialize)]
struct PermissionForm {
    name: String,
    parent_id: String,
}

async fn show_permissions(
    State(state): State<AppState>,
    Query(query): Query<PermissionPageQuery>,
) -> Response {
    let mut screen = PermissionsScreen::new();
    screen.load(&state.client).await;
    render_permissions(screen, query.edit)
}

async fn create_permission(
    State(state): State<AppState>,
    Form(form): Form<PermissionForm>,
) -> Response {
    let mut screen = PermissionsScreen::new();
    screen.load(&state.client).await;
    if !screen.phase.is_ready() {
        return render_permissions(screen, None);
    }

    let permission = NewPermission {
        name: form.name,
        parent_id: non_empty(form.parent_id),
    };
    match screen.create_permission(&state.client, permission).await {
        Ok(()) => Redirect::to("/permissions").into_response(),
        Err(_) => render_permissions(screen, None),
    }
}

async fn update_permission(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<PermissionForm>,
) -> Response {
    let mut screen = PermissionsScreen::new();
    screen.load(&state.client).await;
    if !screen.phase.is_ready() {
        return render_permissions(screen, None);
    }

    let patch = PermissionPatch {
        name: Some(form.name),
        parent_id: Some(non_empty(form.parent_id)),
    };
    match screen.update_permission(&state.client, &id, patch).await {
        Ok(()) => Redirect::to("/permissions").into_response(),
        Err(_) => render_permissions(screen, Some(id)),
    }
}

async fn delete_permission(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let mut screen = PermissionsScreen::new();
    screen.load(&state.client).await;
    if !screen.phase.is_ready() {
        return render_permissions(screen, None);
    }

    match screen.delete_permission(&state.client, &id).await {
        Ok(()) => Redirect::to("/permissions").into_response(),
        Err(_) => render_permissions(screen, None),
    }
}

fn render_permissions(screen: PermissionsScreen, edit: Option<String>) -> Response {
    let edit = edit
        .and_then(|id| screen.find(&id))
        .map(|perm| PermissionEdit {
            id: perm.id,
            name: perm.name,
        });

    let template = PermissionsTemplate {
        error: screen.error.clone(),
        rows: screen.tree_rows(),
        parent_options: screen
            .parent_choices()
            .into_iter()
            .map(|perm| IdName {
                id: perm.id,
                name: perm.name,
            })
            .collect(),
        edit,
    };
    HtmlTemplate(template).into_response()
}

// Form field helpers

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn parse_id(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        trimmed.parse().ok()
    }
}

/// Three-way select value: "" leaves the field untouched, "none" clears it,
/// anything else is an id.
fn parse_nullable_id(raw: &str) -> Option<Option<i64>> {
    match raw.trim() {
        "" => None,
        "none" => Some(None),
        other => other.parse().ok().map(Some),
    }
}

// Helper to render Askama templates
struct HtmlTemplate<T>(T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}
