//! Render-time resolution of foreign-key ids into display names.
//!
//! All lookups are linear scans over the screen's loaded collections,
//! which is fine at admin-console scale (tens to low thousands of rows);
//! no index is kept.

use crate::models::{Permission, Role, Team, User};

/// Name of the user's role, or the literal "N/A" when unresolved.
pub fn role_name(user: &User, roles: &[Role]) -> String {
    roles
        .iter()
        .find(|role| role.id == user.role_id)
        .map(|role| role.name.clone())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Name of the user's team, or "N/A" when the user has no team or the
/// reference does not resolve.
pub fn team_name(user: &User, teams: &[Team]) -> String {
    user.team_id
        .and_then(|id| teams.iter().find(|team| team.id == id))
        .map(|team| team.name.clone())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Names of the role's permissions in the role's stored order. References
/// that fail to resolve are dropped, never replaced with a placeholder;
/// callers render "No Permissions" for an empty result.
pub fn permission_names(role: &Role, permissions: &[Permission]) -> Vec<String> {
    role.permissions
        .iter()
        .filter_map(|id| {
            permissions
                .iter()
                .find(|perm| &perm.id == id)
                .map(|perm| perm.name.clone())
        })
        .collect()
}

/// Comma-joined permission names with the empty-case fallback the screens
/// display.
pub fn permission_summary(role: &Role, permissions: &[Permission]) -> String {
    let names = permission_names(role, permissions);
    if names.is_empty() {
        "No Permissions".to_string()
    } else {
        names.join(", ")
    }
}
