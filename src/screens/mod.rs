//! Per-screen view state.
//!
//! Each screen owns its loaded collections, a lifecycle phase, and the last
//! error message. State is constructed fresh on screen entry and mutated
//! request-then-update: nothing changes locally until the backend call has
//! resolved. Screens do not share collections; every screen re-fetches what
//! it renders.

pub mod all_users;
pub mod permissions;
pub mod roles;
pub mod team_users;
pub mod teams;

pub use all_users::AllUsersScreen;
pub use permissions::PermissionsScreen;
pub use roles::RolesScreen;
pub use team_users::TeamUsersScreen;
pub use teams::TeamsScreen;

use thiserror::Error;

use crate::client::ClientError;

/// Screen lifecycle: `Idle -> Loading` on entry, then `Ready` or `Error`.
/// The error message outlives the phase and is only cleared by the next
/// successful operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

impl Phase {
    pub fn is_ready(&self) -> bool {
        matches!(self, Phase::Ready)
    }
}

/// Required-field check applied before any network call is made.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{field} is required.")]
pub struct ValidationError {
    pub field: &'static str,
}

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError { field })
    } else {
        Ok(())
    }
}

/// Outcome of a screen mutation, already converted to something the web
/// layer can branch on. The user-facing message is recorded on the screen
/// itself before this is returned.
#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Transport and HTTP failures read differently to an administrator: one
/// asks for a retry, the other points at the backend.
pub(crate) fn user_message(action: &str, err: &ClientError) -> String {
    match err {
        ClientError::Transport { .. } => {
            format!("Could not reach the server while {}. Please try again.", action)
        }
        ClientError::Api { status, .. } => {
            format!("The server rejected {} (HTTP {}).", action, status)
        }
    }
}
