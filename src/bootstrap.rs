use std::time::Duration;

use crate::client::EntityClient;
use crate::config::Config;
use crate::web::AppState;

/// Builds the shared application state: one HTTP client for the upstream
/// backend, reused by every screen.
pub fn build_app_state(config: &Config) -> AppState {
    let client = EntityClient::new(
        &config.api_base_url,
        Duration::from_secs(config.request_timeout_secs),
    );
    tracing::info!(
        "Entity client initialized for {} (timeout {}s)",
        config.api_base_url,
        config.request_timeout_secs
    );

    AppState { client }
}
