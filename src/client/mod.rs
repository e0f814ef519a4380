//! HTTP client for the upstream REST backend.
//!
//! One operation per (entity, verb) pair, split across the submodules. All
//! operations return decoded domain records on success and a [`ClientError`]
//! that keeps transport failures distinguishable from HTTP rejections —
//! screens phrase the two differently for the user.

mod mappings;
mod permissions;
mod roles;
mod teams;
mod users;

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// No usable response: connection refused, DNS failure, timeout, or an
    /// unreadable body.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-2xx status.
    #[error("{method} {url} returned {status}: {message}")]
    Api {
        method: &'static str,
        url: String,
        status: u16,
        message: String,
    },
}

impl ClientError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Transport { .. } => None,
            ClientError::Api { status, .. } => Some(*status),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Clone)]
pub struct EntityClient {
    http: reqwest::Client,
    base_url: String,
}

impl EntityClient {
    /// Builds a client with a bounded per-request wait. The backend never
    /// gets to hang a screen: expiry surfaces as a transport error.
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.url(path);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;
        decode("GET", url, response).await
    }

    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = self.url(path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;
        decode("POST", url, response).await
    }

    pub(crate) async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = self.url(path);
        let response = self
            .http
            .put(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;
        decode("PUT", url, response).await
    }

    /// POST where the backend replies with no meaningful body.
    pub(crate) async fn post_no_content<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<()> {
        let url = self.url(path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;
        expect_success("POST", url, response).await
    }

    /// DELETE has no response body; success means the caller may drop the
    /// local record.
    pub(crate) async fn delete(&self, path: &str) -> ClientResult<()> {
        let url = self.url(path);
        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;
        expect_success("DELETE", url, response).await
    }
}

async fn decode<T: DeserializeOwned>(
    method: &'static str,
    url: String,
    response: reqwest::Response,
) -> ClientResult<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(api_error(method, url, status.as_u16(), response).await);
    }

    response
        .json()
        .await
        .map_err(|source| ClientError::Transport { url, source })
}

async fn expect_success(
    method: &'static str,
    url: String,
    response: reqwest::Response,
) -> ClientResult<()> {
    let status = response.status();
    if !status.is_success() {
        return Err(api_error(method, url, status.as_u16(), response).await);
    }
    Ok(())
}

/// Pulls a human-readable message out of the error body when the backend
/// sends one ({"error": ...} or {"message": ...}), falling back to raw text.
async fn api_error(
    method: &'static str,
    url: String,
    status: u16,
    response: reqwest::Response,
) -> ClientError {
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .or_else(|| value.get("message"))
                .and_then(|msg| msg.as_str().map(str::to_string))
        })
        .unwrap_or_else(|| {
            if body.len() > 500 {
                body[..500].to_string()
            } else {
                body
            }
        });

    ClientError::Api {
        method,
        url,
        status,
        message,
    }
}
