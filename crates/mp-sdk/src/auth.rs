//! Token refresh coordination
//!
//! When a request comes back 401, the pipeline asks the
//! [`RefreshCoordinator`] for a usable access token. Refreshes are
//! single-flight: callers queue on an async gate, and each one re-checks the
//! session after acquiring it. A caller whose stale token has already been
//! replaced reuses the new token, and a caller that finds the session
//! cleared fails immediately. However many requests fail together, only
//! one refresh call is made and every caller sees its outcome.

use crate::cache::QueryCache;
use crate::error::{Error, Result};
use crate::notify::Notifier;
use crate::session::SessionContext;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Tokens issued by the refresh endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// The refresh endpoint has answered both bare and enveloped.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RefreshResponse {
    Bare(RefreshedTokens),
    Enveloped { data: RefreshedTokens },
}

impl From<RefreshResponse> for RefreshedTokens {
    fn from(resp: RefreshResponse) -> Self {
        match resp {
            RefreshResponse::Bare(tokens) => tokens,
            RefreshResponse::Enveloped { data } => data,
        }
    }
}

pub struct RefreshCoordinator {
    http_client: reqwest::Client,
    refresh_url: String,
    notifier: Arc<dyn Notifier>,
    cache: Arc<QueryCache>,
    gate: Mutex<()>,
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refresh_url", &self.refresh_url)
            .finish()
    }
}

impl RefreshCoordinator {
    pub fn new(
        http_client: reqwest::Client,
        refresh_url: String,
        notifier: Arc<dyn Notifier>,
        cache: Arc<QueryCache>,
    ) -> Self {
        Self {
            http_client,
            refresh_url,
            notifier,
            cache,
            gate: Mutex::new(()),
        }
    }

    /// Produce an access token to replay a request that failed with 401
    /// while carrying `stale` (or no token at all).
    ///
    /// Returns [`Error::SessionExpired`] once the session cannot be
    /// recovered; by then the session and every cached query have been
    /// cleared and the login redirect sent.
    pub async fn recover(&self, session: &SessionContext, stale: Option<&str>) -> Result<String> {
        let _guard = self.gate.lock().await;

        // Double-check: someone may have resolved this while we waited.
        match (session.access_token(), stale) {
            (Some(current), _) if Some(current.as_str()) != stale => {
                debug!("Access token already refreshed by a concurrent request");
                return Ok(current);
            }
            (None, Some(_)) => {
                debug!("Session cleared by a concurrent request");
                return Err(Error::SessionExpired);
            }
            _ => {}
        }

        let Some(refresh_token) = session.refresh_token() else {
            info!("No refresh token available, ending session");
            self.end_session(session);
            return Err(Error::SessionExpired);
        };

        match self.refresh(&refresh_token).await {
            Ok(tokens) => {
                info!(rotated = tokens.refresh_token.is_some(), "Access token refreshed");
                let access = tokens.access_token.clone();
                session.update_tokens(tokens.access_token, tokens.refresh_token);
                Ok(access)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, ending session");
                self.end_session(session);
                Err(Error::SessionExpired)
            }
        }
    }

    /// Call the refresh endpoint. Uses the raw HTTP client so a 401 here is
    /// never fed back into the refresh path.
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens> {
        let response = self
            .http_client
            .post(&self.refresh_url)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = mp_common::ErrorBody::message_from(&body)
                .unwrap_or_else(|| format!("refresh rejected with status {}", status));
            return Err(Error::from_status(status, message));
        }

        let body: RefreshResponse = response.json().await?;
        let tokens = RefreshedTokens::from(body);
        if tokens.access_token.is_empty() {
            return Err(Error::UnexpectedShape(
                "refresh response carried an empty access token".into(),
            ));
        }
        Ok(tokens)
    }

    fn end_session(&self, session: &SessionContext) {
        session.clear_session();
        // Cached reads belong to the admin who just lost the session.
        self.cache.clear();
        self.notifier.redirect_to_login();
    }
}
