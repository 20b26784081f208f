//! High-level back-office client and its request pipeline
//!
//! Every call goes through [`Client::execute`]:
//!
//! 1. the current access token is attached as a bearer credential (none,
//!    none sent);
//! 2. a 401 on the first attempt hands off to the
//!    [`RefreshCoordinator`](crate::auth::RefreshCoordinator) and the request
//!    is replayed once with the new token;
//! 3. any other failure is reported to the [`Notifier`] exactly once and
//!    returned to the caller.
//!
//! Nothing else retries. Repeating a failed mutation is left to the admin.

use crate::auth::RefreshCoordinator;
use crate::cache::{QueryCache, QueryKey};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::idempotency::{IdempotencyKey, IDEMPOTENCY_KEY_HEADER};
use crate::notify::{Notifier, TracingNotifier};
use crate::resources::{
    ActivityApi, AdminsApi, AuthApi, DashboardApi, LoansApi, SavingsApi, SettingsApi,
    TransactionsApi, TransfersApi, UsersApi,
};
use crate::session::{FileSessionStore, MemorySessionStore, SessionContext, SessionStore};
use mp_common::{ApiResponse, Collection, ErrorBody, Page, GENERIC_ERROR_MESSAGE};
use mp_config::{AppConfig, SessionStoreKind};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// One request on its way through the pipeline.
///
/// The attempt number replaces any hidden "already retried" flag: attempt 1
/// may be recovered by a refresh, a replay may not.
#[derive(Debug)]
pub struct Attempt {
    request: reqwest::Request,
    attempt: u32,
}

impl Attempt {
    pub fn new(request: reqwest::Request) -> Self {
        Self {
            request,
            attempt: 1,
        }
    }

    pub fn number(&self) -> u32 {
        self.attempt
    }

    pub fn is_replay(&self) -> bool {
        self.attempt > 1
    }

    pub fn into_replay(self) -> Self {
        Self {
            request: self.request,
            attempt: self.attempt + 1,
        }
    }

    /// The request to put on the wire, carrying `token` if there is one.
    ///
    /// Every other header (the idempotency key in particular) is copied
    /// unchanged, so a replay is byte-for-byte the original submission.
    pub fn outgoing(&self, token: Option<&str>) -> Result<reqwest::Request> {
        let mut request = self
            .request
            .try_clone()
            .ok_or_else(|| Error::Other("Request body cannot be replayed".into()))?;

        let headers = request.headers_mut();
        headers.remove(AUTHORIZATION);
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| Error::Other("Access token is not a valid header value".into()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Ok(request)
    }

    pub fn request(&self) -> &reqwest::Request {
        &self.request
    }
}

/// Whether a 401 may be answered with a token refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recovery {
    Refresh,
    /// Credential endpoints: a 401 there means bad credentials, not expiry.
    Never,
}

/// MyPrime back-office API client
///
/// Cheap to clone; clones share the session, cache and refresh gate.
#[derive(Clone)]
pub struct Client {
    config: Arc<Config>,
    http_client: reqwest::Client,
    session: SessionContext,
    notifier: Arc<dyn Notifier>,
    refresh: Arc<RefreshCoordinator>,
    cache: Arc<QueryCache>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.config.base_url)
            .field("session", &self.session)
            .finish()
    }
}

impl Client {
    /// Create a client with the default (tracing) notifier.
    pub fn new(config: Config, session: SessionContext) -> Result<Self> {
        Self::with_notifier(config, session, Arc::new(TracingNotifier))
    }

    pub fn with_notifier(
        config: Config,
        session: SessionContext,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let cache = Arc::new(QueryCache::new());
        let refresh = RefreshCoordinator::new(
            http_client.clone(),
            config.refresh_url(),
            notifier.clone(),
            cache.clone(),
        );

        Ok(Self {
            config: Arc::new(config),
            http_client,
            session,
            notifier,
            refresh: Arc::new(refresh),
            cache,
        })
    }

    /// Build a client from application configuration, restoring any
    /// persisted session from the configured store.
    pub fn from_app_config(app: &AppConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        app.validate().map_err(|e| Error::Config(e.to_string()))?;
        let store: Arc<dyn SessionStore> = match app.session.store {
            SessionStoreKind::File => Arc::new(FileSessionStore::new(&app.session.path)),
            SessionStoreKind::Memory => Arc::new(MemorySessionStore::new()),
        };
        Self::with_notifier(Config::from(app), SessionContext::restore(store), notifier)
    }

    // ------------------------------------------------------------------
    // Resources
    // ------------------------------------------------------------------

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn admins(&self) -> AdminsApi<'_> {
        AdminsApi::new(self)
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    pub fn loans(&self) -> LoansApi<'_> {
        LoansApi::new(self)
    }

    pub fn savings(&self) -> SavingsApi<'_> {
        SavingsApi::new(self)
    }

    pub fn transfers(&self) -> TransfersApi<'_> {
        TransfersApi::new(self)
    }

    pub fn transactions(&self) -> TransactionsApi<'_> {
        TransactionsApi::new(self)
    }

    pub fn activity(&self) -> ActivityApi<'_> {
        ActivityApi::new(self)
    }

    pub fn settings(&self) -> SettingsApi<'_> {
        SettingsApi::new(self)
    }

    pub fn dashboard(&self) -> DashboardApi<'_> {
        DashboardApi::new(self)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    // ------------------------------------------------------------------
    // Pipeline
    // ------------------------------------------------------------------

    /// Request builder for `path` under the base URL. Authentication is
    /// added by [`execute`](Self::execute), not here.
    pub fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.http_client.request(method, self.config.url(path))
    }

    /// Like [`request`](Self::request), with caller-supplied ids appended as
    /// percent-encoded path segments.
    pub(crate) fn request_at(
        &self,
        method: Method,
        path: &str,
        segments: &[&str],
    ) -> Result<reqwest::RequestBuilder> {
        let url = self
            .config
            .url_with_segments(path, segments)
            .map_err(|e| self.surface(e))?;
        Ok(self.http_client.request(method, url))
    }

    /// Attach an idempotency key. The key becomes part of the request, so a
    /// refresh replay resends it unchanged.
    pub fn idempotent(
        &self,
        builder: reqwest::RequestBuilder,
        key: &IdempotencyKey,
    ) -> reqwest::RequestBuilder {
        builder.header(IDEMPOTENCY_KEY_HEADER, key.as_str())
    }

    /// Send a request through the pipeline; yields the response only on 2xx.
    pub async fn execute(&self, request: reqwest::Request) -> Result<reqwest::Response> {
        self.run(Attempt::new(request), Recovery::Refresh).await
    }

    async fn run(&self, mut attempt: Attempt, recovery: Recovery) -> Result<reqwest::Response> {
        loop {
            let token = match recovery {
                Recovery::Refresh => self.session.access_token(),
                Recovery::Never => None,
            };
            let outgoing = attempt
                .outgoing(token.as_deref())
                .map_err(|e| self.surface(e))?;

            debug!(
                method = %outgoing.method(),
                path = outgoing.url().path(),
                attempt = attempt.number(),
                authenticated = token.is_some(),
                "Sending request"
            );

            let response = match self.http_client.execute(outgoing).await {
                Ok(response) => response,
                Err(e) => return Err(self.surface(Error::Http(e))),
            };

            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            if status == StatusCode::UNAUTHORIZED && recovery == Recovery::Refresh {
                if attempt.is_replay() {
                    // Fresh token rejected as well: give up on this request
                    // but leave the session to the caller.
                    let message = error_message(response).await;
                    return Err(Error::Unauthorized(message));
                }
                // SessionExpired propagates without a toast; the login
                // redirect is the user-visible signal.
                self.refresh
                    .recover(&self.session, token.as_deref())
                    .await?;
                attempt = attempt.into_replay();
                continue;
            }

            let message = error_message(response).await;
            return Err(self.surface(Error::from_status(status, message)));
        }
    }

    /// Report `err` to the admin once and hand it back.
    fn surface(&self, err: Error) -> Error {
        self.notifier.error(&err.user_message());
        err
    }

    fn build(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Request> {
        builder.build().map_err(|e| self.surface(Error::Http(e)))
    }

    /// Decode a successful body into `T`, reporting undecodable or
    /// unexpected bodies once.
    async fn decode<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        resource: &str,
    ) -> Result<T> {
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.surface(Error::Http(e))),
        };
        match serde_json::from_slice::<T>(&bytes) {
            Ok(value) => Ok(value),
            Err(e) => {
                let err = match serde_json::from_slice::<serde_json::Value>(&bytes) {
                    Ok(value) => {
                        let shape = describe_shape(&value);
                        warn!(resource, %shape, error = %e, "Response does not match the documented shape");
                        Error::UnexpectedShape(format!("{}: {} (got {})", resource, e, shape))
                    }
                    Err(_) => Error::Json(e),
                };
                Err(self.surface(err))
            }
        }
    }

    /// Envelope call returning its `data`.
    pub(crate) async fn data<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        resource: &str,
    ) -> Result<T> {
        let envelope: ApiResponse<T> = self.envelope(builder, resource, Recovery::Refresh).await?;
        match envelope.data {
            Some(data) => Ok(data),
            None => {
                warn!(resource, "Envelope carried no data");
                Err(self.surface(Error::UnexpectedShape(format!(
                    "{}: response carried no data",
                    resource
                ))))
            }
        }
    }

    /// Envelope call where only success matters; yields the server message.
    pub(crate) async fn ack(
        &self,
        builder: reqwest::RequestBuilder,
        resource: &str,
    ) -> Result<Option<String>> {
        let envelope: ApiResponse<serde_json::Value> =
            self.envelope(builder, resource, Recovery::Refresh).await?;
        Ok(envelope.message)
    }

    /// Credential call: no bearer token and no refresh on 401.
    pub(crate) async fn credential_data<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        resource: &str,
    ) -> Result<T> {
        let envelope: ApiResponse<T> = self.envelope(builder, resource, Recovery::Never).await?;
        envelope.data.ok_or_else(|| {
            self.surface(Error::UnexpectedShape(format!(
                "{}: response carried no data",
                resource
            )))
        })
    }

    async fn envelope<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        resource: &str,
        recovery: Recovery,
    ) -> Result<ApiResponse<T>> {
        let request = self.build(builder)?;
        let response = self.run(Attempt::new(request), recovery).await?;
        let status = response.status();
        let envelope: ApiResponse<T> = self.decode(response, resource).await?;
        if !envelope.is_success() {
            let message = envelope
                .message
                .clone()
                .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());
            return Err(self.surface(Error::Api {
                status: status.as_u16(),
                message,
            }));
        }
        Ok(envelope)
    }

    /// Paginated collection call.
    pub(crate) async fn page<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        resource: &str,
    ) -> Result<Page<T>> {
        let request = self.build(builder)?;
        let response = self.execute(request).await?;
        let status = response.status();
        let collection: Collection<T> = self.decode(response, resource).await?;
        if collection.success == Some(false) {
            let message = collection
                .message
                .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());
            return Err(self.surface(Error::Api {
                status: status.as_u16(),
                message,
            }));
        }
        Ok(Page {
            items: collection.data,
            pagination: collection.pagination,
        })
    }

    // ------------------------------------------------------------------
    // Query cache
    // ------------------------------------------------------------------

    pub(crate) async fn cached<T, F, Fut>(&self, key: QueryKey, stale: Duration, loader: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.cache.fetch(key, stale, loader).await
    }

    /// Drop cached queries under each prefix.
    pub fn invalidate(&self, prefixes: &[&[&str]]) {
        for prefix in prefixes {
            self.cache.invalidate(&QueryKey::new(prefix.iter().copied()));
        }
    }

    pub(crate) fn notify_success(&self, message: &str) {
        self.notifier.success(message);
    }
}

async fn error_message(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    ErrorBody::message_from(&body).unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string())
}

/// Short structural summary of a JSON value, for schema-mismatch logs.
fn describe_shape(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
            keys.sort_unstable();
            format!("object{{{}}}", keys.join(","))
        }
        serde_json::Value::Array(items) => format!("array[{}]", items.len()),
        serde_json::Value::String(_) => "string".into(),
        serde_json::Value::Number(_) => "number".into(),
        serde_json::Value::Bool(_) => "bool".into(),
        serde_json::Value::Null => "null".into(),
    }
}
