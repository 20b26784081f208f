//! Admin session and token store
//!
//! A [`SessionContext`] is created once at startup, handed to the
//! [`Client`](crate::Client), and torn down with `clear_session` on logout.
//! Every mutation writes through to a [`SessionStore`] so a restarted
//! application resumes signed in. Expiry is never inspected locally; the
//! backend reports it with a 401.

use crate::dto::Admin;
use crate::error::{Error, Result};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// In-memory view of the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub admin: Option<Admin>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub is_authenticated: bool,
}

/// Persisted form, keyed the way the browser build stored it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    #[serde(rename = "admin_token", default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(rename = "admin_refresh_token", default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(rename = "admin-auth", default)]
    pub auth: PersistedAuth,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedAuth {
    pub admin: Option<Admin>,
    #[serde(default)]
    pub is_authenticated: bool,
}

impl From<&Session> for PersistedSession {
    fn from(session: &Session) -> Self {
        Self {
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            auth: PersistedAuth {
                admin: session.admin.clone(),
                is_authenticated: session.is_authenticated,
            },
        }
    }
}

impl From<PersistedSession> for Session {
    fn from(p: PersistedSession) -> Self {
        Self {
            // Without an access token the flag would lie about the session.
            is_authenticated: p.auth.is_authenticated && p.access_token.is_some(),
            admin: p.auth.admin,
            access_token: p.access_token,
            refresh_token: p.refresh_token,
        }
    }
}

/// Durable storage for the session.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<PersistedSession>>;
    fn save(&self, session: &PersistedSession) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Keeps the session for the lifetime of the process only.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<PersistedSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<PersistedSession>> {
        Ok(self.inner.lock().clone())
    }

    fn save(&self, session: &PersistedSession) -> Result<()> {
        *self.inner.lock() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.inner.lock() = None;
        Ok(())
    }
}

/// JSON file on disk. Writes go to a sibling temp file and are renamed into
/// place so a crash never leaves a half-written session.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, action: &str, err: std::io::Error) -> Error {
        Error::Other(format!(
            "Failed to {} session file {}: {}",
            action,
            self.path.display(),
            err
        ))
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<PersistedSession>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(None),
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error("read", e)),
        }
    }

    fn save(&self, session: &PersistedSession) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error("create directory for", e))?;
        }
        let body = serde_json::to_vec_pretty(session)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, body).map_err(|e| self.io_error("write", e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error("replace", e))
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error("remove", e)),
        }
    }
}

/// Shared handle to the current session.
///
/// Cloning is cheap; all clones observe the same session.
#[derive(Clone)]
pub struct SessionContext {
    state: Arc<RwLock<Session>>,
    store: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Tokens stay out of debug output.
        let state = self.state.read();
        f.debug_struct("SessionContext")
            .field("admin", &state.admin.as_ref().map(|a| a.id.as_str()))
            .field("is_authenticated", &state.is_authenticated)
            .finish()
    }
}

impl SessionContext {
    /// Start with an empty session backed by `store`.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            state: Arc::new(RwLock::new(Session::default())),
            store,
        }
    }

    /// Convenience for tests and short-lived tools.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    /// Resume whatever `store` holds. An unreadable store starts signed out.
    pub fn restore(store: Arc<dyn SessionStore>) -> Self {
        let session = match store.load() {
            Ok(Some(persisted)) => Session::from(persisted),
            Ok(None) => Session::default(),
            Err(e) => {
                warn!(error = %e, "Could not restore persisted session, starting signed out");
                Session::default()
            }
        };
        if session.is_authenticated {
            info!(
                admin_id = session.admin.as_ref().map(|a| a.id.as_str()).unwrap_or("-"),
                "Restored persisted session"
            );
        }
        Self {
            state: Arc::new(RwLock::new(session)),
            store,
        }
    }

    pub fn snapshot(&self) -> Session {
        self.state.read().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.read().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.state.read().refresh_token.clone()
    }

    pub fn admin(&self) -> Option<Admin> {
        self.state.read().admin.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated
    }

    /// Record a successful login.
    pub fn set_session(
        &self,
        admin: Admin,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) {
        let mut state = self.state.write();
        *state = Session {
            admin: Some(admin),
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
            is_authenticated: true,
        };
        self.persist(&state);
    }

    /// Drop tokens and profile, locally and in the store.
    pub fn clear_session(&self) {
        let mut state = self.state.write();
        *state = Session::default();
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear persisted session");
        }
    }

    /// Install tokens obtained from a refresh. A missing refresh token keeps
    /// the current one (the backend only rotates it sometimes).
    pub fn update_tokens(&self, access_token: impl Into<String>, refresh_token: Option<String>) {
        let mut state = self.state.write();
        state.access_token = Some(access_token.into());
        if let Some(refresh) = refresh_token {
            state.refresh_token = Some(refresh);
        }
        state.is_authenticated = true;
        self.persist(&state);
    }

    /// Replace the cached profile after an update. No-op when signed out.
    pub fn update_admin(&self, admin: Admin) {
        let mut state = self.state.write();
        if state.admin.is_none() {
            debug!("Ignoring profile update without an active session");
            return;
        }
        state.admin = Some(admin);
        self.persist(&state);
    }

    fn persist(&self, state: &Session) {
        // Persistence failure degrades to an in-memory session rather than
        // failing the request that produced the tokens.
        if let Err(e) = self.store.save(&PersistedSession::from(state)) {
            warn!(error = %e, "Failed to persist session");
        }
    }
}
