//! Open till sessions, keyed by a random id handed to the client.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use domain::PosSession;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Identifier of an open session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for SessionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// A session shared between the handlers working on it.
///
/// Holding the lock across a store call keeps other requests for the same
/// session waiting until the call has finished.
pub type SharedSession = Arc<Mutex<PosSession>>;

/// Sessions held in memory until closed or until the server stops.
///
/// Nothing here is persisted: restarting the server drops every unsaved
/// ticket.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, SharedSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an empty session and returns its id.
    pub async fn open(&self) -> SessionId {
        let id = SessionId::new();
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(PosSession::new())));
        tracing::debug!(session_id = %id, "session opened");
        id
    }

    /// Discards a session and whatever it held. Returns false if it did not exist.
    pub async fn close(&self, id: SessionId) -> bool {
        let closed = self.sessions.write().await.remove(&id).is_some();
        if closed {
            tracing::debug!(session_id = %id, "session closed");
        }
        closed
    }

    /// Returns the shared handle of a session.
    pub async fn handle(&self, id: SessionId) -> Option<SharedSession> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Returns a copy of the session.
    pub async fn get(&self, id: SessionId) -> Option<PosSession> {
        let handle = self.handle(id).await?;
        let session = handle.lock().await;
        Some(session.clone())
    }

    /// Runs `f` against the session in place.
    ///
    /// Returns `None` without calling `f` if the session does not exist.
    pub async fn update<R>(&self, id: SessionId, f: impl FnOnce(&mut PosSession) -> R) -> Option<R> {
        let handle = self.handle(id).await?;
        let mut session = handle.lock().await;
        Some(f(&mut session))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
