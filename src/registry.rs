use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::RegistryError;
use crate::protocol::ServerMessage;
use crate::session::{Session, SessionContext};

/// Transport-assigned identifier of one live connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A session behind its own lock; holding it serialises work on that connection
pub type SessionHandle = Arc<tokio::sync::Mutex<Session>>;

/// Live sessions keyed by connection id
///
/// The map lock is only held for insert and remove, so connections never
/// wait on each other's message handling.
pub struct SessionRegistry {
    context: Arc<SessionContext>,
    sessions: Mutex<HashMap<ConnectionId, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new(context: Arc<SessionContext>) -> Self {
        Self {
            context,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<ConnectionId, SessionHandle>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create and store a session. An id that is still live is rejected.
    pub fn on_connect(
        &self,
        id: ConnectionId,
        outbound: mpsc::Sender<ServerMessage>,
    ) -> Result<SessionHandle, RegistryError> {
        let mut sessions = self.sessions();
        if sessions.contains_key(&id) {
            return Err(RegistryError::DuplicateConnection(id));
        }

        let session = Arc::new(tokio::sync::Mutex::new(Session::new(id, self.context.clone(), outbound)));
        sessions.insert(id, session.clone());
        info!("[{id}] connected ({} live sessions)", sessions.len());
        Ok(session)
    }

    /// Close and remove the session for `id`. Returns `false` if it was already gone.
    ///
    /// The entry stays in the map until the session has closed, so a connect
    /// reusing `id` is rejected while the old session is shutting down.
    pub async fn on_disconnect(&self, id: ConnectionId) -> bool {
        let Some(session) = self.get(id) else {
            debug!("[{id}] disconnect for unknown session ignored");
            return false;
        };

        let mut closing = session.lock().await;
        closing.close();
        let removed = {
            let mut sessions = self.sessions();
            match sessions.get(&id) {
                Some(current) if Arc::ptr_eq(current, &session) => sessions.remove(&id).is_some(),
                _ => false,
            }
        };
        drop(closing);

        if removed {
            info!("[{id}] disconnected");
        } else {
            debug!("[{id}] session already removed by a concurrent disconnect");
        }
        removed
    }

    pub fn get(&self, id: ConnectionId) -> Option<SessionHandle> {
        self.sessions().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }

    /// Close every session, used on shutdown
    pub async fn close_all(&self) {
        let drained: Vec<_> = self.sessions().drain().collect();
        for (id, session) in drained {
            session.lock().await.close();
            debug!("[{id}] closed on shutdown");
        }
    }
}
