//! In-memory session registry
//!
//! Every session owns one Conversation behind its own mutex, so actions on
//! one session are serialised while different sessions never contend.
//! Nothing outlives the process.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

use meowchat::Conversation;

use super::ServiceError;

/// One user's chat session
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub conversation: Conversation,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(conversation: Conversation) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation,
            created_at: Utc::now(),
        }
    }
}

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: Session) -> Uuid {
        let id = session.id;
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(session)));
        id
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<Mutex<Session>>> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Lock a session without waiting for an action already in flight
    pub async fn try_lock(&self, id: Uuid) -> Result<OwnedMutexGuard<Session>, ServiceError> {
        let session = self
            .get(id)
            .await
            .ok_or(ServiceError::SessionNotFound(id))?;
        session
            .try_lock_owned()
            .map_err(|_| ServiceError::SessionBusy(id))
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
