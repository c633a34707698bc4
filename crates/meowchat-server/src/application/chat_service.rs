//! Chat Application Service (Use Case)
//!
//! Orchestrates session lifecycle and conversation transitions for the
//! HTTP layer. The catalog and completion provider are shared by all
//! sessions; each session's conversation is only touched under its lock.

use std::sync::Arc;
use uuid::Uuid;

use meowchat::{CompletionProvider, Conversation, PersonaCatalog, Turn, TurnOrchestrator};

use super::{ServiceError, Session, SessionStore};

/// Application service for chat sessions
pub struct ChatService<P: CompletionProvider + ?Sized> {
    catalog: Arc<PersonaCatalog>,
    orchestrator: TurnOrchestrator<P>,
    sessions: SessionStore,
}

impl<P: CompletionProvider + ?Sized> ChatService<P> {
    pub fn new(catalog: Arc<PersonaCatalog>, orchestrator: TurnOrchestrator<P>) -> Self {
        Self {
            catalog,
            orchestrator,
            sessions: SessionStore::new(),
        }
    }

    pub fn catalog(&self) -> &PersonaCatalog {
        &self.catalog
    }

    pub fn model_id(&self) -> &str {
        self.orchestrator.provider().model_id()
    }

    /// Start an idle session with `persona_id`, or the catalog default
    pub async fn create_session(&self, persona_id: Option<&str>) -> Result<Session, ServiceError> {
        let persona = match persona_id {
            Some(id) => self.catalog.lookup(id)?,
            None => self.catalog.default_persona(),
        };

        let session = Session::new(Conversation::new(persona));
        self.sessions.insert(session.clone()).await;

        tracing::info!("Created session {} with {}", session.id, persona.id);

        Ok(session)
    }

    /// Current state of a session; waits for an in-flight action to finish
    pub async fn get_session(&self, id: Uuid) -> Result<Session, ServiceError> {
        let session = self
            .sessions
            .get(id)
            .await
            .ok_or(ServiceError::SessionNotFound(id))?;
        let guard = session.lock().await;
        Ok(guard.clone())
    }

    pub async fn end_session(&self, id: Uuid) -> Result<(), ServiceError> {
        if !self.sessions.remove(id).await {
            return Err(ServiceError::SessionNotFound(id));
        }
        tracing::info!("Ended session {}", id);
        Ok(())
    }

    /// Submit a user message; returns the persona's reply and the updated session
    pub async fn submit(&self, id: Uuid, content: &str) -> Result<(Turn, Session), ServiceError> {
        let mut session = self.sessions.try_lock(id).await?;

        let reply = self
            .orchestrator
            .submit(&self.catalog, &mut session.conversation, content)
            .await?;

        tracing::info!(
            session = %id,
            persona = %session.conversation.active_persona_id(),
            turns = session.conversation.turns().len(),
            "Reply recorded"
        );

        Ok((reply, session.clone()))
    }

    /// Switch persona; returns whether anything changed
    pub async fn switch_persona(
        &self,
        id: Uuid,
        persona_id: &str,
    ) -> Result<(bool, Session), ServiceError> {
        let mut session = self.sessions.try_lock(id).await?;
        let persona = self.catalog.lookup(persona_id)?;

        let switched = session.conversation.switch_persona(persona);
        if switched {
            tracing::info!("Session {} switched to {}", id, persona.id);
        }

        Ok((switched, session.clone()))
    }

    pub async fn clear(&self, id: Uuid) -> Result<Session, ServiceError> {
        let mut session = self.sessions.try_lock(id).await?;
        session.conversation.clear();
        tracing::debug!("Cleared session {}", id);
        Ok(session.clone())
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.len().await
    }
}
