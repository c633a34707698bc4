//! Session - One user's conversation with a persona

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use meowchat::{ConversationPhase, DomainError, PersonaCatalog, Turn};

use super::PersonaSummary;
use crate::application::Session;

/// Rendered turn
#[derive(Debug, Serialize, ToSchema)]
pub struct TurnResponse {
    /// "user" or "assistant"
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Session with its full conversation
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub id: Uuid,
    pub persona: PersonaSummary,
    /// "idle" or "active"
    pub phase: String,
    pub turns: Vec<TurnResponse>,
    /// Offered only while the conversation is idle
    pub conversation_starters: Vec<String>,
    pub created_at: DateTime<Utc>,
}

// ============================================
// Request/Response DTOs
// ============================================

/// Create session request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    /// Persona to start with; the catalog default when omitted
    pub persona_id: Option<String>,
}

/// Submit message request
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitMessageRequest {
    pub content: String,
}

/// Submit message response
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitMessageResponse {
    pub reply: TurnResponse,
    pub session: SessionResponse,
}

/// Switch persona request
#[derive(Debug, Deserialize, ToSchema)]
pub struct SwitchPersonaRequest {
    pub persona_id: String,
}

/// Switch persona response
#[derive(Debug, Serialize, ToSchema)]
pub struct SwitchPersonaResponse {
    /// False when the requested persona was already active
    pub switched: bool,
    pub session: SessionResponse,
}

impl From<&Turn> for TurnResponse {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role.to_string(),
            content: turn.content.clone(),
            created_at: turn.created_at,
        }
    }
}

impl SessionResponse {
    pub fn build(session: &Session, catalog: &PersonaCatalog) -> Result<Self, DomainError> {
        let conversation = &session.conversation;
        let persona = catalog.lookup(conversation.active_persona_id())?;
        let phase = conversation.phase();

        let conversation_starters = if phase == ConversationPhase::Idle {
            catalog.household().conversation_starters.clone()
        } else {
            Vec::new()
        };

        Ok(Self {
            id: session.id,
            persona: persona.into(),
            phase: phase.to_string(),
            turns: conversation.turns().iter().map(Into::into).collect(),
            conversation_starters,
            created_at: session.created_at,
        })
    }
}
