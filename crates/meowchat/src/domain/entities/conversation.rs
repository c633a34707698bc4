//! Conversation - Per-session chat state
//!
//! Holds the active persona and the ordered turns exchanged with it.
//! Turns are append-only; the only way to drop them is a full clear,
//! which also happens whenever the active persona changes.

use serde::{Deserialize, Serialize};

use super::{Persona, Turn};

/// Observable phase of a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationPhase {
    /// No turns yet
    Idle,
    /// At least one turn
    Active,
}

impl std::fmt::Display for ConversationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversationPhase::Idle => write!(f, "idle"),
            ConversationPhase::Active => write!(f, "active"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    active_persona_id: String,
    turns: Vec<Turn>,
}

impl Conversation {
    /// Start an idle conversation with the given persona
    pub fn new(persona: &Persona) -> Self {
        Self {
            active_persona_id: persona.id.clone(),
            turns: Vec::new(),
        }
    }

    pub fn active_persona_id(&self) -> &str {
        &self.active_persona_id
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn phase(&self) -> ConversationPhase {
        if self.turns.is_empty() {
            ConversationPhase::Idle
        } else {
            ConversationPhase::Active
        }
    }

    /// Switch to another persona, dropping every turn.
    ///
    /// Returns `false` without touching the turns when `persona` is already active.
    pub fn switch_persona(&mut self, persona: &Persona) -> bool {
        if persona.id == self.active_persona_id {
            return false;
        }
        self.active_persona_id = persona.id.clone();
        self.turns.clear();
        true
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub(crate) fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }
}
