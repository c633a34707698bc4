//! Meowchat Domain Library
//!
//! Core domain types and interfaces for chatting with the household cats.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: Core domain models (Persona, Turn, Conversation, Household)
//!   - `value_objects/`: Immutable value types (TurnRole)
//!   - `services/`: PersonaCatalog and TurnOrchestrator
//!   - `errors/`: Domain-specific error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `services/`: External service interfaces (completion provider)
//!
//! # Usage
//!
//! ```rust,ignore
//! use meowchat::{Conversation, PersonaCatalog, TurnOrchestrator};
//!
//! let mut conversation = Conversation::new(catalog.default_persona());
//! let reply = orchestrator.submit(&catalog, &mut conversation, "Hi").await?;
//! ```

pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    CompletionError, Conversation, ConversationPhase, DomainError, Household, Persona,
    PersonaCatalog, PersonaFact, RetryPolicy, Turn, TurnOrchestrator, TurnRole, HISTORY_WINDOW,
};
pub use ports::{
    ChatMessage, CompletionOptions, CompletionProvider, CompletionResponse, MessageRole,
    TokenUsage,
};
