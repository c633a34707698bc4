//! Application Layer (Use Cases)
//!
//! Orchestrates domain operations and coordinates between
//! sessions and external services.

mod chat_service;
mod session_store;

pub use chat_service::ChatService;
pub use session_store::{Session, SessionStore};

#[cfg(test)]
pub(crate) use chat_service::tests as test_support;

use thiserror::Error;
use uuid::Uuid;

use meowchat::DomainError;

/// Application layer errors
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Session {0} is busy with another message")]
    SessionBusy(Uuid),

    #[error(transparent)]
    Domain(#[from] DomainError),
}
