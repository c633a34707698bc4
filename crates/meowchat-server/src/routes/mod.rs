//! Meowchat API Routes
//!
//! - /meow/personas - Persona catalog and household metadata
//! - /meow/sessions - Conversation sessions (create, message, switch, clear)

pub mod persona;
pub mod session;
pub mod swagger;

use axum::http::StatusCode;
use meowchat::DomainError;

use crate::application::ServiceError;

/// Map a service failure onto the HTTP status the handlers report
pub(crate) fn error_response(error: ServiceError) -> (StatusCode, String) {
    let status = match &error {
        ServiceError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::SessionBusy(_) => StatusCode::CONFLICT,
        ServiceError::Domain(DomainError::UnknownPersona(_)) => StatusCode::NOT_FOUND,
        ServiceError::Domain(DomainError::Validation(_)) => StatusCode::BAD_REQUEST,
        ServiceError::Domain(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!("Request failed: {}", error);
    }

    (status, error.to_string())
}
