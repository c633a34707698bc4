//! OpenAPI Documentation
//!
//! Centralized API documentation using utoipa.

use utoipa::OpenApi;

use crate::models::{
    CreateSessionRequest,
    HouseholdResponse,
    // Persona models
    PersonaFactResponse,
    PersonaResponse,
    PersonaSummary,
    // Session models
    SessionResponse,
    SubmitMessageRequest,
    SubmitMessageResponse,
    SwitchPersonaRequest,
    SwitchPersonaResponse,
    TurnResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Persona endpoints
        super::persona::list_personas,
        super::persona::get_persona,
        super::persona::get_household,
        // Session endpoints
        super::session::create_session,
        super::session::get_session,
        super::session::delete_session,
        super::session::submit_message,
        super::session::switch_persona,
        super::session::clear_session,
    ),
    info(
        title = "Meowchat API",
        version = "0.1.0",
        description = "Chat with the cats of the household.\n\nEach session talks to one cat persona at a time; switching cats starts a fresh conversation.",
        license(name = "MIT"),
    ),
    servers(
        (url = "/", description = "Current server"),
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Persona", description = "Persona catalog and household"),
        (name = "Session", description = "Conversations with a persona"),
    ),
    components(
        schemas(
            // Persona
            PersonaResponse,
            PersonaFactResponse,
            PersonaSummary,
            HouseholdResponse,
            // Session
            TurnResponse,
            SessionResponse,
            CreateSessionRequest,
            SubmitMessageRequest,
            SubmitMessageResponse,
            SwitchPersonaRequest,
            SwitchPersonaResponse,
        )
    ),
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/meow/personas"));
        assert!(paths.iter().any(|p| p.as_str() == "/meow/sessions/{id}/messages"));
        assert_eq!(paths.len(), 8);
    }
}
