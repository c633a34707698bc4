//! Session Routes - Conversations with a persona
//!
//! Mutating calls on a session that is already handling a message are
//! rejected with 409 rather than queued.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::application::Session;
use crate::models::{
    CreateSessionRequest, SessionResponse, SubmitMessageRequest, SubmitMessageResponse,
    SwitchPersonaRequest, SwitchPersonaResponse,
};
use crate::AppState;

use super::error_response;

fn render(state: &AppState, session: &Session) -> Result<SessionResponse, (StatusCode, String)> {
    SessionResponse::build(session, state.chat_service.catalog())
        .map_err(|e| error_response(e.into()))
}

/// Start a new session
#[utoipa::path(
    post,
    path = "/meow/sessions",
    request_body(content = CreateSessionRequest, description = "Optional; the default persona is used when omitted"),
    responses(
        (status = 200, description = "Session created", body = SessionResponse),
        (status = 404, description = "Persona not found")
    ),
    tag = "Session"
)]
pub async fn create_session(
    State(state): State<AppState>,
    payload: Option<Json<CreateSessionRequest>>,
) -> Result<Json<SessionResponse>, (StatusCode, String)> {
    let Json(payload) = payload.unwrap_or_default();

    let session = state
        .chat_service
        .create_session(payload.persona_id.as_deref())
        .await
        .map_err(error_response)?;

    Ok(Json(render(&state, &session)?))
}

/// Get session by ID
#[utoipa::path(
    get,
    path = "/meow/sessions/{id}",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session found", body = SessionResponse),
        (status = 404, description = "Session not found")
    ),
    tag = "Session"
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, (StatusCode, String)> {
    let session = state
        .chat_service
        .get_session(id)
        .await
        .map_err(error_response)?;

    Ok(Json(render(&state, &session)?))
}

/// End a session
#[utoipa::path(
    delete,
    path = "/meow/sessions/{id}",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session ended"),
        (status = 404, description = "Session not found")
    ),
    tag = "Session"
)]
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    state
        .chat_service
        .end_session(id)
        .await
        .map_err(error_response)?;

    Ok(Json(serde_json::json!({
        "status": "ok",
        "message": "Session ended"
    })))
}

/// Send a message to the active persona
#[utoipa::path(
    post,
    path = "/meow/sessions/{id}/messages",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = SubmitMessageRequest,
    responses(
        (status = 200, description = "Persona replied", body = SubmitMessageResponse),
        (status = 400, description = "Empty message"),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Session busy")
    ),
    tag = "Session"
)]
pub async fn submit_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitMessageRequest>,
) -> Result<Json<SubmitMessageResponse>, (StatusCode, String)> {
    let (reply, session) = state
        .chat_service
        .submit(id, &payload.content)
        .await
        .map_err(error_response)?;

    Ok(Json(SubmitMessageResponse {
        reply: (&reply).into(),
        session: render(&state, &session)?,
    }))
}

/// Switch the active persona
#[utoipa::path(
    post,
    path = "/meow/sessions/{id}/persona",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = SwitchPersonaRequest,
    responses(
        (status = 200, description = "Persona active", body = SwitchPersonaResponse),
        (status = 404, description = "Session or persona not found"),
        (status = 409, description = "Session busy")
    ),
    tag = "Session"
)]
pub async fn switch_persona(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SwitchPersonaRequest>,
) -> Result<Json<SwitchPersonaResponse>, (StatusCode, String)> {
    let (switched, session) = state
        .chat_service
        .switch_persona(id, &payload.persona_id)
        .await
        .map_err(error_response)?;

    Ok(Json(SwitchPersonaResponse {
        switched,
        session: render(&state, &session)?,
    }))
}

/// Clear the conversation, keeping the persona
#[utoipa::path(
    post,
    path = "/meow/sessions/{id}/clear",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Conversation cleared", body = SessionResponse),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Session busy")
    ),
    tag = "Session"
)]
pub async fn clear_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, (StatusCode, String)> {
    let session = state.chat_service.clear(id).await.map_err(error_response)?;

    Ok(Json(render(&state, &session)?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/meow/sessions", post(create_session))
        .route(
            "/meow/sessions/:id",
            get(get_session).delete(delete_session),
        )
        .route("/meow/sessions/:id/messages", post(submit_message))
        .route("/meow/sessions/:id/persona", post(switch_persona))
        .route("/meow/sessions/:id/clear", post(clear_session))
}
