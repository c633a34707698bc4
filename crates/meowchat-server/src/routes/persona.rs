//! Persona Routes - Catalog Browsing
//!
//! Personas are listed eldest first, the order the selection menu uses.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::models::{HouseholdResponse, PersonaResponse};
use crate::AppState;

use super::error_response;

/// List all personas
#[utoipa::path(
    get,
    path = "/meow/personas",
    responses(
        (status = 200, description = "Personas ordered by age, eldest first", body = Vec<PersonaResponse>)
    ),
    tag = "Persona"
)]
pub async fn list_personas(State(state): State<AppState>) -> Json<Vec<PersonaResponse>> {
    let personas = state
        .chat_service
        .catalog()
        .personas_by_age()
        .into_iter()
        .map(PersonaResponse::from)
        .collect();

    Json(personas)
}

/// Get persona by ID
#[utoipa::path(
    get,
    path = "/meow/personas/{id}",
    params(("id" = String, Path, description = "Persona ID, e.g. Molly")),
    responses(
        (status = 200, description = "Persona found", body = PersonaResponse),
        (status = 404, description = "Persona not found")
    ),
    tag = "Persona"
)]
pub async fn get_persona(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PersonaResponse>, (StatusCode, String)> {
    let persona = state
        .chat_service
        .catalog()
        .lookup(&id)
        .map_err(|e| error_response(e.into()))?;

    Ok(Json(persona.into()))
}

/// Household the personas live in
#[utoipa::path(
    get,
    path = "/meow/household",
    responses(
        (status = 200, description = "Household metadata", body = HouseholdResponse)
    ),
    tag = "Persona"
)]
pub async fn get_household(State(state): State<AppState>) -> Json<HouseholdResponse> {
    let catalog = state.chat_service.catalog();
    Json(HouseholdResponse::new(catalog.household(), catalog.len()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/meow/personas", get(list_personas))
        .route("/meow/personas/:id", get(get_persona))
        .route("/meow/household", get(get_household))
}
