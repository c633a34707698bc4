//! Persona - Character profiles offered for selection

use serde::Serialize;
use utoipa::ToSchema;

use meowchat::{Household, Persona, PersonaFact};

/// Persona as shown in the selection list
#[derive(Debug, Serialize, ToSchema)]
pub struct PersonaResponse {
    pub id: String,
    /// e.g. "Molly (10 years old)"
    pub label: String,
    pub species: String,
    pub age_actual: u32,
    pub age_human_equivalent: u32,
    pub age_summary: String,
    pub since_year: Option<i32>,
    pub display_facts: Vec<PersonaFactResponse>,
}

/// Labelled bullet point
#[derive(Debug, Serialize, ToSchema)]
pub struct PersonaFactResponse {
    pub label: String,
    pub value: String,
}

/// Short persona reference embedded in session responses
#[derive(Debug, Serialize, ToSchema)]
pub struct PersonaSummary {
    pub id: String,
    pub label: String,
    pub age_summary: String,
}

/// Household metadata
#[derive(Debug, Serialize, ToSchema)]
pub struct HouseholdResponse {
    pub owners: Vec<String>,
    pub owners_display: String,
    pub location: String,
    pub conversation_starters: Vec<String>,
    pub persona_count: usize,
}

impl From<&PersonaFact> for PersonaFactResponse {
    fn from(fact: &PersonaFact) -> Self {
        Self {
            label: fact.label.clone(),
            value: fact.value.clone(),
        }
    }
}

impl From<&Persona> for PersonaResponse {
    fn from(persona: &Persona) -> Self {
        Self {
            id: persona.id.clone(),
            label: persona.display_label(),
            species: persona.species.clone(),
            age_actual: persona.age_actual,
            age_human_equivalent: persona.age_human_equivalent,
            age_summary: persona.age_summary(),
            since_year: persona.since_year,
            display_facts: persona.display_facts.iter().map(Into::into).collect(),
        }
    }
}

impl From<&Persona> for PersonaSummary {
    fn from(persona: &Persona) -> Self {
        Self {
            id: persona.id.clone(),
            label: persona.display_label(),
            age_summary: persona.age_summary(),
        }
    }
}

impl HouseholdResponse {
    pub fn new(household: &Household, persona_count: usize) -> Self {
        Self {
            owners: household.owners.clone(),
            owners_display: household.owners_display(),
            location: household.location.clone(),
            conversation_starters: household.conversation_starters.clone(),
            persona_count,
        }
    }
}
