//! Persona - A fixed character profile the model role-plays
//!
//! Pure domain entity without infrastructure dependencies.

use serde::{Deserialize, Serialize};

const DEFAULT_SPECIES: &str = "cat";
const DEFAULT_APOLOGY: &str = "Meow! Sorry, I'm having trouble right now";

/// Persona - one character of the household
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    #[serde(default = "default_species")]
    pub species: String,
    /// Free-form description used to build the instruction turn
    pub profile: String,
    pub age_actual: u32,
    pub age_human_equivalent: u32,
    /// Year the character joined the household
    #[serde(default)]
    pub since_year: Option<i32>,
    /// Bullet points shown to the user; independent of `profile`
    #[serde(default)]
    pub display_facts: Vec<PersonaFact>,
    /// In-character apology used when the completion call fails
    #[serde(default)]
    pub fallback_apology: Option<String>,
}

/// A labelled bullet point such as "Size: Smallest cat in the house"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaFact {
    pub label: String,
    pub value: String,
}

fn default_species() -> String {
    DEFAULT_SPECIES.to_string()
}

impl Persona {
    /// Create a persona with the default species and no display facts
    pub fn new(
        id: impl Into<String>,
        profile: impl Into<String>,
        age_actual: u32,
        age_human_equivalent: u32,
    ) -> Self {
        Self {
            id: id.into(),
            species: default_species(),
            profile: profile.into(),
            age_actual,
            age_human_equivalent,
            since_year: None,
            display_facts: Vec::new(),
            fallback_apology: None,
        }
    }

    /// Label used in selection lists, e.g. `Molly (10 years old)`
    pub fn display_label(&self) -> String {
        format!("{} ({} years old)", self.id, self.age_actual)
    }

    /// Age line shown above the conversation
    pub fn age_summary(&self) -> String {
        format!(
            "Age: {} years old (≈ {} in human years)",
            self.age_actual, self.age_human_equivalent
        )
    }

    /// Instruction turn directing the model to answer briefly, in character
    pub fn instruction(&self) -> String {
        format!(
            "You are {}, a {}. {} Respond briefly as this {} would.",
            self.id, self.species, self.profile, self.species
        )
    }

    pub fn apology(&self) -> &str {
        self.fallback_apology.as_deref().unwrap_or(DEFAULT_APOLOGY)
    }
}
