//! Persona Catalog
//!
//! Read-only lookup table of every persona, built once at startup.

use std::collections::HashSet;

use crate::domain::{DomainError, Household, Persona};

/// Fixed set of personas plus the household they belong to
#[derive(Debug, Clone)]
pub struct PersonaCatalog {
    personas: Vec<Persona>,
    default_index: usize,
    household: Household,
}

impl PersonaCatalog {
    /// Build a catalog, rejecting empty sets, duplicate ids and a missing default
    pub fn new(
        personas: Vec<Persona>,
        default_persona_id: impl Into<String>,
        household: Household,
    ) -> Result<Self, DomainError> {
        let default_persona_id = default_persona_id.into();

        if personas.is_empty() {
            return Err(DomainError::Configuration(
                "Persona catalog is empty".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(personas.len());
        for persona in &personas {
            if persona.id.trim().is_empty() {
                return Err(DomainError::Configuration(
                    "Persona with an empty id".to_string(),
                ));
            }
            if !seen.insert(persona.id.as_str()) {
                return Err(DomainError::Configuration(format!(
                    "Duplicate persona id: {}",
                    persona.id
                )));
            }
        }

        let default_index = personas
            .iter()
            .position(|p| p.id == default_persona_id)
            .ok_or_else(|| {
                DomainError::Configuration(format!(
                    "Default persona '{}' is not in the catalog",
                    default_persona_id
                ))
            })?;

        Ok(Self {
            personas,
            default_index,
            household,
        })
    }

    pub fn lookup(&self, id: &str) -> Result<&Persona, DomainError> {
        self.personas
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| DomainError::unknown_persona(id))
    }

    pub fn default_persona(&self) -> &Persona {
        &self.personas[self.default_index]
    }

    pub fn household(&self) -> &Household {
        &self.household
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    /// Personas ordered oldest first; equal ages fall back to id order
    pub fn personas_by_age(&self) -> Vec<&Persona> {
        let mut sorted: Vec<&Persona> = self.personas.iter().collect();
        sorted.sort_by(|a, b| {
            b.age_actual
                .cmp(&a.age_actual)
                .then_with(|| a.id.cmp(&b.id))
        });
        sorted
    }

    /// Ids in display order (age descending, then id ascending)
    pub fn list_ids_by_age(&self) -> Vec<&str> {
        self.personas_by_age()
            .into_iter()
            .map(|p| p.id.as_str())
            .collect()
    }
}
