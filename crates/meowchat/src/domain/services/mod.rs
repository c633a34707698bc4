//! Domain Services
//!
//! Stateless domain logic operating on entities.
//! - PersonaCatalog: Persona lookup and display ordering
//! - TurnOrchestrator: Prompt construction and completion calls

mod persona_catalog;
mod turn_orchestrator;

pub use persona_catalog::*;
pub use turn_orchestrator::*;
