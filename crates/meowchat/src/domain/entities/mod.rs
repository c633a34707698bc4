//! Domain Entities
//!
//! Pure domain models without infrastructure dependencies.
//! - Persona: Character profile the model role-plays
//! - Turn: One message of a conversation
//! - Conversation: Per-session chat state
//! - Household: Owners, location and conversation starters

mod conversation;
mod household;
mod persona;
mod turn;

pub use conversation::*;
pub use household::*;
pub use persona::*;
pub use turn::*;
