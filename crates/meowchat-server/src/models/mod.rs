//! Meowchat API Models
//!
//! - Persona: Character profiles and household metadata
//! - Session: Conversations and their request/response DTOs

mod persona;
mod session;

pub use persona::*;
pub use session::*;
