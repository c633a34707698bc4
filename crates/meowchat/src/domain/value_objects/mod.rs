//! Value Objects
//!
//! Immutable objects defined by their attributes rather than identity.

mod turn_role;

pub use turn_role::*;
