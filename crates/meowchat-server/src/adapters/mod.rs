//! Infrastructure Adapters
//!
//! Concrete implementations of the domain ports plus loaders for
//! external resources.

pub mod catalog_file;
mod openai;

pub use openai::OpenAiProvider;
