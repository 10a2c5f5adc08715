//! Domain layer for the chaos proxy
//!
//! Contains the chaos strategies, the response envelope and chaos result
//! entities, the HTTP status table used for random havoc, and domain errors.
//! This layer has no runtime dependencies and defines the ubiquitous language.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
