//! Domain Layer - Pure business logic and domain models
//!
//! This layer contains:
//! - Entities: Core business objects with identity
//! - Value Objects: Immutable objects defined by their attributes
//! - Domain Services: Stateless services containing business logic
//! - Repository Interfaces: Abstractions for data access

pub mod entities;
pub mod value_objects;
pub mod services;
pub mod repositories;

pub use entities::{Episode, ResolveOutcome, ResolvedMetadata, Series};
pub use value_objects::{ActorCredit, Category, TmdbKind, TmdbRef};
