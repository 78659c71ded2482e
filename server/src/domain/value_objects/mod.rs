//! Value Objects - Immutable objects defined by their attributes
//!
//! Value objects are identified by their attributes rather than an identity.
//! They are immutable and have no lifecycle.

pub mod actor_credit;
pub mod category;
pub mod tmdb_ref;

pub use actor_credit::ActorCredit;
pub use category::Category;
pub use tmdb_ref::{TmdbKind, TmdbRef};
