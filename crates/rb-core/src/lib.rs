//! rb-core
//!
//! The domain model, identity rules and port definitions for the board.

pub mod catalog;
pub mod codec;
pub mod envelope;
pub mod error;
pub mod identity;
pub mod ids;
pub mod models;
pub mod requests;
pub mod roster;
pub mod traits;

// Re-exporting for easier access in other crates
pub use envelope::*;
pub use error::*;
pub use identity::{Attributed, IdentityResolver};
pub use ids::EntityId;
pub use models::*;
pub use roster::{Hero, HeroRoster};
pub use traits::*;
