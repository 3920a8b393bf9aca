//! Domain layer types and invariants.

pub mod body;
pub mod countries;
pub mod error;
pub mod events;
pub mod listing;
pub mod predicate;
pub mod topics;
pub mod types;
