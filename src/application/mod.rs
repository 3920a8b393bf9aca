//! Application services orchestrating domain logic.

pub mod cutoff;
pub mod error;
pub mod event;
pub mod filters;
pub mod listing;
pub mod pagination;
pub mod repos;
