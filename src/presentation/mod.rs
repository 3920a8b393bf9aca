//! Serializable view models handed to the rendering layer.

pub mod views;
