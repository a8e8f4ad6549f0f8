//! Core data models for the ladder tracker.

mod ids;
mod player;
mod ranked;

pub use ids::*;
pub use player::*;
pub use ranked::*;
