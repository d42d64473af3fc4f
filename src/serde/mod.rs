//! Serde helpers.

pub mod duration;
pub mod duration_millis;
