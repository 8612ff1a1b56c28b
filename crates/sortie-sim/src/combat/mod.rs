//! Combat resolution: air-to-air, ground-to-ground and air-to-ground.
//!
//! All draws go through the world's dice; outcomes are logged at debug level.

pub mod a2a;
pub mod a2g;
pub mod g2g;
