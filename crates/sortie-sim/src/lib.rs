//! Simulation engine for the SORTIE campaign.
//!
//! Owns the campaign world, runs the systems that move aircraft and ground
//! forces, resolves combat, generates flight packages and converts the
//! world to and from its serialized forms.

pub mod combat;
pub mod dice;
pub mod engine;
pub mod faction;
pub mod lifecycle;
pub mod packages;
pub mod scenario;
pub mod serialization;
pub mod systems;
pub mod world;

pub use engine::{SimConfig, SimulationEngine};
pub use sortie_core as core;
pub use world::World;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod tests;
