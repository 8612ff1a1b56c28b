//! Systems that advance the campaign world each tick.
//!
//! Systems are free functions over `&mut World`. They hold no state; all
//! state lives in the world. A failure while updating one entity is logged
//! and does not stop the tick for the others.

pub mod cleanup;
pub mod deployment;
pub mod flight;
pub mod ground;

use crate::combat;
use crate::world::World;

/// Run every system once for a tick of `dt` simulated seconds.
pub fn run(world: &mut World, dt: f64) {
    // 1. Take-off, flight plan movement, landing
    flight::run(world, dt);
    // 2. Ground group movement and arrival
    ground::run(world, dt);
    // 3. Air-to-air detection and fire
    combat::a2a::run(world);
    // 4. Ground battles and conquest
    combat::g2g::run(world);
    // 5. Air-to-ground attacks
    combat::a2g::run(world);
    // 6. Unit camp deployment
    deployment::run(world, dt);
    // 7. Remove dead groups and empty packages
    cleanup::run(world);
}
