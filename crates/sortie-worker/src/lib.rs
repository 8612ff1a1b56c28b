//! SORTIE campaign worker.
//!
//! Hosts a `SimulationEngine` on its own thread and exchanges
//! `WorkerMessage`s and `WorkerEvent`s with the host as JSON lines.

pub mod game_loop;
pub mod ipc;
pub mod state;

pub use sortie_core as core;
