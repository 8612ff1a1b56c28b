//! Core types and definitions for the SORTIE campaign engine.
//!
//! This crate defines the vocabulary shared across all other crates:
//! geometry and time helpers, entity components, flight plans, tuning
//! config, errors, boundary messages and serializable state objects.
//! It has no simulation logic and no runtime dependency.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod definitions;
pub mod enums;
pub mod error;
pub mod events;
pub mod flightplan;
pub mod state;
pub mod time;
pub mod types;

pub use error::{CampaignError, Result};
