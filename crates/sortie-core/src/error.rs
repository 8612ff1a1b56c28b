//! Error type shared by every campaign operation.

use thiserror::Error;

use crate::types::EntityId;

pub type Result<T> = std::result::Result<T, CampaignError>;

#[derive(Debug, Error)]
pub enum CampaignError {
    #[error("airdrome not found: {0}")]
    AirdromeNotFound(String),

    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("entity {id} is not a {expected}")]
    WrongEntityKind { id: EntityId, expected: &'static str },

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("invalid faction definition: {0}")]
    InvalidFaction(String),

    #[error("no active campaign")]
    NoActiveCampaign,

    #[error("unsupported campaign version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
