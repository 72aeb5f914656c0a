//! Input rejection taxonomy.
//!
//! Rejections are surfaced only to the originating client; the simulation is
//! unaffected. Operations on unknown player ids are not errors at all — they
//! silently no-op, since disconnects and stale messages are expected.

use protocol::PlayerId;
use thiserror::Error;

/// A client input the simulation refuses to apply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectedInput {
    #[error("player id \"{0}\" is already in the game")]
    DuplicateId(PlayerId),

    #[error("the game is full")]
    GameFull,

    #[error("team \"{0}\" is full")]
    TeamFull(String),

    #[error("unknown team \"{0}\"")]
    UnknownTeam(String),

    #[error("unknown difficulty \"{0}\"")]
    UnknownDifficulty(String),
}
