//! JSON messages exchanged with clients.
//!
//! The wire format mirrors the original web client: every message is a JSON
//! object with a `type` discriminator, player-scoped messages carry a
//! `client_id`, and state broadcasts reuse the snapshot documents from
//! [`crate::snapshot`].

use crate::snapshot::{ArenaSnapshot, CtfSnapshot, TimeAttackSnapshot};
use crate::{Direction, PlayerId, ProtocolError};
use serde::{Deserialize, Serialize};

/// Messages sent from a client to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join the classic arena.
    Join { client_id: PlayerId },
    /// Change direction in the classic arena.
    Move {
        client_id: PlayerId,
        direction: Direction,
    },
    /// Signal readiness for an arena restart after a finished match.
    Ready { client_id: PlayerId },
    /// Respawn an individual snake in the arena.
    Restart { client_id: PlayerId },

    /// Start a personal Time Attack run.
    StartTimeAttack {
        client_id: PlayerId,
        difficulty: String,
    },
    /// Change direction in the player's Time Attack run.
    TimeAttackMove {
        client_id: PlayerId,
        direction: Direction,
    },
    /// Manual respawn inside a running Time Attack instance.
    TimeAttackRespawn { client_id: PlayerId },

    /// Join the capture-the-flag match, optionally requesting a team.
    CtfJoin {
        client_id: PlayerId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        team: Option<String>,
    },
    /// Change direction in capture the flag.
    CtfMove {
        client_id: PlayerId,
        direction: Direction,
    },
    /// Signal readiness in the CTF lobby.
    CtfReady { client_id: PlayerId },
    /// Request a manual respawn after elimination (cooldown gated).
    CtfRespawn { client_id: PlayerId },
    /// Reset the whole CTF match.
    CtfRestart { client_id: PlayerId },
}

impl ClientMessage {
    /// Decode a message from its JSON text form.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    /// The player id the message acts on.
    pub fn player_id(&self) -> &PlayerId {
        match self {
            ClientMessage::Join { client_id }
            | ClientMessage::Move { client_id, .. }
            | ClientMessage::Ready { client_id }
            | ClientMessage::Restart { client_id }
            | ClientMessage::StartTimeAttack { client_id, .. }
            | ClientMessage::TimeAttackMove { client_id, .. }
            | ClientMessage::TimeAttackRespawn { client_id }
            | ClientMessage::CtfJoin { client_id, .. }
            | ClientMessage::CtfMove { client_id, .. }
            | ClientMessage::CtfReady { client_id }
            | ClientMessage::CtfRespawn { client_id }
            | ClientMessage::CtfRestart { client_id } => client_id,
        }
    }
}

/// Messages sent from the server to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Per-client arena snapshot, broadcast every tick.
    State(ArenaSnapshot),
    /// Per-player Time Attack snapshot.
    TimeAttackState(TimeAttackSnapshot),
    /// CTF snapshot, broadcast every tick while the match has players.
    CtfState(CtfSnapshot),

    /// A rejected input, sent only to the originating client.
    Error { message: String },

    /// Acknowledges a Time Attack start.
    TimeAttackStarted { difficulty: String, time: u64 },
    /// Acknowledges a CTF join with the assigned team and spawn cell.
    CtfJoined { team: String, position: crate::Point },
    /// The CTF lobby is full and the pre-match countdown began.
    CtfCountdownStarted { countdown: u64 },
    /// A flag delivery won a round.
    CtfRoundWon {
        winning_team: String,
        winning_player: PlayerId,
    },
    /// A flag was delivered.
    CtfFlagDelivered { message: String },
    /// The CTF match finished. `winner` is empty on a tie.
    CtfGameOver { winner: String },
    /// Acknowledges a successful manual CTF respawn.
    CtfRespawned { client_id: PlayerId },
    /// A manual CTF respawn was attempted before the cooldown elapsed.
    CtfRespawnFailed {
        client_id: PlayerId,
        remaining_time: f64,
    },
}

impl ServerMessage {
    /// Encode the message as JSON text.
    pub fn to_json(&self) -> String {
        // Serialization of these enums cannot fail: all payloads are plain
        // maps, sequences and scalars.
        serde_json::to_string(self).unwrap_or_default()
    }
}
