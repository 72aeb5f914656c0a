//! Per-mode state snapshot documents.
//!
//! These are the broadcast payloads the server builds once per tick. Field
//! names are wire-stable: existing clients key into them directly, so they
//! must not be renamed.

use crate::{Color, Direction, PlayerId, Point};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Obstacle categories on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    Wall,
    Slow,
    Poison,
    HiddenWall,
}

/// Power-up categories. `Frozen` is server-applied (by an opponent's freeze
/// pickup) and never spawns on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    Speed,
    Shield,
    Invisible,
    Reverse,
    Freeze,
    Giant,
    Magnet,
    Trail,
    Frozen,
}

/// An obstacle as it appears on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoardObstacle {
    pub pos: Point,
    #[serde(rename = "type")]
    pub kind: ObstacleKind,
}

/// A board power-up instance as it appears on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoardPowerUp {
    pub pos: Point,
    #[serde(rename = "type")]
    pub kind: PowerUpKind,
}

/// Remaining seconds per HUD-visible effect, keyed by player.
pub type PowerUpTimers = BTreeMap<PlayerId, BTreeMap<PowerUpKind, f64>>;

/// Classic arena snapshot, projected for one viewer (invisible opponents'
/// bodies are replaced by empty lists).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArenaSnapshot {
    pub snakes: BTreeMap<PlayerId, Vec<Point>>,
    pub directions: BTreeMap<PlayerId, Direction>,
    pub colors: BTreeMap<PlayerId, Color>,
    pub active: BTreeMap<PlayerId, bool>,
    pub scores: BTreeMap<PlayerId, u32>,
    pub food: Vec<Point>,
    pub golden_food: Option<Point>,
    pub obstacles: Vec<BoardObstacle>,
    pub portals: Vec<(Point, Point)>,
    pub powerups: Vec<BoardPowerUp>,
    pub trails: BTreeMap<PlayerId, Vec<Point>>,
    pub time_left: u64,
    pub winner_id: Option<PlayerId>,
    pub waiting_for_restart: bool,
    pub powerup_timers: PowerUpTimers,
}

/// Snapshot of a single player's Time Attack run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeAttackSnapshot {
    pub snake: Vec<Point>,
    pub direction: Direction,
    pub food: Vec<Point>,
    pub golden_food: Option<Point>,
    pub obstacles: Vec<BoardObstacle>,
    pub portals: Vec<(Point, Point)>,
    pub powerups: Vec<BoardPowerUp>,
    pub score: u32,
    pub time_left: f64,
    pub difficulty: String,
    pub game_active: bool,
    pub high_score: u32,
    pub respawn_count: u32,
}

/// One flag as it appears on the wire. The server's tagged flag state is
/// flattened into the captured/carrier/pos triple the clients expect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagView {
    pub pos: Point,
    pub captured: bool,
    pub carrier: Option<PlayerId>,
    pub dropped_pos: Option<Point>,
    pub base_pos: Point,
}

/// Capture-the-flag snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CtfSnapshot {
    pub snakes: BTreeMap<PlayerId, Vec<Point>>,
    pub directions: BTreeMap<PlayerId, Direction>,
    pub colors: BTreeMap<PlayerId, Color>,
    pub active: BTreeMap<PlayerId, bool>,
    pub flags: BTreeMap<String, FlagView>,
    pub team_scores: BTreeMap<String, u32>,
    pub individual_scores: BTreeMap<PlayerId, u32>,
    pub game_time: u64,
    pub game_phase: String,
    pub teams: BTreeMap<String, Vec<PlayerId>>,
    pub powerups: Vec<BoardPowerUp>,
    pub powerup_timers: PowerUpTimers,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_countdown: Option<u64>,
}

impl Default for FlagView {
    fn default() -> Self {
        Self {
            pos: Point::new(0, 0),
            captured: false,
            carrier: None,
            dropped_pos: None,
            base_pos: Point::new(0, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obstacle_kind_uses_snake_case_on_the_wire() {
        let obs = BoardObstacle {
            pos: Point::new(1, 2),
            kind: ObstacleKind::HiddenWall,
        };
        let json = serde_json::to_string(&obs).unwrap();
        assert_eq!(json, r#"{"pos":[1,2],"type":"hidden_wall"}"#);
    }

    #[test]
    fn arena_snapshot_keeps_wire_field_names() {
        let snap = ArenaSnapshot::default();
        let value = serde_json::to_value(&snap).unwrap();
        for key in [
            "snakes",
            "directions",
            "colors",
            "active",
            "scores",
            "time_left",
            "winner_id",
            "waiting_for_restart",
            "powerup_timers",
        ] {
            assert!(value.get(key).is_some(), "missing field {key}");
        }
    }

    #[test]
    fn ctf_snapshot_keeps_wire_field_names() {
        let snap = CtfSnapshot::default();
        let value = serde_json::to_value(&snap).unwrap();
        for key in [
            "snakes",
            "flags",
            "team_scores",
            "individual_scores",
            "game_time",
            "game_phase",
            "teams",
        ] {
            assert!(value.get(key).is_some(), "missing field {key}");
        }
    }
}
