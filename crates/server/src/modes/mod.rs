//! The three game modes: classic arena, time attack and capture the flag.

pub mod arena;
pub mod ctf;
pub mod time_attack;

use protocol::{Color, PlayerId};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// The fixed snake palette, assigned first-free on join.
pub const SNAKE_PALETTE: [Color; 8] = [
    Color::new(0, 255, 0),
    Color::new(255, 255, 0),
    Color::new(0, 255, 255),
    Color::new(255, 0, 255),
    Color::new(255, 128, 0),
    Color::new(128, 0, 255),
    Color::new(255, 0, 0),
    Color::new(0, 128, 255),
];

/// First palette color not in `used`, with a stable id-hash fallback once
/// the palette is exhausted.
pub fn pick_color<'a, I>(player_id: &PlayerId, used: I) -> Color
where
    I: Iterator<Item = &'a Color>,
{
    let used: Vec<Color> = used.copied().collect();
    SNAKE_PALETTE
        .iter()
        .find(|c| !used.contains(c))
        .copied()
        .unwrap_or_else(|| fallback_color(player_id))
}

fn fallback_color(player_id: &PlayerId) -> Color {
    let mut hasher = DefaultHasher::new();
    player_id.hash(&mut hasher);
    SNAKE_PALETTE[(hasher.finish() as usize) % SNAKE_PALETTE.len()]
}

/// Mode-level happenings the connection layer fans out as dedicated
/// broadcast messages (or logs), beyond the per-tick state snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// The arena match clock ran out.
    ArenaGameOver { winner: Option<PlayerId> },
    /// A Time Attack run's clock ran out.
    TimeAttackOver { player: PlayerId, score: u32 },
    /// All CTF players readied up; the pre-match countdown started.
    CountdownStarted { seconds: u64 },
    /// A player picked up the opposing flag.
    FlagCaptured { player: PlayerId, team: String },
    /// A flag was delivered; carries the announcement text.
    FlagDelivered { message: String },
    /// A delivery ended the round; the board resets after a short pause.
    RoundWon {
        winning_team: String,
        winning_player: PlayerId,
    },
    /// The CTF match clock ran out. `winner` is empty on a tie.
    CtfGameOver { winner: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_color_skips_used_entries() {
        let used = [SNAKE_PALETTE[0], SNAKE_PALETTE[1]];
        let c = pick_color(&"p1".to_string(), used.iter());
        assert_eq!(c, SNAKE_PALETTE[2]);
    }

    #[test]
    fn exhausted_palette_falls_back_deterministically() {
        let id = "p9".to_string();
        let a = pick_color(&id, SNAKE_PALETTE.iter());
        let b = pick_color(&id, SNAKE_PALETTE.iter());
        assert_eq!(a, b);
        assert!(SNAKE_PALETTE.contains(&a));
    }
}
