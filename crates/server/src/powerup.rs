//! Power-up lifecycle: spawn sampling, timed effects, expiry.

use crate::board::{Board, Rect};
use protocol::snapshot::{BoardPowerUp, PowerUpKind};
use protocol::Point;
use rand::Rng;
use std::collections::HashSet;
use std::time::Instant;

/// Effect duration by kind, in seconds.
pub fn duration_secs(kind: PowerUpKind) -> f64 {
    match kind {
        PowerUpKind::Reverse | PowerUpKind::Freeze | PowerUpKind::Frozen => 5.0,
        _ => 10.0,
    }
}

/// The kinds that may spawn on the arena board. `Frozen` is excluded: it is
/// only ever applied by an opponent's freeze pickup.
pub const SPAWNABLE_KINDS: [PowerUpKind; 8] = [
    PowerUpKind::Speed,
    PowerUpKind::Shield,
    PowerUpKind::Invisible,
    PowerUpKind::Reverse,
    PowerUpKind::Freeze,
    PowerUpKind::Giant,
    PowerUpKind::Magnet,
    PowerUpKind::Trail,
];

/// Effect kinds whose remaining time is exposed to client HUDs.
pub const HUD_KINDS: [PowerUpKind; 5] = [
    PowerUpKind::Speed,
    PowerUpKind::Shield,
    PowerUpKind::Invisible,
    PowerUpKind::Reverse,
    PowerUpKind::Magnet,
];

/// One timed effect instance on a player.
#[derive(Debug, Clone, Copy)]
pub struct ActiveEffect {
    pub kind: PowerUpKind,
    pub since: Instant,
}

impl ActiveEffect {
    fn is_live(&self, now: Instant) -> bool {
        now.duration_since(self.since).as_secs_f64() < duration_secs(self.kind)
    }
}

/// A player's active effects. Instances of the same kind may coexist;
/// "has effect" means any instance is still inside its duration.
#[derive(Debug, Clone, Default)]
pub struct EffectSet {
    effects: Vec<ActiveEffect>,
}

impl EffectSet {
    pub fn add(&mut self, kind: PowerUpKind, now: Instant) {
        self.effects.push(ActiveEffect { kind, since: now });
    }

    /// Lazy expiry: expired instances are ignored even before a sweep.
    pub fn has(&self, kind: PowerUpKind, now: Instant) -> bool {
        self.effects.iter().any(|e| e.kind == kind && e.is_live(now))
    }

    /// Remaining seconds for the youngest live instance of `kind`, or 0.
    pub fn remaining_secs(&self, kind: PowerUpKind, now: Instant) -> f64 {
        self.effects
            .iter()
            .filter(|e| e.kind == kind && e.is_live(now))
            .map(|e| duration_secs(kind) - now.duration_since(e.since).as_secs_f64())
            .fold(0.0, f64::max)
    }

    /// Consume exactly one live instance of `kind` (oldest first). Returns
    /// whether anything was consumed.
    pub fn consume_one(&mut self, kind: PowerUpKind, now: Instant) -> bool {
        let oldest = self
            .effects
            .iter()
            .enumerate()
            .filter(|(_, e)| e.kind == kind && e.is_live(now))
            .min_by_key(|(_, e)| e.since)
            .map(|(i, _)| i);
        match oldest {
            Some(i) => {
                self.effects.remove(i);
                true
            }
            None => false,
        }
    }

    /// Eager sweep: drop expired instances and report the kinds that no
    /// longer have any live instance afterwards. Idempotent when no time
    /// has elapsed.
    pub fn sweep_expired(&mut self, now: Instant) -> Vec<PowerUpKind> {
        let before: Vec<PowerUpKind> = self.effects.iter().map(|e| e.kind).collect();
        self.effects.retain(|e| e.is_live(now));
        let mut lapsed: Vec<PowerUpKind> = before
            .into_iter()
            .filter(|k| !self.effects.iter().any(|e| e.kind == *k))
            .collect();
        lapsed.sort();
        lapsed.dedup();
        lapsed
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }
}

/// Sample a board power-up on a free cell outside the forbidden zones.
/// Returns `None` when caps are hit or no cell is available; the caller
/// performs the per-tick probability roll.
pub fn try_spawn<R: Rng>(
    board: &Board,
    occupied: &HashSet<Point>,
    existing: &[BoardPowerUp],
    max_total: usize,
    max_per_kind: usize,
    allowed: &[PowerUpKind],
    forbidden: &[Rect],
    rng: &mut R,
) -> Option<BoardPowerUp> {
    if existing.len() >= max_total || allowed.is_empty() {
        return None;
    }
    let kind = allowed[rng.random_range(0..allowed.len())];
    let same_kind = existing.iter().filter(|p| p.kind == kind).count();
    if same_kind >= max_per_kind {
        return None;
    }

    let free: Vec<Point> = board
        .cells()
        .filter(|c| !occupied.contains(c))
        .filter(|c| !existing.iter().any(|p| p.pos == *c))
        .filter(|c| !forbidden.iter().any(|r| r.contains(*c)))
        .collect();
    if free.is_empty() {
        return None;
    }
    let pos = free[rng.random_range(0..free.len())];
    Some(BoardPowerUp { pos, kind })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn effect_expires_lazily() {
        let start = Instant::now();
        let mut set = EffectSet::default();
        set.add(PowerUpKind::Shield, start);
        assert!(set.has(PowerUpKind::Shield, start + Duration::from_secs(9)));
        assert!(!set.has(PowerUpKind::Shield, start + Duration::from_secs(11)));
    }

    #[test]
    fn reverse_and_freeze_are_short() {
        let start = Instant::now();
        let mut set = EffectSet::default();
        set.add(PowerUpKind::Reverse, start);
        set.add(PowerUpKind::Frozen, start);
        let later = start + Duration::from_secs(6);
        assert!(!set.has(PowerUpKind::Reverse, later));
        assert!(!set.has(PowerUpKind::Frozen, later));
    }

    #[test]
    fn consume_one_takes_a_single_charge() {
        let start = Instant::now();
        let mut set = EffectSet::default();
        set.add(PowerUpKind::Shield, start);
        set.add(PowerUpKind::Shield, start + Duration::from_secs(1));
        assert!(set.consume_one(PowerUpKind::Shield, start + Duration::from_secs(2)));
        assert!(set.has(PowerUpKind::Shield, start + Duration::from_secs(2)));
        assert!(set.consume_one(PowerUpKind::Shield, start + Duration::from_secs(2)));
        assert!(!set.has(PowerUpKind::Shield, start + Duration::from_secs(2)));
    }

    #[test]
    fn sweep_reports_lapsed_kinds_and_is_idempotent() {
        let start = Instant::now();
        let mut set = EffectSet::default();
        set.add(PowerUpKind::Trail, start);
        set.add(PowerUpKind::Speed, start + Duration::from_secs(8));

        let now = start + Duration::from_secs(11);
        assert_eq!(set.sweep_expired(now), vec![PowerUpKind::Trail]);
        assert!(set.has(PowerUpKind::Speed, now));
        // A second sweep with no elapsed time changes nothing.
        assert!(set.sweep_expired(now).is_empty());
    }

    #[test]
    fn spawn_respects_total_and_per_kind_caps() {
        let board = Board::new(10, 10);
        let mut rng = rand::rng();
        let existing = vec![
            BoardPowerUp { pos: Point::new(0, 0), kind: PowerUpKind::Shield },
            BoardPowerUp { pos: Point::new(0, 1), kind: PowerUpKind::Shield },
        ];

        // Per-kind cap: shield already has two instances.
        assert!(try_spawn(
            &board,
            &HashSet::new(),
            &existing,
            4,
            2,
            &[PowerUpKind::Shield],
            &[],
            &mut rng,
        )
        .is_none());

        // Total cap.
        assert!(try_spawn(
            &board,
            &HashSet::new(),
            &existing,
            2,
            2,
            &[PowerUpKind::Speed],
            &[],
            &mut rng,
        )
        .is_none());
    }

    #[test]
    fn spawn_avoids_forbidden_zones() {
        let board = Board::new(4, 1);
        let mut rng = rand::rng();
        // Everything but (3, 0) is forbidden.
        let forbidden = [Rect::new(0, 0, 2, 0)];
        for _ in 0..10 {
            let pu = try_spawn(
                &board,
                &HashSet::new(),
                &[],
                4,
                2,
                &[PowerUpKind::Magnet],
                &forbidden,
                &mut rng,
            )
            .unwrap();
            assert_eq!(pu.pos, Point::new(3, 0));
        }
    }
}
