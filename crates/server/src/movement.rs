//! Head-move resolution against static terrain.
//!
//! Every mode resolves a candidate head cell the same way: bounds first,
//! then obstacles, then portals. Snake-vs-snake collisions stay in the
//! modes because their consequences differ per mode.

use crate::board::Board;
use crate::entity::{obstacle_at, portal_exit, Obstacle};
use protocol::snapshot::ObstacleKind;
use protocol::Point;
use std::collections::HashSet;

/// What happened to a candidate head move against board and terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainOutcome {
    /// The head cell after wrapping and portal travel.
    pub head: Point,
    /// The move is fatal (wall off-board without a shield, or a wall-type
    /// obstacle).
    pub eliminated: bool,
    /// A shield charge absorbed the board edge.
    pub shield_consumed: bool,
    /// A poison obstacle was entered; the snake loses a tail segment.
    pub poison: bool,
    /// A slow obstacle was entered; the snake skips its next move.
    pub slowed: bool,
}

/// Resolve a candidate head cell against the board edge, obstacles and
/// portals, in that order. Obstacles are bypassed entirely while shielded.
pub fn resolve_terrain(
    board: &Board,
    obstacles: &[Obstacle],
    portals: &[(Point, Point)],
    candidate: Point,
    shielded: bool,
) -> TerrainOutcome {
    let mut outcome = TerrainOutcome {
        head: candidate,
        eliminated: false,
        shield_consumed: false,
        poison: false,
        slowed: false,
    };

    if !board.contains(outcome.head) {
        if shielded {
            outcome.head = board.wrap(outcome.head);
            outcome.shield_consumed = true;
        } else {
            outcome.eliminated = true;
            return outcome;
        }
    }

    if !shielded {
        match obstacle_at(obstacles, outcome.head) {
            Some(ObstacleKind::Wall) | Some(ObstacleKind::HiddenWall) => {
                outcome.eliminated = true;
                return outcome;
            }
            Some(ObstacleKind::Poison) => outcome.poison = true,
            Some(ObstacleKind::Slow) => outcome.slowed = true,
            None => {}
        }
    }

    if let Some(exit) = portal_exit(portals, outcome.head) {
        outcome.head = exit;
    }

    outcome
}

/// Magnet pass: pull each apple within `range` (Manhattan) one cell toward
/// `head`, skipping steps onto blocked cells or other apples. Runs after
/// moves have been committed.
pub fn attract_food(
    board: &Board,
    head: Point,
    range: i32,
    food: &mut [Point],
    blocked: &HashSet<Point>,
) {
    for i in 0..food.len() {
        let pos = food[i];
        let dist = pos.manhattan(head);
        if dist == 0 || dist > range {
            continue;
        }
        let next = pos.step_toward(head);
        if !board.contains(next) || blocked.contains(&next) {
            continue;
        }
        if food.iter().enumerate().any(|(j, f)| j != i && *f == next) {
            continue;
        }
        food[i] = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::snapshot::ObstacleKind;

    fn board() -> Board {
        Board::new(60, 35)
    }

    #[test]
    fn off_board_without_shield_is_fatal() {
        let out = resolve_terrain(&board(), &[], &[], Point::new(-1, 10), false);
        assert!(out.eliminated);
        assert!(!out.shield_consumed);
    }

    #[test]
    fn shield_wraps_and_is_consumed() {
        let out = resolve_terrain(&board(), &[], &[], Point::new(60, 10), true);
        assert!(!out.eliminated);
        assert!(out.shield_consumed);
        assert_eq!(out.head, Point::new(0, 10));
    }

    #[test]
    fn hidden_wall_eliminates_unshielded() {
        let obstacles = vec![Obstacle {
            pos: Point::new(5, 5),
            kind: ObstacleKind::HiddenWall,
        }];
        let out = resolve_terrain(&board(), &obstacles, &[], Point::new(5, 5), false);
        assert!(out.eliminated);
        let out = resolve_terrain(&board(), &obstacles, &[], Point::new(5, 5), true);
        assert!(!out.eliminated);
    }

    #[test]
    fn poison_and_slow_flag_without_eliminating() {
        let obstacles = vec![
            Obstacle { pos: Point::new(1, 1), kind: ObstacleKind::Poison },
            Obstacle { pos: Point::new(2, 2), kind: ObstacleKind::Slow },
        ];
        let out = resolve_terrain(&board(), &obstacles, &[], Point::new(1, 1), false);
        assert!(out.poison && !out.eliminated);
        let out = resolve_terrain(&board(), &obstacles, &[], Point::new(2, 2), false);
        assert!(out.slowed && !out.eliminated);
    }

    #[test]
    fn portal_moves_head_to_paired_exit() {
        let portals = vec![(Point::new(3, 3), Point::new(40, 20))];
        let out = resolve_terrain(&board(), &[], &portals, Point::new(3, 3), false);
        assert_eq!(out.head, Point::new(40, 20));
        assert!(!out.eliminated);
    }

    #[test]
    fn shield_wrap_can_land_on_portal() {
        let portals = vec![(Point::new(0, 10), Point::new(30, 30))];
        let out = resolve_terrain(&board(), &[], &portals, Point::new(60, 10), true);
        assert!(out.shield_consumed);
        assert_eq!(out.head, Point::new(30, 30));
    }

    #[test]
    fn magnet_pulls_only_nearby_food() {
        let b = board();
        let head = Point::new(10, 10);
        let mut food = vec![Point::new(12, 10), Point::new(30, 30)];
        attract_food(&b, head, 5, &mut food, &HashSet::new());
        assert_eq!(food[0], Point::new(11, 10));
        assert_eq!(food[1], Point::new(30, 30));
    }

    #[test]
    fn magnet_never_stacks_food() {
        let b = board();
        let head = Point::new(10, 10);
        // Both apples would step onto (11, 10); only the first may.
        let mut food = vec![Point::new(12, 10), Point::new(12, 11)];
        attract_food(&b, head, 5, &mut food, &HashSet::new());
        assert_eq!(food[0], Point::new(11, 10));
        assert_eq!(food[1], Point::new(12, 11));
    }

    #[test]
    fn magnet_respects_blocked_cells() {
        let b = board();
        let head = Point::new(10, 10);
        let blocked: HashSet<Point> = [Point::new(11, 10)].into_iter().collect();
        let mut food = vec![Point::new(12, 10)];
        attract_food(&b, head, 5, &mut food, &blocked);
        assert_eq!(food[0], Point::new(12, 10));
    }
}
