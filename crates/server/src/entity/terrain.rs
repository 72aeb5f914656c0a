//! Static board terrain: obstacles and portal pairs.

use crate::board::Board;
use protocol::snapshot::{BoardObstacle, ObstacleKind};
use protocol::Point;
use rand::Rng;
use std::collections::HashSet;

pub type Obstacle = BoardObstacle;

/// Portals must be at least this far apart (Manhattan).
const PORTAL_MIN_DIST: i32 = 8;
const PORTAL_PLACEMENT_TRIES: usize = 20;

/// Place `counts` obstacles of each kind on distinct free cells.
pub fn place_obstacles<R: Rng>(
    board: &Board,
    counts: &[(ObstacleKind, usize)],
    occupied: &HashSet<Point>,
    rng: &mut R,
) -> Vec<Obstacle> {
    let mut empty: Vec<Point> = board.cells().filter(|c| !occupied.contains(c)).collect();
    let mut obstacles = Vec::new();
    for &(kind, count) in counts {
        for _ in 0..count {
            if empty.is_empty() {
                return obstacles;
            }
            let idx = rng.random_range(0..empty.len());
            let pos = empty.swap_remove(idx);
            obstacles.push(Obstacle { pos, kind });
        }
    }
    obstacles
}

/// Place one portal pair on free cells with a minimum Manhattan separation.
/// Falls back to the farthest available cell when no pair clears the
/// threshold after a bounded number of attempts.
pub fn place_portals<R: Rng>(
    board: &Board,
    occupied: &HashSet<Point>,
    rng: &mut R,
) -> Vec<(Point, Point)> {
    let empty: Vec<Point> = board.cells().filter(|c| !occupied.contains(c)).collect();
    if empty.len() < 2 {
        return Vec::new();
    }

    for _ in 0..PORTAL_PLACEMENT_TRIES {
        let a = empty[rng.random_range(0..empty.len())];
        let far: Vec<Point> = empty
            .iter()
            .copied()
            .filter(|c| c.manhattan(a) >= PORTAL_MIN_DIST)
            .collect();
        if !far.is_empty() {
            let b = far[rng.random_range(0..far.len())];
            return vec![(a, b)];
        }
    }

    let a = empty[rng.random_range(0..empty.len())];
    let b = empty
        .iter()
        .copied()
        .max_by_key(|c| c.manhattan(a))
        .unwrap_or(a);
    vec![(a, b)]
}

/// The obstacle kind at a cell, if any.
pub fn obstacle_at(obstacles: &[Obstacle], p: Point) -> Option<ObstacleKind> {
    obstacles.iter().find(|o| o.pos == p).map(|o| o.kind)
}

/// If `p` is a portal endpoint, the paired endpoint.
pub fn portal_exit(portals: &[(Point, Point)], p: Point) -> Option<Point> {
    for &(a, b) in portals {
        if p == a {
            return Some(b);
        }
        if p == b {
            return Some(a);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obstacles_land_on_distinct_free_cells() {
        let board = Board::new(60, 35);
        let occupied: HashSet<Point> = [Point::new(0, 0)].into_iter().collect();
        let mut rng = rand::rng();
        let obstacles = place_obstacles(
            &board,
            &[
                (ObstacleKind::Slow, 15),
                (ObstacleKind::Poison, 7),
                (ObstacleKind::HiddenWall, 7),
            ],
            &occupied,
            &mut rng,
        );
        assert_eq!(obstacles.len(), 29);
        let positions: HashSet<Point> = obstacles.iter().map(|o| o.pos).collect();
        assert_eq!(positions.len(), 29, "positions must be distinct");
        assert!(!positions.contains(&Point::new(0, 0)));
    }

    #[test]
    fn portal_pair_respects_min_distance() {
        let board = Board::new(60, 35);
        let mut rng = rand::rng();
        for _ in 0..20 {
            let portals = place_portals(&board, &HashSet::new(), &mut rng);
            assert_eq!(portals.len(), 1);
            let (a, b) = portals[0];
            assert!(a.manhattan(b) >= PORTAL_MIN_DIST);
        }
    }

    #[test]
    fn portal_exit_maps_both_ways() {
        let portals = vec![(Point::new(1, 1), Point::new(20, 20))];
        assert_eq!(portal_exit(&portals, Point::new(1, 1)), Some(Point::new(20, 20)));
        assert_eq!(portal_exit(&portals, Point::new(20, 20)), Some(Point::new(1, 1)));
        assert_eq!(portal_exit(&portals, Point::new(5, 5)), None);
    }
}
