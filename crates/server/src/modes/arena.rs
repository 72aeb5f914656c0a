//! Classic arena: shared 120-second match, last-highest-score wins.

use crate::board::Board;
use crate::config::ArenaConfig;
use crate::entity::{place_obstacles, place_portals, Obstacle, Snake};
use crate::error::RejectedInput;
use crate::modes::{pick_color, GameEvent};
use crate::movement::{attract_food, resolve_terrain};
use crate::powerup::{self, EffectSet, HUD_KINDS, SPAWNABLE_KINDS};
use protocol::snapshot::{ArenaSnapshot, BoardPowerUp, ObstacleKind, PowerUpKind, PowerUpTimers};
use protocol::{Color, Direction, PlayerId, Point};
use rand::Rng;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::time::Instant;
use tracing::{debug, info};

const FOOD_SCORE: u32 = 1;
const GOLDEN_FOOD_SCORE: u32 = 5;
const GIANT_GROWTH: usize = 3;

/// One arena participant. Eliminated players stay on the board as inert
/// bodies until they respawn or the match resets.
#[derive(Debug, Clone)]
struct ArenaPlayer {
    snake: Snake,
    direction: Direction,
    color: Color,
    active: bool,
    score: u32,
    effects: EffectSet,
    trail: VecDeque<Point>,
    ready: bool,
    skip_move: bool,
}

/// The shared arena match.
pub struct ArenaGame {
    cfg: ArenaConfig,
    board: Board,
    players: BTreeMap<PlayerId, ArenaPlayer>,
    food: Vec<Point>,
    golden_food: Option<Point>,
    obstacles: Vec<Obstacle>,
    portals: Vec<(Point, Point)>,
    powerups: Vec<BoardPowerUp>,
    started_at: Option<Instant>,
    waiting_for_restart: bool,
    winner: Option<PlayerId>,
    tick: u64,
}

impl ArenaGame {
    pub fn new(board: Board, cfg: ArenaConfig) -> Self {
        Self {
            cfg,
            board,
            players: BTreeMap::new(),
            food: Vec::new(),
            golden_food: None,
            obstacles: Vec::new(),
            portals: Vec::new(),
            powerups: Vec::new(),
            started_at: None,
            waiting_for_restart: false,
            winner: None,
            tick: 0,
        }
    }

    pub fn has_player(&self, id: &PlayerId) -> bool {
        self.players.contains_key(id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Join (or re-join) the arena. Terrain is laid out when the first
    /// player enters an empty board.
    pub fn join<R: Rng>(&mut self, id: &PlayerId, rng: &mut R) -> Result<(), RejectedInput> {
        if !self.players.contains_key(id) && self.players.len() >= self.cfg.max_players {
            return Err(RejectedInput::GameFull);
        }
        let first_player = self.players.is_empty();
        self.spawn_player(id, rng);
        if first_player {
            self.regenerate_terrain(rng);
        }
        info!(player = %id, "player joined arena");
        Ok(())
    }

    pub fn remove(&mut self, id: &PlayerId) {
        if self.players.remove(id).is_some() {
            info!(player = %id, "player left arena");
        }
    }

    /// Apply a direction change. Reverse flips the input; a plain 180-turn
    /// is ignored.
    pub fn set_direction(&mut self, id: &PlayerId, direction: Direction, now: Instant) {
        if self.waiting_for_restart {
            return;
        }
        let Some(player) = self.players.get_mut(id) else {
            return;
        };
        let direction = if player.effects.has(PowerUpKind::Reverse, now) {
            direction.opposite()
        } else {
            direction
        };
        if direction == player.direction.opposite() {
            return;
        }
        player.direction = direction;
    }

    /// Mark an eliminated player ready for the post-match restart.
    pub fn set_ready(&mut self, id: &PlayerId) {
        if let Some(player) = self.players.get_mut(id) {
            player.ready = true;
        }
    }

    /// Individual respawn of an eliminated snake mid-match.
    pub fn respawn<R: Rng>(&mut self, id: &PlayerId, rng: &mut R) {
        if self.players.contains_key(id) {
            self.spawn_player(id, rng);
        }
    }

    /// Advance the match by one tick.
    pub fn tick<R: Rng>(&mut self, now: Instant, rng: &mut R) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.players.is_empty() {
            return events;
        }
        if self.started_at.is_none() {
            self.reset_match(now, rng);
        }

        self.sweep_effects(now);

        if !self.waiting_for_restart && self.time_left(now) == 0 {
            self.finish_match();
            events.push(GameEvent::ArenaGameOver {
                winner: self.winner.clone(),
            });
        }
        if self.waiting_for_restart {
            if self.all_players_ready() {
                self.reset_match(now, rng);
            }
            return events;
        }

        self.spawn_board_items(rng);

        let move_now = self.tick % 2 == 0;
        self.tick += 1;
        let ids: Vec<PlayerId> = self.players.keys().cloned().collect();
        for id in &ids {
            let Some(player) = self.players.get(id) else {
                continue;
            };
            if !player.active || player.effects.has(PowerUpKind::Frozen, now) {
                continue;
            }
            if player.effects.has(PowerUpKind::Speed, now) || move_now {
                self.move_player(id, now, rng);
            }
        }

        // Magnet attracts plain apples only; the golden apple stays put.
        for id in &ids {
            let Some(player) = self.players.get(id) else {
                continue;
            };
            if !player.effects.has(PowerUpKind::Magnet, now) {
                continue;
            }
            let head = player.snake.head();
            let blocked: HashSet<Point> =
                self.players.values().flat_map(|p| p.snake.segments()).collect();
            attract_food(&self.board, head, self.cfg.magnet_range, &mut self.food, &blocked);
        }

        events
    }

    /// Build the snapshot for one viewer. Invisible opponents are sent with
    /// an empty body.
    pub fn snapshot(&self, viewer: &PlayerId, now: Instant) -> ArenaSnapshot {
        let mut snap = ArenaSnapshot {
            food: self.food.clone(),
            golden_food: self.golden_food,
            obstacles: self.obstacles.clone(),
            portals: self.portals.clone(),
            powerups: self.powerups.clone(),
            time_left: if self.waiting_for_restart {
                0
            } else {
                self.time_left(now)
            },
            winner_id: self.winner.clone(),
            waiting_for_restart: self.waiting_for_restart,
            ..ArenaSnapshot::default()
        };
        let mut timers = PowerUpTimers::new();
        for (id, player) in &self.players {
            let hidden = id != viewer && player.effects.has(PowerUpKind::Invisible, now);
            snap.snakes
                .insert(id.clone(), if hidden { Vec::new() } else { player.snake.to_vec() });
            snap.directions.insert(id.clone(), player.direction);
            snap.colors.insert(id.clone(), player.color);
            snap.active.insert(id.clone(), player.active);
            snap.scores.insert(id.clone(), player.score);
            if !player.trail.is_empty() {
                snap.trails.insert(id.clone(), player.trail.iter().copied().collect());
            }
            let mut per_kind = BTreeMap::new();
            for kind in HUD_KINDS {
                let left = player.effects.remaining_secs(kind, now);
                if left > 0.0 {
                    per_kind.insert(kind, left);
                }
            }
            if !per_kind.is_empty() {
                timers.insert(id.clone(), per_kind);
            }
        }
        snap.powerup_timers = timers;
        snap
    }

    fn time_left(&self, now: Instant) -> u64 {
        match self.started_at {
            Some(start) => {
                let elapsed = now.duration_since(start).as_secs();
                self.cfg.game_duration_secs.saturating_sub(elapsed)
            }
            None => 0,
        }
    }

    fn spawn_player<R: Rng>(&mut self, id: &PlayerId, rng: &mut R) {
        let x = rng.random_range(2..self.board.width - 2);
        let y = rng.random_range(self.cfg.spawn_top_margin + 1..self.board.height);
        let snake = Snake::new(Point::new(x, y), self.cfg.start_length, Direction::Down);
        match self.players.get_mut(id) {
            Some(player) => {
                player.snake = snake;
                player.direction = Direction::Up;
                player.active = true;
                player.skip_move = false;
                player.trail.clear();
            }
            None => {
                let color = pick_color(id, self.players.values().map(|p| &p.color));
                self.players.insert(
                    id.clone(),
                    ArenaPlayer {
                        snake,
                        direction: Direction::Up,
                        color,
                        active: true,
                        score: 0,
                        effects: EffectSet::default(),
                        trail: VecDeque::new(),
                        ready: false,
                        skip_move: false,
                    },
                );
            }
        }
    }

    fn regenerate_terrain<R: Rng>(&mut self, rng: &mut R) {
        let occupied = self.occupied_cells();
        self.obstacles = place_obstacles(
            &self.board,
            &[
                (ObstacleKind::Slow, self.cfg.slow_obstacles),
                (ObstacleKind::Poison, self.cfg.poison_obstacles),
                (ObstacleKind::HiddenWall, self.cfg.hidden_walls),
            ],
            &occupied,
            rng,
        );
        let occupied = self.occupied_cells();
        self.portals = place_portals(&self.board, &occupied, rng);
    }

    fn reset_match<R: Rng>(&mut self, now: Instant, rng: &mut R) {
        let ids: Vec<PlayerId> = self.players.keys().cloned().collect();
        for id in &ids {
            self.spawn_player(id, rng);
        }
        for player in self.players.values_mut() {
            player.score = 0;
            player.ready = false;
            player.effects.clear();
        }
        self.powerups.clear();
        self.golden_food = None;
        self.food.clear();
        for _ in 0..self.cfg.initial_food {
            let food = self.spawn_food(rng);
            self.food.push(food);
        }
        self.started_at = Some(now);
        self.waiting_for_restart = false;
        self.winner = None;
        info!(players = self.players.len(), "arena match started");
    }

    fn finish_match(&mut self) {
        let mut best: Option<(&PlayerId, u32)> = None;
        for (id, player) in &self.players {
            if best.is_none_or(|(_, s)| player.score > s) {
                best = Some((id, player.score));
            }
        }
        self.winner = best.map(|(id, _)| id.clone());
        self.waiting_for_restart = true;
        for player in self.players.values_mut() {
            player.active = false;
        }
        info!(winner = ?self.winner, "arena match finished");
    }

    fn all_players_ready(&self) -> bool {
        if self.players.is_empty() {
            return false;
        }
        self.players.values().all(|p| p.active || p.ready)
    }

    fn sweep_effects(&mut self, now: Instant) {
        for player in self.players.values_mut() {
            let lapsed = player.effects.sweep_expired(now);
            if lapsed.contains(&PowerUpKind::Trail) {
                player.trail.clear();
            }
        }
    }

    fn spawn_board_items<R: Rng>(&mut self, rng: &mut R) {
        if rng.random_bool(self.cfg.powerup_spawn_chance) {
            let occupied = self.occupied_cells();
            if let Some(pu) = powerup::try_spawn(
                &self.board,
                &occupied,
                &self.powerups,
                self.cfg.max_powerups,
                self.cfg.max_powerups_per_kind,
                &SPAWNABLE_KINDS,
                &[],
                rng,
            ) {
                self.powerups.push(pu);
            }
        }
        if self.golden_food.is_none() && rng.random_bool(self.cfg.golden_food_chance) {
            self.golden_food = Some(self.spawn_food(rng));
        }
    }

    fn move_player<R: Rng>(&mut self, id: &PlayerId, now: Instant, rng: &mut R) {
        let Some(mut player) = self.players.remove(id) else {
            return;
        };
        if player.skip_move {
            player.skip_move = false;
            self.players.insert(id.clone(), player);
            return;
        }

        let candidate = player.direction.apply(player.snake.head());
        let mut shielded = player.effects.has(PowerUpKind::Shield, now);
        let terrain =
            resolve_terrain(&self.board, &self.obstacles, &self.portals, candidate, shielded);
        if terrain.shield_consumed {
            player.effects.consume_one(PowerUpKind::Shield, now);
            shielded = player.effects.has(PowerUpKind::Shield, now);
        }
        if terrain.eliminated {
            self.eliminate(id, player);
            return;
        }
        if terrain.poison && !player.snake.shrink_tail() {
            self.eliminate(id, player);
            return;
        }
        if terrain.slowed {
            player.skip_move = true;
        }
        let head = terrain.head;

        if player.snake.hits_self(head) {
            if shielded {
                player.effects.consume_one(PowerUpKind::Shield, now);
                shielded = player.effects.has(PowerUpKind::Shield, now);
            } else {
                self.eliminate(id, player);
                return;
            }
        }
        // Eliminated bodies stay on the board and still block.
        let hit_other = self.players.values().any(|other| other.snake.contains(head));
        if hit_other {
            if shielded {
                player.effects.consume_one(PowerUpKind::Shield, now);
            } else {
                self.eliminate(id, player);
                return;
            }
        }

        let mut grew = false;
        let mut eaten = None;
        if self.golden_food == Some(head) {
            self.golden_food = None;
            player.score += GOLDEN_FOOD_SCORE;
            grew = true;
        } else if let Some(i) = self.food.iter().position(|f| *f == head) {
            player.score += FOOD_SCORE;
            grew = true;
            eaten = Some(i);
        }

        player.snake.advance(head, grew);

        // The mover is detached from the registry here, so its body has to
        // be counted by hand when placing the replacement apple.
        if let Some(i) = eaten {
            let mut occupied = self.occupied_cells();
            occupied.extend(player.snake.segments());
            self.food[i] = self.board.random_empty_cell(&occupied, rng);
        }

        if let Some(i) = self.powerups.iter().position(|p| p.pos == head) {
            let picked = self.powerups.remove(i);
            debug!(player = %id, kind = ?picked.kind, "arena power-up picked up");
            player.effects.add(picked.kind, now);
            match picked.kind {
                PowerUpKind::Freeze => {
                    for other in self.players.values_mut() {
                        if other.active {
                            other.effects.add(PowerUpKind::Frozen, now);
                        }
                    }
                }
                PowerUpKind::Giant => player.snake.extend_tail(GIANT_GROWTH),
                _ => {}
            }
        }

        player.snake.clamp_len(self.cfg.max_snake_length);

        if player.effects.has(PowerUpKind::Trail, now) {
            player.trail.push_back(player.snake.tail());
            while player.trail.len() > self.cfg.trail_limit {
                player.trail.pop_front();
            }
        } else {
            player.trail.clear();
        }

        let trail_hit = player.trail.contains(&head)
            || self.players.values().any(|other| other.trail.contains(&head));
        if trail_hit {
            self.eliminate(id, player);
            return;
        }

        self.players.insert(id.clone(), player);
    }

    fn eliminate(&mut self, id: &PlayerId, mut player: ArenaPlayer) {
        debug!(player = %id, "arena player eliminated");
        player.active = false;
        player.effects.clear();
        player.trail.clear();
        self.players.insert(id.clone(), player);
    }

    fn occupied_cells(&self) -> HashSet<Point> {
        let mut occupied: HashSet<Point> = self
            .players
            .values()
            .flat_map(|p| p.snake.segments())
            .collect();
        occupied.extend(self.food.iter().copied());
        occupied.extend(self.golden_food);
        occupied.extend(self.obstacles.iter().map(|o| o.pos));
        for &(a, b) in &self.portals {
            occupied.insert(a);
            occupied.insert(b);
        }
        occupied.extend(self.powerups.iter().map(|p| p.pos));
        occupied
    }

    fn spawn_food<R: Rng>(&self, rng: &mut R) -> Point {
        let occupied = self.occupied_cells();
        self.board.random_empty_cell(&occupied, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn game() -> ArenaGame {
        ArenaGame::new(Board::new(60, 35), ArenaConfig::default())
    }

    fn started_game_with(ids: &[&str]) -> (ArenaGame, Instant) {
        let mut g = game();
        let mut rng = rand::rng();
        for id in ids {
            g.join(&id.to_string(), &mut rng).unwrap();
        }
        // Clear randomly generated terrain for deterministic movement.
        g.obstacles.clear();
        g.portals.clear();
        let now = Instant::now();
        g.tick(now, &mut rng);
        g.powerups.clear();
        g.golden_food = None;
        g.food = vec![Point::new(0, 0)];
        (g, now)
    }

    fn place(g: &mut ArenaGame, id: &str, head: Point, dir: Direction) {
        let p = g.players.get_mut(&id.to_string()).unwrap();
        p.snake = Snake::new(head, 3, dir.opposite());
        p.direction = dir;
        p.active = true;
    }

    #[test]
    fn join_rejects_when_full() {
        let mut g = game();
        let mut rng = rand::rng();
        for i in 0..8 {
            g.join(&format!("p{i}"), &mut rng).unwrap();
        }
        assert!(matches!(
            g.join(&"late".to_string(), &mut rng),
            Err(RejectedInput::GameFull)
        ));
        // Re-joining an existing player is not a capacity violation.
        assert!(g.join(&"p0".to_string(), &mut rng).is_ok());
    }

    #[test]
    fn eating_food_grows_and_scores() {
        let (mut g, now) = started_game_with(&["a"]);
        let mut rng = rand::rng();
        place(&mut g, "a", Point::new(10, 10), Direction::Right);
        g.food = vec![Point::new(11, 10)];
        g.move_player(&"a".to_string(), now, &mut rng);
        let p = &g.players["a"];
        assert_eq!(p.score, 1);
        assert_eq!(p.snake.len(), 4);
        assert_eq!(p.snake.head(), Point::new(11, 10));
        // A replacement apple was spawned.
        assert_eq!(g.food.len(), 1);
        assert_ne!(g.food[0], Point::new(11, 10));
    }

    #[test]
    fn replacement_apple_never_spawns_inside_the_eater() {
        // On a 1x5 strip the grown snake covers four cells, leaving (0, 0)
        // as the only legal spot for the replacement apple.
        let mut g = ArenaGame::new(Board::new(5, 1), ArenaConfig::default());
        let mut rng = rand::rng();
        g.players.insert(
            "a".to_string(),
            ArenaPlayer {
                snake: Snake::new(Point::new(2, 0), 3, Direction::Right),
                direction: Direction::Left,
                color: Color::new(0, 255, 0),
                active: true,
                score: 0,
                effects: EffectSet::default(),
                trail: VecDeque::new(),
                ready: false,
                skip_move: false,
            },
        );
        for _ in 0..20 {
            let p = g.players.get_mut("a").unwrap();
            p.snake = Snake::new(Point::new(2, 0), 3, Direction::Right);
            p.direction = Direction::Left;
            g.food = vec![Point::new(1, 0)];
            g.move_player(&"a".to_string(), Instant::now(), &mut rng);
            assert_eq!(g.food, vec![Point::new(0, 0)]);
        }
    }

    #[test]
    fn wall_exit_without_shield_eliminates() {
        let (mut g, now) = started_game_with(&["a"]);
        let mut rng = rand::rng();
        place(&mut g, "a", Point::new(0, 10), Direction::Left);
        g.move_player(&"a".to_string(), now, &mut rng);
        assert!(!g.players["a"].active);
    }

    #[test]
    fn shield_wraps_at_edge_and_spends_one_charge() {
        let (mut g, now) = started_game_with(&["a"]);
        let mut rng = rand::rng();
        place(&mut g, "a", Point::new(0, 10), Direction::Left);
        g.players.get_mut("a").unwrap().effects.add(PowerUpKind::Shield, now);
        g.move_player(&"a".to_string(), now, &mut rng);
        let p = &g.players["a"];
        assert!(p.active);
        assert_eq!(p.snake.head(), Point::new(59, 10));
        assert!(!p.effects.has(PowerUpKind::Shield, now));
    }

    #[test]
    fn two_shield_charges_survive_two_collisions() {
        let (mut g, now) = started_game_with(&["a", "b"]);
        let mut rng = rand::rng();
        place(&mut g, "b", Point::new(20, 20), Direction::Up);
        let b_body = g.players["b"].snake.to_vec();

        place(&mut g, "a", Point::new(b_body[1].x - 1, b_body[1].y), Direction::Right);
        let a = g.players.get_mut("a").unwrap();
        a.effects.add(PowerUpKind::Shield, now);
        a.effects.add(PowerUpKind::Shield, now);

        g.move_player(&"a".to_string(), now, &mut rng);
        assert!(g.players["a"].active);
        assert!(g.players["a"].effects.has(PowerUpKind::Shield, now));

        // Second hit on the same body spends the last charge.
        place(&mut g, "a", Point::new(b_body[2].x - 1, b_body[2].y), Direction::Right);
        g.move_player(&"a".to_string(), now, &mut rng);
        assert!(g.players["a"].active);
        assert!(!g.players["a"].effects.has(PowerUpKind::Shield, now));

        // Without charges the third hit eliminates.
        place(&mut g, "a", Point::new(b_body[1].x - 1, b_body[1].y), Direction::Right);
        g.move_player(&"a".to_string(), now, &mut rng);
        assert!(!g.players["a"].active);
    }

    #[test]
    fn timer_expiry_picks_highest_score_and_waits() {
        let (mut g, now) = started_game_with(&["a", "b"]);
        let mut rng = rand::rng();
        g.players.get_mut("a").unwrap().score = 3;
        g.players.get_mut("b").unwrap().score = 7;

        let after = now + Duration::from_secs(121);
        let events = g.tick(after, &mut rng);
        assert!(g.waiting_for_restart);
        assert_eq!(g.winner.as_deref(), Some("b"));
        assert_eq!(
            events,
            vec![GameEvent::ArenaGameOver {
                winner: Some("b".to_string())
            }]
        );
        assert!(g.players.values().all(|p| !p.active));

        // Movement input is ignored while waiting.
        let dir_before = g.players["a"].direction;
        g.set_direction(&"a".to_string(), dir_before.opposite(), after);
        assert_eq!(g.players["a"].direction, dir_before);
    }

    #[test]
    fn restart_waits_for_all_ready_then_resets() {
        let (mut g, now) = started_game_with(&["a", "b"]);
        let mut rng = rand::rng();
        g.players.get_mut("a").unwrap().score = 3;
        let after = now + Duration::from_secs(121);
        g.tick(after, &mut rng);
        assert!(g.waiting_for_restart);

        g.set_ready(&"a".to_string());
        g.tick(after, &mut rng);
        assert!(g.waiting_for_restart, "one ready player is not enough");

        g.set_ready(&"b".to_string());
        g.tick(after, &mut rng);
        assert!(!g.waiting_for_restart);
        assert!(g.winner.is_none());
        assert!(g.players.values().all(|p| p.active && p.score == 0));
    }

    #[test]
    fn frozen_player_skips_movement() {
        let (mut g, now) = started_game_with(&["a"]);
        let mut rng = rand::rng();
        place(&mut g, "a", Point::new(10, 10), Direction::Right);
        g.players.get_mut("a").unwrap().effects.add(PowerUpKind::Frozen, now);
        g.tick(now + Duration::from_millis(50), &mut rng);
        assert_eq!(g.players["a"].snake.head(), Point::new(10, 10));
    }

    #[test]
    fn freeze_pickup_freezes_everyone_else() {
        let (mut g, now) = started_game_with(&["a", "b"]);
        let mut rng = rand::rng();
        place(&mut g, "a", Point::new(10, 10), Direction::Right);
        place(&mut g, "b", Point::new(30, 30), Direction::Up);
        g.powerups = vec![BoardPowerUp {
            pos: Point::new(11, 10),
            kind: PowerUpKind::Freeze,
        }];
        g.move_player(&"a".to_string(), now, &mut rng);
        assert!(!g.players["a"].effects.has(PowerUpKind::Frozen, now));
        assert!(g.players["b"].effects.has(PowerUpKind::Frozen, now));
    }

    #[test]
    fn trail_blocks_eliminate_intruders() {
        let (mut g, now) = started_game_with(&["a", "b"]);
        let mut rng = rand::rng();
        place(&mut g, "b", Point::new(30, 30), Direction::Up);
        g.players
            .get_mut("b")
            .unwrap()
            .trail
            .push_back(Point::new(11, 10));
        place(&mut g, "a", Point::new(10, 10), Direction::Right);
        g.move_player(&"a".to_string(), now, &mut rng);
        assert!(!g.players["a"].active);
    }

    #[test]
    fn invisible_opponent_is_hidden_from_other_viewers() {
        let (mut g, now) = started_game_with(&["a", "b"]);
        g.players.get_mut("b").unwrap().effects.add(PowerUpKind::Invisible, now);

        let snap_a = g.snapshot(&"a".to_string(), now);
        assert!(snap_a.snakes["b"].is_empty());
        assert!(!snap_a.snakes["a"].is_empty());

        let snap_b = g.snapshot(&"b".to_string(), now);
        assert!(!snap_b.snakes["b"].is_empty(), "players always see themselves");
    }

    #[test]
    fn giant_pickup_grows_and_clamps_at_cap() {
        let (mut g, now) = started_game_with(&["a"]);
        let mut rng = rand::rng();
        place(&mut g, "a", Point::new(10, 10), Direction::Right);
        g.powerups = vec![BoardPowerUp {
            pos: Point::new(11, 10),
            kind: PowerUpKind::Giant,
        }];
        g.move_player(&"a".to_string(), now, &mut rng);
        assert_eq!(g.players["a"].snake.len(), 6);
        assert!(g.players["a"].snake.len() <= g.cfg.max_snake_length);
    }
}
