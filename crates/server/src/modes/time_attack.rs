//! Time attack: a private timed run per player, score against the clock.

use crate::board::Board;
use crate::config::TimeAttackConfig;
use crate::entity::{place_obstacles, place_portals, Obstacle, Snake};
use crate::error::RejectedInput;
use crate::movement::{attract_food, resolve_terrain};
use crate::powerup::{self, EffectSet};
use protocol::snapshot::{BoardPowerUp, ObstacleKind, PowerUpKind, TimeAttackSnapshot};
use protocol::{Direction, Point};
use rand::Rng;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info};

/// Power-up kinds that spawn in this mode.
const ALLOWED_KINDS: [PowerUpKind; 4] = [
    PowerUpKind::Shield,
    PowerUpKind::Speed,
    PowerUpKind::Reverse,
    PowerUpKind::Magnet,
];

/// Run difficulty. Harder runs are shorter and denser with obstacles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn parse(s: &str) -> Result<Self, RejectedInput> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(RejectedInput::UnknownDifficulty(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Run length in seconds.
    pub fn time_secs(&self) -> u64 {
        match self {
            Difficulty::Easy => 120,
            Difficulty::Medium => 90,
            Difficulty::Hard => 60,
        }
    }

    /// Multiplier over the base obstacle count.
    pub fn obstacle_multiplier(&self) -> f64 {
        match self {
            Difficulty::Easy => 1.5,
            Difficulty::Medium => 2.0,
            Difficulty::Hard => 2.5,
        }
    }
}

/// One player's private run.
pub struct TimeAttackGame {
    cfg: TimeAttackConfig,
    board: Board,
    snake: Snake,
    direction: Direction,
    food: Vec<Point>,
    golden_food: Option<Point>,
    obstacles: Vec<Obstacle>,
    portals: Vec<(Point, Point)>,
    powerups: Vec<BoardPowerUp>,
    effects: EffectSet,
    score: u32,
    time_left: f64,
    difficulty: Difficulty,
    last_update: Instant,
    game_active: bool,
    high_score: u32,
    respawn_count: u32,
    skip_move: bool,
    tick: u64,
}

impl TimeAttackGame {
    pub fn new<R: Rng>(
        board: Board,
        cfg: TimeAttackConfig,
        difficulty: Difficulty,
        now: Instant,
        rng: &mut R,
    ) -> Self {
        let snake = Snake::new(board.center(), cfg.start_length, Direction::Left);
        let mut game = Self {
            cfg,
            board,
            snake,
            direction: Direction::Right,
            food: Vec::new(),
            golden_food: None,
            obstacles: Vec::new(),
            portals: Vec::new(),
            powerups: Vec::new(),
            effects: EffectSet::default(),
            score: 0,
            time_left: difficulty.time_secs() as f64,
            difficulty,
            last_update: now,
            game_active: true,
            high_score: 0,
            respawn_count: 0,
            skip_move: false,
            tick: 0,
        };
        for _ in 0..game.cfg.food_count {
            let food = game.spawn_food(rng);
            game.food.push(food);
        }
        let count =
            (game.cfg.base_obstacles as f64 * difficulty.obstacle_multiplier()) as usize;
        let occupied = game.occupied_cells();
        game.obstacles =
            place_obstacles(&game.board, &[(ObstacleKind::Slow, count)], &occupied, rng);
        let occupied = game.occupied_cells();
        game.portals = place_portals(&game.board, &occupied, rng);
        info!(difficulty = difficulty.as_str(), "time attack run started");
        game
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_active(&self) -> bool {
        self.game_active
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Direction changes reject 180-turns and moves into the snake's own
    /// neck. Reverse flips the input first.
    pub fn set_direction(&mut self, direction: Direction, now: Instant) {
        if !self.game_active {
            return;
        }
        let direction = if self.effects.has(PowerUpKind::Reverse, now) {
            direction.opposite()
        } else {
            direction
        };
        if direction == self.direction.opposite() {
            return;
        }
        if self.snake.neck() == Some(direction.apply(self.snake.head())) {
            return;
        }
        self.direction = direction;
    }

    /// Voluntary respawn mid-run.
    pub fn manual_respawn(&mut self) {
        if self.game_active {
            self.respawn();
        }
    }

    /// Advance the run. Returns `true` on the tick the clock runs out.
    pub fn update<R: Rng>(&mut self, now: Instant, rng: &mut R) -> bool {
        if !self.game_active {
            return false;
        }
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.last_update = now;
        self.time_left -= elapsed;
        if self.time_left <= 0.0 {
            self.time_left = 0.0;
            self.game_active = false;
            self.high_score = self.high_score.max(self.score);
            info!(score = self.score, "time attack run finished");
            return true;
        }

        self.effects.sweep_expired(now);

        let move_now = self.effects.has(PowerUpKind::Speed, now) || self.tick % 2 == 0;
        self.tick += 1;
        if move_now {
            self.step(now, rng);
        }

        if self.effects.has(PowerUpKind::Magnet, now) {
            let blocked: HashSet<Point> = self.snake.segments().collect();
            attract_food(
                &self.board,
                self.snake.head(),
                self.cfg.magnet_range,
                &mut self.food,
                &blocked,
            );
        }

        self.spawn_board_items(rng);
        false
    }

    pub fn snapshot(&self) -> TimeAttackSnapshot {
        TimeAttackSnapshot {
            snake: self.snake.to_vec(),
            direction: self.direction,
            food: self.food.clone(),
            golden_food: self.golden_food,
            obstacles: self.obstacles.clone(),
            portals: self.portals.clone(),
            powerups: self.powerups.clone(),
            score: self.score,
            time_left: self.time_left,
            difficulty: self.difficulty.as_str().to_string(),
            game_active: self.game_active,
            high_score: self.high_score,
            respawn_count: self.respawn_count,
        }
    }

    fn step<R: Rng>(&mut self, now: Instant, rng: &mut R) {
        if self.skip_move {
            self.skip_move = false;
            return;
        }
        let candidate = self.direction.apply(self.snake.head());
        let shielded = self.effects.has(PowerUpKind::Shield, now);
        let terrain =
            resolve_terrain(&self.board, &self.obstacles, &self.portals, candidate, shielded);
        if terrain.shield_consumed {
            self.effects.consume_one(PowerUpKind::Shield, now);
        }
        if terrain.eliminated {
            self.respawn();
            return;
        }
        if terrain.poison && !self.snake.shrink_tail() {
            self.respawn();
            return;
        }
        if terrain.slowed {
            self.skip_move = true;
        }
        let head = terrain.head;

        if self.snake.hits_self(head) {
            if self.effects.has(PowerUpKind::Shield, now) {
                self.effects.consume_one(PowerUpKind::Shield, now);
            } else {
                self.respawn();
                return;
            }
        }

        let mut grew = false;
        if self.golden_food == Some(head) {
            self.golden_food = None;
            self.score += self.cfg.golden_food_score;
            self.time_left += self.cfg.golden_food_bonus_secs as f64;
            grew = true;
        } else if let Some(i) = self.food.iter().position(|f| *f == head) {
            self.food.remove(i);
            self.score += self.cfg.food_score;
            self.time_left += self.cfg.food_bonus_secs as f64;
            grew = true;
        }

        self.snake.advance(head, grew);

        if let Some(i) = self.powerups.iter().position(|p| p.pos == head) {
            let picked = self.powerups.remove(i);
            debug!(kind = ?picked.kind, "time attack power-up picked up");
            self.effects.add(picked.kind, now);
            self.time_left += self.cfg.powerup_bonus_secs as f64;
        }

        self.snake.clamp_len(self.cfg.max_snake_length);

        while self.food.len() < self.cfg.food_count {
            let food = self.spawn_food(rng);
            self.food.push(food);
        }
    }

    fn respawn(&mut self) {
        self.snake = Snake::new(self.board.center(), self.cfg.start_length, Direction::Left);
        self.direction = Direction::Right;
        self.respawn_count += 1;
        self.skip_move = false;
        debug!(respawns = self.respawn_count, "time attack snake respawned");
    }

    fn spawn_board_items<R: Rng>(&mut self, rng: &mut R) {
        if self.golden_food.is_none() && rng.random_bool(self.cfg.golden_food_chance) {
            self.golden_food = Some(self.spawn_food(rng));
        }
        if rng.random_bool(self.cfg.powerup_spawn_chance) {
            let occupied = self.occupied_cells();
            if let Some(pu) = powerup::try_spawn(
                &self.board,
                &occupied,
                &self.powerups,
                self.cfg.max_powerups,
                self.cfg.max_powerups,
                &ALLOWED_KINDS,
                &[],
                rng,
            ) {
                self.powerups.push(pu);
            }
        }
    }

    fn occupied_cells(&self) -> HashSet<Point> {
        let mut occupied: HashSet<Point> = self.snake.segments().collect();
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

    fn run(difficulty: Difficulty) -> (TimeAttackGame, Instant) {
        let now = Instant::now();
        let mut rng = rand::rng();
        let mut g = TimeAttackGame::new(
            Board::new(60, 35),
            TimeAttackConfig::default(),
            difficulty,
            now,
            &mut rng,
        );
        g.obstacles.clear();
        g.portals.clear();
        g.powerups.clear();
        g.golden_food = None;
        (g, now)
    }

    #[test]
    fn difficulty_parses_and_scales() {
        assert_eq!(Difficulty::parse("easy").unwrap(), Difficulty::Easy);
        assert_eq!(Difficulty::parse("hard").unwrap().time_secs(), 60);
        assert!(matches!(
            Difficulty::parse("nightmare"),
            Err(RejectedInput::UnknownDifficulty(_))
        ));
        let base = TimeAttackConfig::default().base_obstacles as f64;
        assert_eq!((base * Difficulty::Easy.obstacle_multiplier()) as usize, 12);
        assert_eq!((base * Difficulty::Hard.obstacle_multiplier()) as usize, 20);
    }

    #[test]
    fn new_run_starts_centered_facing_right() {
        let (g, _) = run(Difficulty::Easy);
        assert_eq!(g.snake.head(), Point::new(30, 17));
        assert_eq!(g.direction, Direction::Right);
        assert_eq!(g.snake.len(), 3);
        assert_eq!(g.food.len(), 3);
        assert!((g.time_left - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn eating_food_scores_and_adds_time() {
        let (mut g, now) = run(Difficulty::Easy);
        let mut rng = rand::rng();
        g.food = vec![Point::new(31, 17)];
        let before = g.time_left;
        g.update(now + Duration::from_millis(50), &mut rng);
        assert_eq!(g.score, 10);
        assert!(g.time_left > before + 4.0, "apple adds five seconds");
        // The board is replenished back to the configured count.
        assert_eq!(g.food.len(), 3);
    }

    #[test]
    fn golden_food_is_worth_more() {
        let (mut g, now) = run(Difficulty::Easy);
        let mut rng = rand::rng();
        g.food = vec![Point::new(0, 0)];
        g.golden_food = Some(Point::new(31, 17));
        let before = g.time_left;
        g.update(now + Duration::from_millis(50), &mut rng);
        assert_eq!(g.score, 50);
        assert!(g.time_left > before + 14.0);
        assert!(g.golden_food.is_none());
    }

    #[test]
    fn clock_expiry_ends_run_and_folds_high_score() {
        let (mut g, now) = run(Difficulty::Hard);
        let mut rng = rand::rng();
        g.score = 70;
        let finished = g.update(now + Duration::from_secs(61), &mut rng);
        assert!(finished);
        assert!(!g.game_active);
        assert_eq!(g.high_score, 70);
        // Further updates are inert.
        assert!(!g.update(now + Duration::from_secs(62), &mut rng));
    }

    #[test]
    fn wall_hit_respawns_at_center() {
        let (mut g, now) = run(Difficulty::Easy);
        let mut rng = rand::rng();
        g.snake = Snake::new(Point::new(59, 17), 3, Direction::Left);
        g.direction = Direction::Right;
        g.update(now + Duration::from_millis(50), &mut rng);
        assert_eq!(g.respawn_count, 1);
        assert_eq!(g.snake.head(), Point::new(30, 17));
        assert!(g.game_active, "elimination never ends the run");
    }

    #[test]
    fn neck_turns_are_rejected() {
        let (mut g, now) = run(Difficulty::Easy);
        // Head (30,17), neck (29,17): LEFT is both a 180 and a neck move.
        g.set_direction(Direction::Left, now);
        assert_eq!(g.direction, Direction::Right);
        g.set_direction(Direction::Up, now);
        assert_eq!(g.direction, Direction::Up);
        // Now LEFT is no longer a 180, but it still runs into the neck.
        g.set_direction(Direction::Left, now);
        assert_eq!(g.direction, Direction::Up);
    }

    #[test]
    fn manual_respawn_is_counted() {
        let (mut g, _) = run(Difficulty::Medium);
        g.manual_respawn();
        g.manual_respawn();
        assert_eq!(g.respawn_count, 2);
    }
}
