//! Capture the flag: two teams, lobby countdown, rounds ended by flag
//! deliveries, kill-based eliminations with a respawn cooldown.

use crate::board::{Board, Rect};
use crate::config::{CtfConfig, FlagDropPolicy};
use crate::entity::{Flag, FlagState, Snake};
use crate::error::RejectedInput;
use crate::modes::{pick_color, GameEvent};
use crate::movement::resolve_terrain;
use crate::powerup::{self, EffectSet, HUD_KINDS, SPAWNABLE_KINDS};
use protocol::snapshot::{BoardPowerUp, CtfSnapshot, PowerUpKind, PowerUpTimers};
use protocol::{Color, Direction, PlayerId, Point};
use rand::Rng;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::time::Instant;
use tracing::{debug, info};

const RED_SPAWNS: [Point; 12] = [
    Point::new(10, 10),
    Point::new(10, 15),
    Point::new(10, 20),
    Point::new(10, 25),
    Point::new(15, 10),
    Point::new(15, 15),
    Point::new(15, 20),
    Point::new(15, 25),
    Point::new(20, 10),
    Point::new(20, 15),
    Point::new(20, 20),
    Point::new(20, 25),
];

const BLUE_SPAWNS: [Point; 12] = [
    Point::new(40, 10),
    Point::new(40, 15),
    Point::new(40, 20),
    Point::new(40, 25),
    Point::new(45, 10),
    Point::new(45, 15),
    Point::new(45, 20),
    Point::new(45, 25),
    Point::new(50, 10),
    Point::new(50, 15),
    Point::new(50, 20),
    Point::new(50, 25),
];

/// Each team's 4x5 flag area against its own wall. Power-ups never spawn
/// inside these.
const RED_FLAG_AREA: Rect = Rect::new(1, 15, 4, 19);
const BLUE_FLAG_AREA: Rect = Rect::new(55, 15, 58, 19);

/// Flag bases sit at the center of each team's flag area.
const RED_BASE: Point = Point::new(3, 17);
const BLUE_BASE: Point = Point::new(57, 17);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Team {
    Red,
    Blue,
}

impl Team {
    pub fn parse(s: &str) -> Result<Self, RejectedInput> {
        match s {
            "red" => Ok(Team::Red),
            "blue" => Ok(Team::Blue),
            other => Err(RejectedInput::UnknownTeam(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Team::Red => "red",
            Team::Blue => "blue",
        }
    }

    pub fn opponent(&self) -> Team {
        match self {
            Team::Red => Team::Blue,
            Team::Blue => Team::Red,
        }
    }

    fn base(&self) -> Point {
        match self {
            Team::Red => RED_BASE,
            Team::Blue => BLUE_BASE,
        }
    }

    fn spawns(&self) -> &'static [Point] {
        match self {
            Team::Red => &RED_SPAWNS,
            Team::Blue => &BLUE_SPAWNS,
        }
    }

    /// Red faces right, blue faces left.
    fn facing(&self) -> Direction {
        match self {
            Team::Red => Direction::Right,
            Team::Blue => Direction::Left,
        }
    }
}

/// Match phase. Rounds inside `Active` are separated by a short pause
/// after each delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CtfPhase {
    Waiting,
    Countdown { since: Instant },
    Active { started: Instant, round_end: Option<Instant> },
    Finished,
}

impl CtfPhase {
    fn as_str(&self) -> &'static str {
        match self {
            CtfPhase::Waiting => "waiting",
            CtfPhase::Countdown { .. } => "countdown",
            CtfPhase::Active { .. } => "active",
            CtfPhase::Finished => "finished",
        }
    }
}

/// Outcome of a manual respawn request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RespawnOutcome {
    Respawned(Point),
    /// Cooldown not yet elapsed; carries the remaining seconds.
    Cooldown(f64),
    /// Unknown player or not eliminated.
    Ignored,
}

#[derive(Debug, Clone)]
struct CtfPlayer {
    snake: Snake,
    direction: Direction,
    color: Color,
    team: Team,
    active: bool,
    score: u32,
    ready: bool,
    effects: EffectSet,
    trail: VecDeque<Point>,
    skip_move: bool,
    eliminated_at: Option<Instant>,
}

pub struct CtfGame {
    cfg: CtfConfig,
    board: Board,
    players: BTreeMap<PlayerId, CtfPlayer>,
    red_flag: Flag,
    blue_flag: Flag,
    red_score: u32,
    blue_score: u32,
    powerups: Vec<BoardPowerUp>,
    phase: CtfPhase,
    tick: u64,
}

impl CtfGame {
    pub fn new(board: Board, cfg: CtfConfig) -> Self {
        Self {
            cfg,
            board,
            players: BTreeMap::new(),
            red_flag: Flag::new(RED_BASE),
            blue_flag: Flag::new(BLUE_BASE),
            red_score: 0,
            blue_score: 0,
            powerups: Vec::new(),
            phase: CtfPhase::Waiting,
            tick: 0,
        }
    }

    pub fn has_player(&self, id: &PlayerId) -> bool {
        self.players.contains_key(id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Join the match. An explicit team request is honored while that team
    /// has room; otherwise the smaller team is filled up.
    pub fn join<R: Rng>(
        &mut self,
        id: &PlayerId,
        requested: Option<&str>,
        rng: &mut R,
    ) -> Result<(Team, Point), RejectedInput> {
        if let Some(player) = self.players.get(id) {
            let team = player.team;
            let pos = self.spawn_player(id, team, rng);
            return Ok((team, pos));
        }
        let team = match requested {
            Some(name) => {
                let team = Team::parse(name)?;
                if self.team_count(team) >= self.cfg.team_capacity {
                    return Err(RejectedInput::TeamFull(team.as_str().to_string()));
                }
                team
            }
            None => {
                let team = if self.team_count(Team::Red) <= self.team_count(Team::Blue) {
                    Team::Red
                } else {
                    Team::Blue
                };
                if self.team_count(team) >= self.cfg.team_capacity {
                    return Err(RejectedInput::GameFull);
                }
                team
            }
        };
        let pos = self.spawn_player(id, team, rng);
        info!(player = %id, team = team.as_str(), "player joined ctf");
        Ok((team, pos))
    }

    pub fn remove(&mut self, id: &PlayerId) {
        if let Some(player) = self.players.remove(id) {
            self.drop_carried_flag(id, &player);
            info!(player = %id, "player left ctf");
        }
    }

    pub fn set_direction(&mut self, id: &PlayerId, direction: Direction, now: Instant) {
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

    /// Mark a lobby player ready. When every player on both (non-empty)
    /// teams is ready the pre-match countdown starts.
    pub fn set_ready(&mut self, id: &PlayerId, now: Instant) -> Option<GameEvent> {
        if self.phase != CtfPhase::Waiting {
            return None;
        }
        let player = self.players.get_mut(id)?;
        player.ready = true;
        let both_teams = self.team_count(Team::Red) > 0 && self.team_count(Team::Blue) > 0;
        if both_teams && self.players.values().all(|p| p.ready) {
            self.phase = CtfPhase::Countdown { since: now };
            info!(seconds = self.cfg.countdown_secs, "ctf countdown started");
            return Some(GameEvent::CountdownStarted {
                seconds: self.cfg.countdown_secs,
            });
        }
        None
    }

    /// Manual respawn after elimination, gated by the cooldown.
    pub fn try_respawn<R: Rng>(
        &mut self,
        id: &PlayerId,
        now: Instant,
        rng: &mut R,
    ) -> RespawnOutcome {
        let Some(player) = self.players.get(id) else {
            return RespawnOutcome::Ignored;
        };
        if player.active {
            return RespawnOutcome::Ignored;
        }
        let Some(eliminated_at) = player.eliminated_at else {
            return RespawnOutcome::Ignored;
        };
        let waited = now.duration_since(eliminated_at).as_secs_f64();
        if waited < self.cfg.respawn_cooldown_secs {
            return RespawnOutcome::Cooldown(self.cfg.respawn_cooldown_secs - waited);
        }
        let team = player.team;
        let pos = self.spawn_player(id, team, rng);
        RespawnOutcome::Respawned(pos)
    }

    /// Reset the whole match back to the lobby, keeping the roster.
    pub fn restart<R: Rng>(&mut self, rng: &mut R) {
        self.red_flag = Flag::new(RED_BASE);
        self.blue_flag = Flag::new(BLUE_BASE);
        self.red_score = 0;
        self.blue_score = 0;
        self.powerups.clear();
        self.phase = CtfPhase::Waiting;
        let roster: Vec<(PlayerId, Team)> = self
            .players
            .iter()
            .map(|(id, p)| (id.clone(), p.team))
            .collect();
        for (id, team) in roster {
            self.spawn_player(&id, team, rng);
        }
        for player in self.players.values_mut() {
            player.score = 0;
            player.ready = false;
        }
        info!("ctf match restarted");
    }

    pub fn tick<R: Rng>(&mut self, now: Instant, rng: &mut R) -> Vec<GameEvent> {
        let mut events = Vec::new();
        match self.phase {
            CtfPhase::Waiting | CtfPhase::Finished => {}
            CtfPhase::Countdown { since } => {
                if now.duration_since(since).as_secs() >= self.cfg.countdown_secs {
                    self.phase = CtfPhase::Active {
                        started: now,
                        round_end: None,
                    };
                    info!("ctf match started");
                }
            }
            CtfPhase::Active { started, round_end } => {
                // The match clock keeps running through the round-end pause.
                if now.duration_since(started).as_secs() >= self.cfg.match_duration_secs {
                    self.phase = CtfPhase::Finished;
                    let winner = self.winner();
                    info!(winner = %winner, "ctf match finished");
                    events.push(GameEvent::CtfGameOver { winner });
                    return events;
                }
                if let Some(since) = round_end {
                    if now.duration_since(since).as_secs() >= self.cfg.round_end_secs {
                        self.round_reset(rng);
                        self.phase = CtfPhase::Active {
                            started,
                            round_end: None,
                        };
                    }
                    return events;
                }

                self.sweep_effects(now);
                self.spawn_powerups(rng);

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
                        self.move_player(id, now, &mut events);
                    }
                }

                self.attract_dropped_flags(now);

                // A delivery pauses the round.
                if events.iter().any(|e| matches!(e, GameEvent::RoundWon { .. })) {
                    self.phase = CtfPhase::Active {
                        started,
                        round_end: Some(now),
                    };
                }
            }
        }
        events
    }

    pub fn snapshot(&self, viewer: &PlayerId, now: Instant) -> CtfSnapshot {
        let mut snap = CtfSnapshot {
            game_time: self.time_remaining(now),
            game_phase: self.phase.as_str().to_string(),
            powerups: self.powerups.clone(),
            ..CtfSnapshot::default()
        };
        if let CtfPhase::Countdown { since } = self.phase {
            let elapsed = now.duration_since(since).as_secs();
            snap.countdown = Some(self.cfg.countdown_secs.saturating_sub(elapsed));
        }
        if let CtfPhase::Active {
            round_end: Some(since),
            ..
        } = self.phase
        {
            let elapsed = now.duration_since(since).as_secs();
            snap.round_phase = Some("round_end".to_string());
            snap.round_countdown = Some(self.cfg.round_end_secs.saturating_sub(elapsed));
        }

        snap.flags.insert(
            "red".to_string(),
            self.red_flag.view(self.carrier_head(&self.red_flag)),
        );
        snap.flags.insert(
            "blue".to_string(),
            self.blue_flag.view(self.carrier_head(&self.blue_flag)),
        );
        snap.team_scores.insert("red".to_string(), self.red_score);
        snap.team_scores.insert("blue".to_string(), self.blue_score);
        snap.teams.insert("red".to_string(), self.team_members(Team::Red));
        snap.teams.insert("blue".to_string(), self.team_members(Team::Blue));

        let mut timers = PowerUpTimers::new();
        for (id, player) in &self.players {
            let hidden = id != viewer && player.effects.has(PowerUpKind::Invisible, now);
            snap.snakes
                .insert(id.clone(), if hidden { Vec::new() } else { player.snake.to_vec() });
            snap.directions.insert(id.clone(), player.direction);
            snap.colors.insert(id.clone(), player.color);
            snap.active.insert(id.clone(), player.active);
            snap.individual_scores.insert(id.clone(), player.score);
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

    /// The winning team name, or empty on a tie.
    pub fn winner(&self) -> String {
        if self.red_score > self.blue_score {
            "red".to_string()
        } else if self.blue_score > self.red_score {
            "blue".to_string()
        } else {
            String::new()
        }
    }

    fn time_remaining(&self, now: Instant) -> u64 {
        match self.phase {
            CtfPhase::Active { started, .. } => {
                let elapsed = now.duration_since(started).as_secs();
                self.cfg.match_duration_secs.saturating_sub(elapsed)
            }
            CtfPhase::Finished => 0,
            _ => self.cfg.match_duration_secs,
        }
    }

    fn team_count(&self, team: Team) -> usize {
        self.players.values().filter(|p| p.team == team).count()
    }

    fn team_members(&self, team: Team) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|(_, p)| p.team == team)
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn spawn_player<R: Rng>(&mut self, id: &PlayerId, team: Team, rng: &mut R) -> Point {
        let spawns = team.spawns();
        let pos = spawns[rng.random_range(0..spawns.len())];
        let snake = Snake::new(pos, self.cfg.start_length, team.facing().opposite());
        match self.players.get_mut(id) {
            Some(player) => {
                player.snake = snake;
                player.direction = team.facing();
                player.active = true;
                player.skip_move = false;
                player.eliminated_at = None;
                player.trail.clear();
            }
            None => {
                let color = pick_color(id, self.players.values().map(|p| &p.color));
                self.players.insert(
                    id.clone(),
                    CtfPlayer {
                        snake,
                        direction: team.facing(),
                        color,
                        team,
                        active: true,
                        score: 0,
                        ready: false,
                        effects: EffectSet::default(),
                        trail: VecDeque::new(),
                        skip_move: false,
                        eliminated_at: None,
                    },
                );
            }
        }
        pos
    }

    fn sweep_effects(&mut self, now: Instant) {
        for player in self.players.values_mut() {
            let lapsed = player.effects.sweep_expired(now);
            if lapsed.contains(&PowerUpKind::Trail) {
                player.trail.clear();
            }
        }
    }

    fn spawn_powerups<R: Rng>(&mut self, rng: &mut R) {
        if !rng.random_bool(self.cfg.powerup_spawn_chance) {
            return;
        }
        let mut occupied: HashSet<Point> = self
            .players
            .values()
            .flat_map(|p| p.snake.segments())
            .collect();
        occupied.insert(self.red_flag.position(self.carrier_head(&self.red_flag)));
        occupied.insert(self.blue_flag.position(self.carrier_head(&self.blue_flag)));
        if let Some(pu) = powerup::try_spawn(
            &self.board,
            &occupied,
            &self.powerups,
            self.cfg.max_powerups,
            self.cfg.max_powerups_per_kind,
            &SPAWNABLE_KINDS,
            &[RED_FLAG_AREA, BLUE_FLAG_AREA],
            rng,
        ) {
            self.powerups.push(pu);
        }
    }

    fn move_player(&mut self, id: &PlayerId, now: Instant, events: &mut Vec<GameEvent>) {
        let Some(mut player) = self.players.remove(id) else {
            return;
        };
        if player.skip_move {
            player.skip_move = false;
            self.players.insert(id.clone(), player);
            return;
        }

        let candidate = player.direction.apply(player.snake.head());
        let shielded = player.effects.has(PowerUpKind::Shield, now);
        let terrain = resolve_terrain(&self.board, &[], &[], candidate, shielded);
        if terrain.shield_consumed {
            player.effects.consume_one(PowerUpKind::Shield, now);
        }
        if terrain.eliminated {
            self.eliminate(id, player, now);
            return;
        }
        let head = terrain.head;

        if player.snake.hits_self(head) {
            if player.effects.has(PowerUpKind::Shield, now) {
                player.effects.consume_one(PowerUpKind::Shield, now);
            } else {
                self.eliminate(id, player, now);
                return;
            }
        }

        // Body contact: a teammate's body eliminates the mover; an
        // opponent's body eliminates the opponent and scores the kill.
        let hit: Option<(PlayerId, Team)> = self
            .players
            .iter()
            .filter(|(_, other)| other.active && other.snake.contains(head))
            .map(|(oid, other)| (oid.clone(), other.team))
            .next();
        if let Some((victim_id, victim_team)) = hit {
            if victim_team == player.team {
                if player.effects.has(PowerUpKind::Shield, now) {
                    player.effects.consume_one(PowerUpKind::Shield, now);
                } else {
                    self.eliminate(id, player, now);
                    return;
                }
            } else {
                player.score += self.cfg.kill_score;
                debug!(killer = %id, victim = %victim_id, "ctf kill");
                if let Some(victim) = self.players.remove(&victim_id) {
                    self.eliminate(&victim_id, victim, now);
                }
            }
        }

        player.snake.advance(head, false);

        if let Some(i) = self.powerups.iter().position(|p| p.pos == head) {
            let picked = self.powerups.remove(i);
            debug!(player = %id, kind = ?picked.kind, "ctf power-up picked up");
            player.effects.add(picked.kind, now);
            match picked.kind {
                // Freeze only hits the opposing team.
                PowerUpKind::Freeze => {
                    for other in self.players.values_mut() {
                        if other.team != player.team && other.active {
                            other.effects.add(PowerUpKind::Frozen, now);
                        }
                    }
                }
                PowerUpKind::Giant => player.snake.extend_tail(3),
                _ => {}
            }
            player.snake.clamp_len(self.cfg.max_snake_length);
        }

        // Delivery first, then capture, as the rounds expect.
        let opponent_flag = match player.team {
            Team::Red => &mut self.blue_flag,
            Team::Blue => &mut self.red_flag,
        };
        if opponent_flag.is_carried_by(id) && Self::in_home_half(&self.board, head, player.team)
        {
            opponent_flag.return_to_base();
            player.score += self.cfg.delivery_score;
            match player.team {
                Team::Red => self.red_score += self.cfg.delivery_score,
                Team::Blue => self.blue_score += self.cfg.delivery_score,
            }
            info!(player = %id, team = player.team.as_str(), "flag delivered");
            events.push(GameEvent::FlagDelivered {
                message: format!("{} delivered the flag!", id),
            });
            events.push(GameEvent::RoundWon {
                winning_team: player.team.as_str().to_string(),
                winning_player: id.clone(),
            });
        } else if !opponent_flag.is_captured()
            && opponent_flag.position(None) == head
        {
            opponent_flag.capture(id.clone());
            player.score += self.cfg.capture_score;
            info!(player = %id, "flag captured");
            events.push(GameEvent::FlagCaptured {
                player: id.clone(),
                team: player.team.opponent().as_str().to_string(),
            });
        }

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
            self.eliminate(id, player, now);
            return;
        }

        self.players.insert(id.clone(), player);
    }

    /// Eliminate a player already removed from the registry, dropping any
    /// carried flag per the configured policy, then reinsert the body.
    fn eliminate(&mut self, id: &PlayerId, mut player: CtfPlayer, now: Instant) {
        debug!(player = %id, "ctf player eliminated");
        player.active = false;
        player.eliminated_at = Some(now);
        player.effects.clear();
        player.trail.clear();
        self.drop_carried_flag(id, &player);
        self.players.insert(id.clone(), player);
    }

    fn drop_carried_flag(&mut self, id: &PlayerId, player: &CtfPlayer) {
        let drop_pos = match self.cfg.flag_drop_policy {
            FlagDropPolicy::CarrierHead => Some(player.snake.head()),
            FlagDropPolicy::LastSegment => Some(player.snake.tail()),
            FlagDropPolicy::ReturnToBase => None,
        };
        for flag in [&mut self.red_flag, &mut self.blue_flag] {
            if flag.is_carried_by(id) {
                match drop_pos {
                    Some(pos) => flag.drop_at(pos),
                    None => flag.return_to_base(),
                }
            }
        }
    }

    /// Magnet holders pull dropped flags one cell toward their head. The
    /// nudge is skipped when the target cell is occupied.
    fn attract_dropped_flags(&mut self, now: Instant) {
        let magnets: Vec<Point> = self
            .players
            .values()
            .filter(|p| p.active && p.effects.has(PowerUpKind::Magnet, now))
            .map(|p| p.snake.head())
            .collect();
        let mut blocked: HashSet<Point> = self
            .players
            .values()
            .flat_map(|p| p.snake.segments())
            .collect();
        blocked.extend(self.powerups.iter().map(|p| p.pos));
        for flag in [&mut self.red_flag, &mut self.blue_flag] {
            let FlagState::Dropped(pos) = flag.state else {
                continue;
            };
            for head in &magnets {
                let dist = pos.manhattan(*head);
                if dist > 1 && dist <= self.cfg.magnet_range {
                    let next = pos.step_toward(*head);
                    if self.board.contains(next) && !blocked.contains(&next) {
                        flag.drop_at(next);
                    }
                    break;
                }
            }
        }
    }

    /// Each team's home area is its half of the board.
    fn in_home_half(board: &Board, p: Point, team: Team) -> bool {
        match team {
            Team::Red => p.x < board.width / 2,
            Team::Blue => p.x >= board.width / 2,
        }
    }

    fn round_reset<R: Rng>(&mut self, rng: &mut R) {
        self.red_flag = Flag::new(RED_BASE);
        self.blue_flag = Flag::new(BLUE_BASE);
        self.powerups.clear();
        let roster: Vec<(PlayerId, Team)> = self
            .players
            .iter()
            .map(|(id, p)| (id.clone(), p.team))
            .collect();
        for (id, team) in roster {
            self.spawn_player(&id, team, rng);
        }
        for player in self.players.values_mut() {
            player.effects.clear();
            player.trail.clear();
        }
        info!("ctf round reset");
    }

    fn carrier_head(&self, flag: &Flag) -> Option<Point> {
        flag.carrier()
            .and_then(|id| self.players.get(id))
            .map(|p| p.snake.head())
    }
}
