//! Shared game state and the main tick loop.

use crate::board::Board;
use crate::config::Config;
use crate::error::RejectedInput;
use crate::modes::arena::ArenaGame;
use crate::modes::ctf::{CtfGame, RespawnOutcome};
use crate::modes::time_attack::{Difficulty, TimeAttackGame};
use crate::modes::GameEvent;
use crate::server::client::Client;
use crate::server::TargetedMessage;
use futures_util::FutureExt;
use protocol::messages::{ClientMessage, ServerMessage};
use protocol::{PlayerId, ProtocolError};
use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, RwLock};
use tokio::time::{interval_at, sleep, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Authoritative state behind the `Arc<RwLock<..>>` every connection shares.
pub struct GameState {
    /// Server configuration.
    pub config: Config,
    /// Connected sessions by session id.
    pub clients: HashMap<u32, Client>,
    /// Next session ID to assign.
    next_client_id: u32,
    /// The shared classic arena.
    arena: ArenaGame,
    /// Per-player Time Attack runs.
    time_attack: BTreeMap<PlayerId, TimeAttackGame>,
    /// The shared capture-the-flag match.
    ctf: CtfGame,
    /// Channel for per-session outbound messages.
    pub targeted_tx: broadcast::Sender<TargetedMessage>,
    /// Total ticks processed.
    pub tick_count: u64,
    /// Exponential moving average of tick duration (ms).
    pub update_time_avg: f64,
}

impl GameState {
    pub fn new(config: &Config, targeted_tx: broadcast::Sender<TargetedMessage>) -> Self {
        let board = Board::new(config.board.width, config.board.height);
        Self {
            config: config.clone(),
            clients: HashMap::new(),
            next_client_id: 1,
            arena: ArenaGame::new(board, config.arena.clone()),
            time_attack: BTreeMap::new(),
            ctf: CtfGame::new(board, config.ctf.clone()),
            targeted_tx,
            tick_count: 0,
            update_time_avg: 0.0,
        }
    }

    /// Register a new session, returning its id.
    pub fn add_client(&mut self, addr: SocketAddr) -> u32 {
        let id = self.next_client_id;
        self.next_client_id += 1;
        self.clients.insert(id, Client::new(id, addr));
        id
    }

    /// Drop a session and, if it was the last one bound to its player id,
    /// remove that player from every mode.
    pub fn remove_client(&mut self, client_id: u32) {
        let Some(client) = self.clients.remove(&client_id) else {
            return;
        };
        let Some(player_id) = client.player_id else {
            return;
        };
        let still_bound = self
            .clients
            .values()
            .any(|c| c.player_id.as_ref() == Some(&player_id));
        if still_bound {
            return;
        }
        self.arena.remove(&player_id);
        self.time_attack.remove(&player_id);
        self.ctf.remove(&player_id);
        info!("Player {} left", player_id);
    }

    /// Handle one decoded text frame from a session.
    pub fn handle_message(&mut self, client_id: u32, text: &str) -> Result<(), ProtocolError> {
        let message = ClientMessage::parse(text)?;
        let player_id = message.player_id().clone();
        if !self.bind_player(client_id, &player_id) {
            self.send_to(
                client_id,
                ServerMessage::Error {
                    message: RejectedInput::DuplicateId(player_id).to_string(),
                },
            );
            return Ok(());
        }

        let now = Instant::now();
        let mut rng = rand::rng();
        match message {
            ClientMessage::Join { .. } => {
                if let Err(e) = self.arena.join(&player_id, &mut rng) {
                    self.reject(client_id, e);
                } else {
                    info!("Player {} joined the arena", player_id);
                }
            }
            ClientMessage::Move { direction, .. } => {
                self.arena.set_direction(&player_id, direction, now);
            }
            ClientMessage::Ready { .. } => {
                self.arena.set_ready(&player_id);
            }
            ClientMessage::Restart { .. } => {
                self.arena.respawn(&player_id, &mut rng);
            }

            ClientMessage::StartTimeAttack { difficulty, .. } => match Difficulty::parse(&difficulty) {
                Ok(difficulty) => {
                    let game = TimeAttackGame::new(
                        Board::new(self.config.board.width, self.config.board.height),
                        self.config.time_attack.clone(),
                        difficulty,
                        now,
                        &mut rng,
                    );
                    self.time_attack.insert(player_id.clone(), game);
                    info!("Player {} started time attack ({})", player_id, difficulty.as_str());
                    self.send_to(
                        client_id,
                        ServerMessage::TimeAttackStarted {
                            difficulty: difficulty.as_str().to_string(),
                            time: difficulty.time_secs(),
                        },
                    );
                }
                Err(e) => self.reject(client_id, e),
            },
            ClientMessage::TimeAttackMove { direction, .. } => {
                if let Some(game) = self.time_attack.get_mut(&player_id) {
                    game.set_direction(direction, now);
                }
            }
            ClientMessage::TimeAttackRespawn { .. } => {
                if let Some(game) = self.time_attack.get_mut(&player_id) {
                    game.manual_respawn();
                }
            }

            ClientMessage::CtfJoin { team, .. } => {
                match self.ctf.join(&player_id, team.as_deref(), &mut rng) {
                    Ok((team, position)) => {
                        info!("Player {} joined CTF team {}", player_id, team.as_str());
                        self.send_to(
                            client_id,
                            ServerMessage::CtfJoined {
                                team: team.as_str().to_string(),
                                position,
                            },
                        );
                    }
                    Err(e) => self.reject(client_id, e),
                }
            }
            ClientMessage::CtfMove { direction, .. } => {
                self.ctf.set_direction(&player_id, direction, now);
            }
            ClientMessage::CtfReady { .. } => {
                if let Some(GameEvent::CountdownStarted { seconds }) =
                    self.ctf.set_ready(&player_id, now)
                {
                    info!("CTF countdown started ({}s)", seconds);
                    self.send_to_all(ServerMessage::CtfCountdownStarted { countdown: seconds });
                }
            }
            ClientMessage::CtfRespawn { .. } => {
                match self.ctf.try_respawn(&player_id, now, &mut rng) {
                    RespawnOutcome::Respawned(_) => {
                        self.send_to_all(ServerMessage::CtfRespawned {
                            client_id: player_id,
                        });
                    }
                    RespawnOutcome::Cooldown(remaining_time) => {
                        self.send_to(
                            client_id,
                            ServerMessage::CtfRespawnFailed {
                                client_id: player_id,
                                remaining_time,
                            },
                        );
                    }
                    RespawnOutcome::Ignored => {}
                }
            }
            ClientMessage::CtfRestart { .. } => {
                info!("Player {} restarted the CTF match", player_id);
                self.ctf.restart(&mut rng);
            }
        }
        Ok(())
    }

    /// Advance every mode one tick and collect the outbound messages. The
    /// caller sends them after releasing the state lock.
    pub fn tick(&mut self) -> Vec<TargetedMessage> {
        let now = Instant::now();
        let mut rng = rand::rng();
        self.tick_count += 1;

        let mut events = self.arena.tick(now, &mut rng);
        for (player_id, game) in self.time_attack.iter_mut() {
            if game.update(now, &mut rng) {
                events.push(GameEvent::TimeAttackOver {
                    player: player_id.clone(),
                    score: game.score(),
                });
            }
        }
        if self.ctf.player_count() > 0 {
            events.extend(self.ctf.tick(now, &mut rng));
        }

        let mut announcements = Vec::new();
        for event in events {
            self.log_or_announce(event, &mut announcements);
        }

        let mut out = Vec::new();
        for client in self.clients.values() {
            for message in &announcements {
                out.push(TargetedMessage {
                    client_id: client.id,
                    message: message.clone(),
                });
            }
            let Some(player_id) = &client.player_id else {
                continue;
            };
            if self.arena.has_player(player_id) {
                out.push(TargetedMessage {
                    client_id: client.id,
                    message: ServerMessage::State(self.arena.snapshot(player_id, now)),
                });
            }
            if let Some(game) = self.time_attack.get(player_id) {
                out.push(TargetedMessage {
                    client_id: client.id,
                    message: ServerMessage::TimeAttackState(game.snapshot()),
                });
            }
            if self.ctf.has_player(player_id) {
                out.push(TargetedMessage {
                    client_id: client.id,
                    message: ServerMessage::CtfState(self.ctf.snapshot(player_id, now)),
                });
            }
        }
        out
    }

    /// Bind a session to the player id its messages carry. Returns false
    /// when the id is already owned by another live session.
    fn bind_player(&mut self, client_id: u32, player_id: &PlayerId) -> bool {
        let taken = self
            .clients
            .values()
            .any(|c| c.id != client_id && c.player_id.as_ref() == Some(player_id));
        let Some(client) = self.clients.get_mut(&client_id) else {
            return false;
        };
        client.touch();
        match &client.player_id {
            Some(bound) => bound == player_id,
            None => {
                if taken {
                    return false;
                }
                client.player_id = Some(player_id.clone());
                true
            }
        }
    }

    fn log_or_announce(&self, event: GameEvent, announcements: &mut Vec<ServerMessage>) {
        match event {
            GameEvent::ArenaGameOver { winner } => match winner {
                Some(winner) => info!("Arena match over, winner: {}", winner),
                None => info!("Arena match over with no winner"),
            },
            GameEvent::TimeAttackOver { player, score } => {
                info!("Time attack run over for {}: score {}", player, score);
            }
            GameEvent::FlagCaptured { player, team } => {
                info!("{} captured the {} flag", player, team);
            }
            GameEvent::CountdownStarted { seconds } => {
                announcements.push(ServerMessage::CtfCountdownStarted { countdown: seconds });
            }
            GameEvent::FlagDelivered { message } => {
                info!("{}", message);
                announcements.push(ServerMessage::CtfFlagDelivered { message });
            }
            GameEvent::RoundWon {
                winning_team,
                winning_player,
            } => {
                announcements.push(ServerMessage::CtfRoundWon {
                    winning_team,
                    winning_player,
                });
            }
            GameEvent::CtfGameOver { winner } => {
                if winner.is_empty() {
                    info!("CTF match over in a tie");
                } else {
                    info!("CTF match over, winner: {}", winner);
                }
                announcements.push(ServerMessage::CtfGameOver { winner });
            }
        }
    }

    fn send_to(&self, client_id: u32, message: ServerMessage) {
        // Send fails only when no connection task is listening.
        let _ = self.targeted_tx.send(TargetedMessage { client_id, message });
    }

    fn send_to_all(&self, message: ServerMessage) {
        for client in self.clients.values() {
            self.send_to(client.id, message.clone());
        }
    }

    fn reject(&self, client_id: u32, error: RejectedInput) {
        debug!("Rejected input from session {}: {}", client_id, error);
        self.send_to(
            client_id,
            ServerMessage::Error {
                message: error.to_string(),
            },
        );
    }
}

/// Run the main game loop.
pub async fn run_game_loop(state: Arc<RwLock<GameState>>, tick_interval_ms: u64) {
    let start = Instant::now() + Duration::from_millis(tick_interval_ms);
    let mut ticker = interval_at(start.into(), Duration::from_millis(tick_interval_ms));
    // Use Skip to catch up on missed ticks - ensures consistent game speed.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let scheduled = ticker.tick().await;

        // Hibernate when no users are connected to reduce CPU usage
        {
            let game = state.read().await;
            if game.clients.is_empty() {
                drop(game);
                sleep(Duration::from_millis((tick_interval_ms * 4).max(100))).await;
                continue;
            }
        }

        // Drain any backlog of tick events so we always process the most recent tick.
        // This keeps user inputs up-to-date when the server falls behind.
        let mut skipped = 0u32;
        while ticker.tick().now_or_never().is_some() {
            skipped += 1;
        }
        if skipped > 0 {
            debug!(
                "Skipped {} ticks to stay current (lag: {:?})",
                skipped,
                tokio::time::Instant::now().saturating_duration_since(scheduled)
            );
        }

        // Run tick and extract pending messages
        let (messages, targeted_tx) = {
            let mut game = state.write().await;
            let tick_start = Instant::now();
            let messages = game.tick();
            let tick_ms = tick_start.elapsed().as_secs_f64() * 1000.0;

            // Exponential moving average (weight 0.5, matches typical server stat smoothing)
            game.update_time_avg = game.update_time_avg * 0.5 + tick_ms * 0.5;

            let tick_budget = tick_interval_ms as f64 * 0.9;
            if tick_ms > tick_budget {
                warn!(
                    "Slow tick #{}: {:.3}ms (budget: {:.1}ms) - {} sessions",
                    game.tick_count,
                    tick_ms,
                    tick_budget,
                    game.clients.len()
                );
            }

            (messages, game.targeted_tx.clone())
        }; // Write lock released here

        // Fan out without holding any lock.
        for message in messages {
            let _ = targeted_tx.send(message);
        }
    }
}
