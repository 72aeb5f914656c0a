//! WebSocket server implementation.

use crate::config::Config;
use futures_util::{SinkExt, StreamExt};
use protocol::messages::ServerMessage;
use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, RwLock};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{error, info, warn};

pub mod client;
pub mod game;

pub use game::{run_game_loop, GameState};

/// A message targeted at a specific session.
#[derive(Debug, Clone)]
pub struct TargetedMessage {
    /// Target session ID.
    pub client_id: u32,
    /// The message to deliver.
    pub message: ServerMessage,
}

/// Connection tracking state (shared across connection handlers).
struct ConnectionState {
    /// Number of connections per IP address.
    ip_connections: HashMap<IpAddr, usize>,
    /// Total number of connections.
    total_connections: usize,
    /// Banned IP addresses.
    ban_list: HashSet<IpAddr>,
}

impl ConnectionState {
    fn new() -> Self {
        Self {
            ip_connections: HashMap::new(),
            total_connections: 0,
            ban_list: HashSet::new(),
        }
    }

    /// Load ban list from file.
    fn load_ban_list(&mut self, path: &Path) {
        if !path.exists() {
            info!("No ban list file found at {:?}", path);
            return;
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let mut count = 0;
                for line in contents.lines() {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    if let Ok(ip) = line.parse::<IpAddr>() {
                        self.ban_list.insert(ip);
                        count += 1;
                    } else {
                        warn!("Invalid IP in ban list: {}", line);
                    }
                }
                info!("Loaded {} IP bans from {:?}", count, path);
            }
            Err(e) => {
                warn!("Failed to load ban list from {:?}: {}", path, e);
            }
        }
    }

    fn is_banned(&self, ip: &IpAddr) -> bool {
        self.ban_list.contains(ip)
    }

    /// Try to add a connection, returns true if allowed.
    fn try_add_connection(&mut self, ip: IpAddr, max_total: usize, max_per_ip: usize) -> bool {
        if self.total_connections >= max_total {
            return false;
        }

        let current = self.ip_connections.get(&ip).copied().unwrap_or(0);
        if current >= max_per_ip {
            return false;
        }

        *self.ip_connections.entry(ip).or_insert(0) += 1;
        self.total_connections += 1;
        true
    }

    fn remove_connection(&mut self, ip: IpAddr) {
        if let Some(count) = self.ip_connections.get_mut(&ip) {
            if *count > 0 {
                *count -= 1;
                self.total_connections = self.total_connections.saturating_sub(1);
            }
            if *count == 0 {
                self.ip_connections.remove(&ip);
            }
        }
    }
}

/// Run the game server.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on ws://{}", addr);

    // Connection tracking state
    let conn_state = Arc::new(RwLock::new(ConnectionState::new()));
    {
        let mut state = conn_state.write().await;
        state.load_ban_list(Path::new("banlist.txt"));
    }

    // Every outbound message rides the targeted channel; each connection
    // task filters on its own session id.
    let (targeted_tx, _targeted_rx) = broadcast::channel::<TargetedMessage>(256);

    // Shared game state
    let game_state = Arc::new(RwLock::new(GameState::new(&config, targeted_tx.clone())));

    // Start the game loop
    let game_loop_state = Arc::clone(&game_state);
    let tick_interval = config.server.tick_interval_ms;
    tokio::spawn(async move {
        game::run_game_loop(game_loop_state, tick_interval).await;
    });

    // Connection limits
    let max_connections = config.server.max_connections;
    let ip_limit = config.server.ip_limit;

    loop {
        let (stream, addr) = listener.accept().await?;
        let ip = addr.ip();

        {
            let mut state = conn_state.write().await;

            if state.is_banned(&ip) {
                warn!("Connection rejected (IP banned): {}", addr);
                continue;
            }

            if !state.try_add_connection(ip, max_connections, ip_limit) {
                warn!("Connection rejected (limit reached): {}", addr);
                continue;
            }
        }

        let game_state = Arc::clone(&game_state);
        let conn_state = Arc::clone(&conn_state);
        let targeted_rx = targeted_tx.subscribe();

        tokio::spawn(async move {
            let result = handle_connection(stream, addr, game_state, targeted_rx).await;

            // Always remove from connection tracking when done
            {
                let mut state = conn_state.write().await;
                state.remove_connection(addr.ip());
            }

            if let Err(e) = result {
                error!("Connection error from {}: {}", addr, e);
            }
        });
    }
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    game_state: Arc<RwLock<GameState>>,
    mut targeted_rx: broadcast::Receiver<TargetedMessage>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New connection from {}", addr);

    let (mut write, mut read) = ws_stream.split();

    let client_id = {
        let mut state = game_state.write().await;
        state.add_client(addr)
    };

    // Message loop - handle both incoming messages and outbound deliveries
    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let mut state = game_state.write().await;
                        if let Err(e) = state.handle_message(client_id, text.as_str()) {
                            warn!("Message error from {}: {}", addr, e);
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        warn!(
                            "Ignoring frame from {}: {}",
                            addr,
                            protocol::ProtocolError::NonTextPayload
                        );
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("Client {} disconnected", addr);
                        break;
                    }
                    Some(Err(e)) => {
                        error!("WebSocket error from {}: {}", addr, e);
                        break;
                    }
                    None => {
                        break;
                    }
                    _ => {}
                }
            }
            targeted_msg = targeted_rx.recv() => {
                match targeted_msg {
                    Ok(msg) => {
                        if msg.client_id != client_id {
                            continue;
                        }
                        let json = msg.message.to_json();
                        if let Err(e) = write.send(Message::Text(json.into())).await {
                            warn!("Failed to send to {}: {}", addr, e);
                            break;
                        }
                    }
                    // Lagged receivers drop the oldest deliveries; the next
                    // tick snapshot supersedes them anyway.
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Session {} lagged, dropped {} messages", client_id, n);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        }
    }

    // Remove client
    {
        let mut state = game_state.write().await;
        state.remove_client(client_id);
    }

    Ok(())
}
