//! Client session state.

use protocol::PlayerId;
use std::net::SocketAddr;
use std::time::Instant;

/// A connected WebSocket session.
#[derive(Debug)]
pub struct Client {
    /// Unique session ID.
    pub id: u32,
    /// Remote address.
    pub addr: SocketAddr,
    /// The player id this session claimed with its first message.
    pub player_id: Option<PlayerId>,
    /// Last activity timestamp.
    pub last_activity: Instant,
}

impl Client {
    /// Create a new client session.
    pub fn new(id: u32, addr: SocketAddr) -> Self {
        Self {
            id,
            addr,
            player_id: None,
            last_activity: Instant::now(),
        }
    }

    /// Update activity timestamp.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}
